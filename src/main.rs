use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use navlink_patcher::config::PatchConfig;
use navlink_patcher::runner::{run_batch, BatchReport, Category, DocumentReport, RunMode};
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "navlink-patcher")]
#[command(about = "Insert the customer ordering site link into the admin panel pages", long_about = None)]
#[command(version)]
struct Cli {
    /// Defaults to `apply` when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert the link into every admin page that lacks it
    Apply {
        /// Admin panel directory (defaults to frontend/admin-panel)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Report which pages already carry the link, without modifying anything
    Status {
        /// Admin panel directory (defaults to frontend/admin-panel)
        #[arg(short, long)]
        root: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("navlink_patcher=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Apply {
        root: None,
        dry_run: false,
        diff: false,
    }) {
        Commands::Apply {
            root,
            dry_run,
            diff,
        } => cmd_apply(root, dry_run, diff),

        Commands::Status { root } => cmd_status(root),
    }
}

fn load_config(root: Option<PathBuf>) -> Result<PatchConfig> {
    let config = match root {
        Some(root) => PatchConfig::builtin().with_root(root),
        None => PatchConfig::builtin(),
    };
    config.validate()?;
    Ok(config)
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn print_document(doc: &DocumentReport, mode: RunMode) {
    match doc.outcome.category() {
        Category::Updated => {
            let label = if mode == RunMode::Check {
                "would update".to_string()
            } else {
                doc.outcome.to_string()
            };
            println!("{} {}: {}", "✓".green(), doc.name, label);
        }
        Category::AlreadyExists => {
            println!("{} {}: {}", "⊙".yellow(), doc.name, doc.outcome);
        }
        Category::ErrorOrSkipped => {
            println!("{} {}: {}", "✗".red(), doc.name, doc.outcome.to_string().red());
        }
    }
}

fn print_summary(report: &BatchReport) {
    let tally = &report.tally;
    println!();
    println!("{}", "Summary:".bold());
    println!("  {} updated", format!("{}", tally.updated).green());
    println!(
        "  {} already exists",
        format!("{}", tally.already_exists).yellow()
    );
    println!("  {} errors", format!("{}", tally.errors).red());
}

fn cmd_apply(root: Option<PathBuf>, dry_run: bool, show_diff: bool) -> Result<()> {
    let config = load_config(root)?;

    println!("Adding customer site link to admin panel");
    println!("Root: {}", config.root.display());
    if dry_run {
        println!("{}", "[DRY RUN - no files will be modified]".cyan());
    }
    println!();

    let mode = if dry_run {
        RunMode::Check
    } else {
        RunMode::Apply
    };
    let report = run_batch(&config, mode);

    for doc in &report.documents {
        print_document(doc, mode);
        if show_diff {
            if let Some(change) = &doc.change {
                display_diff(&doc.path, &change.before, &change.after);
            }
        }
    }

    print_summary(&report);

    Ok(())
}

fn cmd_status(root: Option<PathBuf>) -> Result<()> {
    let config = load_config(root)?;

    println!("{}", "Link Status Report".bold());
    println!("Root: {}", config.root.display());
    println!();

    let report = run_batch(&config, RunMode::Check);

    let mut patched = Vec::new();
    let mut pending = Vec::new();
    let mut blocked = Vec::new();

    for doc in &report.documents {
        match doc.outcome.category() {
            Category::AlreadyExists => patched.push(doc),
            Category::Updated => pending.push(doc),
            Category::ErrorOrSkipped => blocked.push(doc),
        }
    }

    if !patched.is_empty() {
        println!(
            "{} {} ({} pages)",
            "✓".green(),
            "PATCHED".green().bold(),
            patched.len()
        );
        for doc in &patched {
            println!("  - {}", doc.name);
        }
        println!();
    }

    if !pending.is_empty() {
        println!(
            "{} {} ({} pages)",
            "⊙".yellow(),
            "PENDING".yellow().bold(),
            pending.len()
        );
        for doc in &pending {
            println!("  - {}", doc.name);
        }
        println!();
    }

    if !blocked.is_empty() {
        println!(
            "{} {} ({} pages)",
            "✗".red(),
            "BLOCKED".red().bold(),
            blocked.len()
        );
        for doc in &blocked {
            println!("  - {} ({})", doc.name, doc.outcome.to_string().dimmed());
        }
        println!();
    }

    Ok(())
}
