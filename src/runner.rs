//! Batch runner - applies the injection rule to each configured document
//!
//! Documents are processed one at a time, in the order they are configured.
//! A failure on one document is recorded as that document's outcome and the
//! run moves on; nothing here aborts the batch.

use crate::config::PatchConfig;
use crate::patcher::{InjectionRule, Outcome};
use crate::persist::{write_verified, Fingerprint};
use crate::safety::RootGuard;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Whether documents are written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Persist every patched document
    Apply,
    /// Evaluate only; `Updated` means "would update"
    Check,
}

/// Per-document result as reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "DocumentOutcome should be reported or tallied"]
pub enum DocumentOutcome {
    /// Link inserted (or would be, in check mode)
    Updated,
    /// Marker found, document left alone
    AlreadyExists,
    /// No file at the configured path
    NotFound,
    /// Sidebar closing structure not found
    PatternNotFound,
    /// Last sidebar entry is not near the settings entry
    GuardNotSatisfied,
    /// Read, path or write failure
    Failed { reason: String },
}

/// The three buckets outcomes are counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Updated,
    AlreadyExists,
    ErrorOrSkipped,
}

impl DocumentOutcome {
    pub fn category(&self) -> Category {
        match self {
            DocumentOutcome::Updated => Category::Updated,
            DocumentOutcome::AlreadyExists => Category::AlreadyExists,
            DocumentOutcome::NotFound
            | DocumentOutcome::PatternNotFound
            | DocumentOutcome::GuardNotSatisfied
            | DocumentOutcome::Failed { .. } => Category::ErrorOrSkipped,
        }
    }

    fn from_patch(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Patched(_) => DocumentOutcome::Updated,
            Outcome::AlreadyPatched => DocumentOutcome::AlreadyExists,
            Outcome::AnchorNotFound => DocumentOutcome::PatternNotFound,
            Outcome::GuardNotSatisfied => DocumentOutcome::GuardNotSatisfied,
        }
    }
}

impl fmt::Display for DocumentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentOutcome::Updated => write!(f, "updated"),
            DocumentOutcome::AlreadyExists => write!(f, "already-exists"),
            DocumentOutcome::NotFound => write!(f, "not-found"),
            DocumentOutcome::PatternNotFound => write!(f, "pattern-not-found"),
            DocumentOutcome::GuardNotSatisfied => write!(f, "guard-not-satisfied"),
            DocumentOutcome::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Document text before and after a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone)]
pub struct DocumentReport {
    /// File name as configured
    pub name: String,
    /// `<root>/<name>`
    pub path: PathBuf,
    pub outcome: DocumentOutcome,
    /// Present only for `Updated`
    pub change: Option<TextChange>,
}

/// Outcome counts across a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub updated: usize,
    pub already_exists: usize,
    pub errors: usize,
}

impl Tally {
    pub fn record(&mut self, outcome: &DocumentOutcome) {
        match outcome.category() {
            Category::Updated => self.updated += 1,
            Category::AlreadyExists => self.already_exists += 1,
            Category::ErrorOrSkipped => self.errors += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.updated + self.already_exists + self.errors
    }
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub mode: RunMode,
    /// One entry per configured file, in configured order
    pub documents: Vec<DocumentReport>,
    pub tally: Tally,
}

/// Run the configured rule over every configured document.
///
/// # Returns
///
/// A report with exactly one entry per file in `config.files`, in the same
/// order, plus the tally of their outcomes.
pub fn run_batch(config: &PatchConfig, mode: RunMode) -> BatchReport {
    debug!(
        files = config.files.len(),
        anchor = config.rule.anchor.as_str(),
        ?mode,
        "starting batch"
    );

    let guard = match RootGuard::new(&config.root) {
        Ok(guard) => {
            debug!(root = %guard.root().display(), "root resolved");
            Some(guard)
        }
        Err(e) => {
            warn!(root = %config.root.display(), error = %e, "root directory unavailable");
            None
        }
    };

    let mut documents = Vec::with_capacity(config.files.len());
    let mut tally = Tally::default();

    for name in &config.files {
        let report = process_document(&config.root, guard.as_ref(), name, &config.rule, mode);
        tally.record(&report.outcome);
        documents.push(report);
    }

    info!(
        updated = tally.updated,
        already_exists = tally.already_exists,
        errors = tally.errors,
        "batch finished"
    );

    BatchReport {
        mode,
        documents,
        tally,
    }
}

fn process_document(
    root: &Path,
    guard: Option<&RootGuard>,
    name: &str,
    rule: &InjectionRule,
    mode: RunMode,
) -> DocumentReport {
    let path = root.join(name);
    let (outcome, change) = evaluate(&path, guard, name, rule, mode);

    if let DocumentOutcome::Failed { reason } = &outcome {
        warn!(file = name, %reason, "document failed");
    } else {
        debug!(file = name, outcome = %outcome, "document processed");
    }

    DocumentReport {
        name: name.to_string(),
        path,
        outcome,
        change,
    }
}

fn evaluate(
    path: &Path,
    guard: Option<&RootGuard>,
    name: &str,
    rule: &InjectionRule,
    mode: RunMode,
) -> (DocumentOutcome, Option<TextChange>) {
    if !path.exists() {
        return (DocumentOutcome::NotFound, None);
    }

    let Some(guard) = guard else {
        return (failed("root directory unavailable"), None);
    };

    let resolved = match guard.validate_path(name) {
        Ok(p) => p,
        Err(e) => return (failed(e), None),
    };

    let content = match fs::read_to_string(&resolved) {
        Ok(c) => c,
        Err(e) => return (failed(format!("cannot read {}: {e}", resolved.display())), None),
    };

    let new_text = match rule.apply(&content) {
        Outcome::Patched(text) => text,
        other => return (DocumentOutcome::from_patch(&other), None),
    };

    if mode == RunMode::Apply {
        if let Err(e) = write_verified(&resolved, Fingerprint::of(&content), &new_text) {
            return (failed(e), None);
        }
        info!(file = %resolved.display(), "link inserted");
    }

    (
        DocumentOutcome::Updated,
        Some(TextChange {
            before: content,
            after: new_text,
        }),
    )
}

fn failed(reason: impl ToString) -> DocumentOutcome {
    DocumentOutcome::Failed {
        reason: reason.to_string(),
    }
}
