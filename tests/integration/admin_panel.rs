//! Runs the built-in rollout against a mock admin panel.
//!
//! Pages mirror the real layout: a sidebar whose last entry is "Настройки",
//! closed by two nested `</div>`s, followed by the page body.

use navlink_patcher::config::builtin::{ADMIN_PAGES, CUSTOMER_LINK_SNIPPET, LINK_LABEL};
use navlink_patcher::config::PatchConfig;
use navlink_patcher::runner::{run_batch, DocumentOutcome, RunMode, Tally};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SIDEBAR: &str = r#"    <div class="sidebar">
        <div class="sidebar-menu">
            <a href="index.html" class="sidebar-item">
                <span class="sidebar-icon">📊</span>
                <span>Дашборд</span>
            </a>
            <a href="menu.html" class="sidebar-item">
                <span class="sidebar-icon">🍽</span>
                <span>Меню</span>
            </a>
            <a href="settings.html" class="sidebar-item">
                <span class="sidebar-icon">⚙️</span>
                <span>Настройки</span>
            </a>
        </div>
    </div>"#;

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"ru\">\n<head><title>{title}</title></head>\n<body>\n{SIDEBAR}\n    <main class=\"content\">\n{body}\n    </main>\n</body>\n</html>\n"
    )
}

fn standard_page(title: &str) -> String {
    page(title, &format!("        <h1>{title}</h1>"))
}

/// Body ends in a card whose action link closes two divs, far below the
/// sidebar, so it becomes the last anchor match.
fn page_with_trailing_card(title: &str) -> String {
    let filler = "<p>Описание раздела.</p>\n".repeat(40);
    page(
        title,
        &format!(
            "{filler}        <div class=\"card\"><div class=\"actions\"><a href=\"#\">Открыть</a></div></div>"
        ),
    )
}

fn setup_admin_panel() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    for name in ADMIN_PAGES {
        fs::write(root.join(name), standard_page(name)).unwrap();
    }

    // kds.html is a bare fullscreen page without the sidebar
    fs::write(
        root.join("kds.html"),
        "<html><body><div id=\"orders\"></div></body></html>\n",
    )
    .unwrap();
    fs::write(root.join("analytics.html"), page_with_trailing_card("Аналитика")).unwrap();
    fs::remove_file(root.join("hall-designer.html")).unwrap();

    dir
}

fn config_for(root: &Path) -> PatchConfig {
    PatchConfig::builtin().with_root(root)
}

#[test]
fn test_rollout_outcomes_in_page_order() {
    let panel = setup_admin_panel();
    let report = run_batch(&config_for(panel.path()), RunMode::Apply);

    let names: Vec<&str> = report.documents.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ADMIN_PAGES);

    let outcomes: Vec<&DocumentOutcome> = report.documents.iter().map(|d| &d.outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            &DocumentOutcome::Updated,           // tables
            &DocumentOutcome::PatternNotFound,   // kds
            &DocumentOutcome::Updated,           // staff
            &DocumentOutcome::Updated,           // inventory
            &DocumentOutcome::Updated,           // menu
            &DocumentOutcome::Updated,           // loyalty
            &DocumentOutcome::GuardNotSatisfied, // analytics
            &DocumentOutcome::Updated,           // calls
            &DocumentOutcome::Updated,           // user-profile
            &DocumentOutcome::NotFound,          // hall-designer
        ]
    );
    assert_eq!(
        report.tally,
        Tally {
            updated: 7,
            already_exists: 0,
            errors: 3,
        }
    );
}

#[test]
fn test_link_lands_after_settings_entry() {
    let panel = setup_admin_panel();
    let before = fs::read_to_string(panel.path().join("tables.html")).unwrap();

    let _ = run_batch(&config_for(panel.path()), RunMode::Apply);

    let after = fs::read_to_string(panel.path().join("tables.html")).unwrap();
    let expected_splice = format!(
        "<span>Настройки</span>\n            </a>\n{CUSTOMER_LINK_SNIPPET}\n\n        </div>\n    </div>"
    );
    assert!(after.contains(&expected_splice));
    assert_eq!(after.matches(LINK_LABEL).count(), 1);
    assert_eq!(after.len(), before.len() + CUSTOMER_LINK_SNIPPET.len() + 2);
}

#[test]
fn test_rejected_pages_are_untouched() {
    let panel = setup_admin_panel();
    let kds_before = fs::read(panel.path().join("kds.html")).unwrap();
    let analytics_before = fs::read(panel.path().join("analytics.html")).unwrap();

    let _ = run_batch(&config_for(panel.path()), RunMode::Apply);

    assert_eq!(fs::read(panel.path().join("kds.html")).unwrap(), kds_before);
    assert_eq!(
        fs::read(panel.path().join("analytics.html")).unwrap(),
        analytics_before
    );
    assert!(!panel.path().join("hall-designer.html").exists());
}

#[test]
fn test_second_run_is_idempotent() {
    let panel = setup_admin_panel();
    let config = config_for(panel.path());

    let first = run_batch(&config, RunMode::Apply);
    assert_eq!(first.tally.updated, 7);
    let snapshot = fs::read_to_string(panel.path().join("menu.html")).unwrap();

    let second = run_batch(&config, RunMode::Apply);
    assert_eq!(
        second.tally,
        Tally {
            updated: 0,
            already_exists: 7,
            errors: 3,
        }
    );
    assert_eq!(
        fs::read_to_string(panel.path().join("menu.html")).unwrap(),
        snapshot
    );
}

#[test]
fn test_dry_run_reports_without_writing() {
    let panel = setup_admin_panel();
    let before = fs::read(panel.path().join("staff.html")).unwrap();

    let report = run_batch(&config_for(panel.path()), RunMode::Check);

    assert_eq!(report.tally.updated, 7);
    assert_eq!(fs::read(panel.path().join("staff.html")).unwrap(), before);

    let staff = &report.documents[2];
    let change = staff.change.as_ref().expect("updated page carries change");
    assert!(change.after.contains(LINK_LABEL));
    assert!(!change.before.contains(LINK_LABEL));
}
