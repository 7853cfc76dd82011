//! The admin-panel link rollout this tool exists for.
//!
//! Adds the "customer ordering site" entry to the bottom of the sidebar on
//! every admin page, right after the "Settings" item.

use crate::config::schema::PatchConfig;
use crate::patcher::{Anchor, InjectionRule, DEFAULT_WINDOW};

/// Admin panel location, relative to the working directory.
pub const DEFAULT_ROOT: &str = "frontend/admin-panel";

/// Pages patched, in processing order.
pub const ADMIN_PAGES: &[&str] = &[
    "tables.html",
    "kds.html",
    "staff.html",
    "inventory.html",
    "menu.html",
    "loyalty.html",
    "analytics.html",
    "calls.html",
    "user-profile.html",
    "hall-designer.html",
];

/// Link label. Doubles as the marker: a page containing it is already done.
pub const LINK_LABEL: &str = "Сайт заказов";

/// Label of the sidebar entry the link must follow.
pub const SETTINGS_LABEL: &str = "Настройки";

pub const CUSTOMER_LINK_SNIPPET: &str = r#"            <div style="border-top: 1px solid #e1e8ed; margin: 12px 0;"></div>
            <a href="/customer-app/index.html" class="sidebar-item" target="_blank" style="background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; margin: 8px; border-radius: 8px;">
                <span class="sidebar-icon">🌐</span>
                <span>Сайт заказов</span>
                <span style="margin-left: auto; font-size: 12px;">↗</span>
            </a>"#;

impl PatchConfig {
    /// The fixed admin-panel rollout rooted at [`DEFAULT_ROOT`].
    pub fn builtin() -> Self {
        PatchConfig::new(
            DEFAULT_ROOT,
            ADMIN_PAGES.iter().map(|page| page.to_string()).collect(),
            InjectionRule {
                marker: LINK_LABEL.to_string(),
                anchor: Anchor::default(),
                guard: SETTINGS_LABEL.to_string(),
                window: DEFAULT_WINDOW,
                snippet: CUSTOMER_LINK_SNIPPET.to_string(),
            },
        )
    }
}
