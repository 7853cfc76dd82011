//! Integration tests against admin-panel page fixtures.

mod admin_panel;
