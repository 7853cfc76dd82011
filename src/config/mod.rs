pub mod builtin;
pub mod schema;

pub use builtin::{ADMIN_PAGES, DEFAULT_ROOT};
pub use schema::{PatchConfig, ValidationError, ValidationIssue};
