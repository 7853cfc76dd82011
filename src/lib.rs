//! navlink-patcher: idempotent navigation-link injection for static admin pages
//!
//! Inserts a fixed sidebar link into a fixed list of HTML pages. Pages are
//! treated as plain text: no markup is parsed.
//!
//! # Architecture
//!
//! - [`patcher`] is the pure core. [`patch`] takes a document's text and
//!   returns an [`Outcome`], with the rewritten text on success.
//! - [`runner`] walks the configured file list in order, reads each
//!   document, applies the rule and persists the result.
//! - [`config`] holds the explicit configuration passed to the runner,
//!   including the built-in admin-panel rollout.
//!
//! # Safety
//!
//! - A document containing the marker is never touched again
//! - Writes are atomic (tempfile + fsync + rename)
//! - A document changed on disk between read and write is not overwritten
//! - Target paths must resolve inside the configured root
//!
//! # Example
//!
//! ```
//! use navlink_patcher::{patch, Anchor, Outcome};
//!
//! let outcome = patch(
//!     "Settings...<a>Y</a></div></div>",
//!     "MARK",
//!     &Anchor::default(),
//!     "Settings",
//!     500,
//!     "<snippet>",
//! );
//!
//! assert_eq!(
//!     outcome,
//!     Outcome::Patched("Settings...<a>Y</a>\n<snippet>\n</div></div>".to_string())
//! );
//! ```

pub mod config;
pub mod patcher;
pub mod persist;
pub mod runner;
pub mod safety;

// Re-exports
pub use config::{PatchConfig, ValidationError, ValidationIssue};
pub use patcher::{lookbehind, patch, Anchor, AnchorError, InjectionRule, Outcome};
pub use persist::{Fingerprint, PersistError};
pub use runner::{
    run_batch, BatchReport, Category, DocumentOutcome, DocumentReport, RunMode, Tally,
    TextChange,
};
pub use safety::{RootGuard, SafetyError};
