//! Idempotent text patcher.
//!
//! The patcher treats a document as opaque text. It never parses markup:
//! a marker substring decides whether the document was already patched, a
//! two-group regex finds candidate insertion points, and a literal guard
//! string must appear shortly before the chosen candidate.
//!
//! Everything here is pure. Reading and writing documents is the caller's job
//! (see [`crate::runner`]).

use regex::Regex;
use std::fmt;
use thiserror::Error;

/// Default anchor: a closing link followed by two closing containers.
///
/// Group 1 is the bare `</a>`. The whitespace between it and the containers
/// sits outside group 1 so it is kept after the inserted snippet.
pub const DEFAULT_ANCHOR: &str = r"(</a>)\s*(</div>\s*</div>)";

/// Number of characters searched for the guard before the chosen match.
pub const DEFAULT_WINDOW: usize = 500;

#[derive(Error, Debug)]
pub enum AnchorError {
    #[error("invalid anchor pattern: {0}")]
    Invalid(#[from] regex::Error),

    #[error("anchor pattern needs 2 capture groups, found {found}")]
    MissingGroups { found: usize },
}

/// A compiled anchor pattern with at least two capture groups.
#[derive(Debug, Clone)]
pub struct Anchor {
    regex: Regex,
}

impl Anchor {
    pub fn new(pattern: &str) -> Result<Self, AnchorError> {
        let regex = Regex::new(pattern)?;
        // captures_len() counts the implicit whole-match group
        let found = regex.captures_len() - 1;
        if found < 2 {
            return Err(AnchorError::MissingGroups { found });
        }
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Locate the last non-overlapping match.
    ///
    /// Returns `(match_start, closing_token_end)`, where the second offset is
    /// the end of capture group 1.
    fn last_candidate(&self, text: &str) -> Option<(usize, usize)> {
        let caps = self.regex.captures_iter(text).last()?;
        let whole = caps.get(0)?;
        let closing = caps.get(1)?;
        Some((whole.start(), closing.end()))
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Self {
            regex: Regex::new(DEFAULT_ANCHOR).expect("DEFAULT_ANCHOR is a valid pattern"),
        }
    }
}

/// Result of patching one document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Outcome carries the rewritten text on success"]
pub enum Outcome {
    /// Snippet inserted; carries the complete rewritten text
    Patched(String),
    /// Marker already present, nothing to do
    AlreadyPatched,
    /// No anchor match anywhere in the text
    AnchorNotFound,
    /// Last anchor match is not preceded by the guard string
    GuardNotSatisfied,
}

impl Outcome {
    pub fn is_patched(&self) -> bool {
        matches!(self, Outcome::Patched(_))
    }

    /// The text a caller should hold after patching: the rewritten text on
    /// success, otherwise `original` untouched.
    pub fn text_or<'a>(&'a self, original: &'a str) -> &'a str {
        match self {
            Outcome::Patched(text) => text,
            _ => original,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Patched(_) => write!(f, "patched"),
            Outcome::AlreadyPatched => write!(f, "already patched"),
            Outcome::AnchorNotFound => write!(f, "anchor not found"),
            Outcome::GuardNotSatisfied => write!(f, "guard not satisfied"),
        }
    }
}

/// Insert `snippet` after the last anchor match, unless `marker` is present.
///
/// The checks run in a fixed order: marker, anchor, guard. Only when all
/// three pass is new text produced, with the snippet on its own lines right
/// after the closing token of capture group 1.
pub fn patch(
    text: &str,
    marker: &str,
    anchor: &Anchor,
    guard: &str,
    window: usize,
    snippet: &str,
) -> Outcome {
    if text.contains(marker) {
        return Outcome::AlreadyPatched;
    }

    let Some((start, insert_at)) = anchor.last_candidate(text) else {
        return Outcome::AnchorNotFound;
    };

    if !lookbehind(text, start, window).contains(guard) {
        return Outcome::GuardNotSatisfied;
    }

    let mut patched = String::with_capacity(text.len() + snippet.len() + 2);
    patched.push_str(&text[..insert_at]);
    patched.push('\n');
    patched.push_str(snippet);
    patched.push('\n');
    patched.push_str(&text[insert_at..]);

    Outcome::Patched(patched)
}

/// Up to `window` characters of `text` ending at byte offset `end`.
///
/// Counts Unicode scalar values, not bytes, and clamps at the start of the
/// text. `end` must lie on a char boundary.
pub fn lookbehind(text: &str, end: usize, window: usize) -> &str {
    let head = &text[..end];
    if window == 0 {
        return "";
    }
    let start = head
        .char_indices()
        .rev()
        .nth(window - 1)
        .map_or(0, |(idx, _)| idx);
    &head[start..]
}

/// The full set of inputs applied to every document in a batch.
#[derive(Debug, Clone)]
pub struct InjectionRule {
    pub marker: String,
    pub anchor: Anchor,
    pub guard: String,
    pub window: usize,
    pub snippet: String,
}

impl InjectionRule {
    pub fn apply(&self, text: &str) -> Outcome {
        patch(
            text,
            &self.marker,
            &self.anchor,
            &self.guard,
            self.window,
            &self.snippet,
        )
    }
}
