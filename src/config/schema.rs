use crate::patcher::InjectionRule;
use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Everything a batch run needs: where the documents live, which ones to
/// touch and in what order, and the rule applied to each.
#[derive(Debug, Clone)]
pub struct PatchConfig {
    pub root: PathBuf,
    pub files: Vec<String>,
    pub rule: InjectionRule,
}

impl PatchConfig {
    pub fn new(root: impl Into<PathBuf>, files: Vec<String>, rule: InjectionRule) -> Self {
        Self {
            root: root.into(),
            files,
            rule,
        }
    }

    /// Same configuration against a different root directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.files.is_empty() {
            issues.push(ValidationIssue::EmptyFileList);
        }
        if self.rule.marker.is_empty() {
            issues.push(ValidationIssue::MissingField { field: "marker" });
        }
        if self.rule.guard.is_empty() {
            issues.push(ValidationIssue::MissingField { field: "guard" });
        }

        let mut seen = HashSet::new();
        for file in &self.files {
            if file.trim().is_empty() {
                issues.push(ValidationIssue::InvalidFile {
                    file: file.clone(),
                    message: "file name is empty",
                });
                continue;
            }
            if !is_plain_relative(Path::new(file)) {
                issues.push(ValidationIssue::InvalidFile {
                    file: file.clone(),
                    message: "must be a relative path without '..'",
                });
            }
            if !seen.insert(file.as_str()) {
                issues.push(ValidationIssue::DuplicateFile { file: file.clone() });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

fn is_plain_relative(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyFileList,
    MissingField {
        field: &'static str,
    },
    InvalidFile {
        file: String,
        message: &'static str,
    },
    DuplicateFile {
        file: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyFileList => write!(f, "no target files configured"),
            ValidationIssue::MissingField { field } => {
                write!(f, "required field '{field}' is empty")
            }
            ValidationIssue::InvalidFile { file, message } => {
                write!(f, "invalid target file '{file}': {message}")
            }
            ValidationIssue::DuplicateFile { file } => {
                write!(f, "target file '{file}' is listed more than once")
            }
        }
    }
}
