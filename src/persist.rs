use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

/// xxh3 hash of a document as it was read.
///
/// Checked again right before writing so a file edited by someone else in
/// the meantime is never clobbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn of(text: &str) -> Self {
        Fingerprint(xxh3_64(text.as_bytes()))
    }

    pub fn matches(&self, text: &str) -> bool {
        xxh3_64(text.as_bytes()) == self.0
    }
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("{file} changed on disk since it was read")]
    ConcurrentModification { file: PathBuf },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Overwrite `path` with `new_text` if it still holds the text `expected`
/// was taken from.
pub fn write_verified(
    path: &Path,
    expected: Fingerprint,
    new_text: &str,
) -> Result<(), PersistError> {
    let current = fs::read_to_string(path)?;
    if !expected.matches(&current) {
        return Err(PersistError::ConcurrentModification {
            file: path.to_path_buf(),
        });
    }

    atomic_write(path, new_text.as_bytes())?;
    debug!(file = %path.display(), bytes = new_text.len(), "document written");
    Ok(())
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or the original file is left in place.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), PersistError> {
    // Same directory keeps the rename on one filesystem
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => {
            return Err(PersistError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            )))
        }
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;

    // Keep the original permissions; NamedTempFile is created 0600
    if let Ok(meta) = fs::metadata(path) {
        temp.as_file().set_permissions(meta.permissions())?;
    }

    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_matches() {
        let fp = Fingerprint::of("hello world");
        assert!(fp.matches("hello world"));
        assert!(!fp.matches("hello world!"));
    }

    #[test]
    fn test_write_verified_replaces_content() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("page.html");
        fs::write(&file_path, "original").unwrap();

        write_verified(&file_path, Fingerprint::of("original"), "Настройки → patched").unwrap();

        let content = fs::read_to_string(&file_path).unwrap();
        assert_eq!(content, "Настройки → patched");
    }

    #[test]
    fn test_write_verified_refuses_changed_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("page.html");
        fs::write(&file_path, "edited elsewhere").unwrap();

        let result = write_verified(&file_path, Fingerprint::of("original"), "patched");

        assert!(matches!(
            result,
            Err(PersistError::ConcurrentModification { .. })
        ));
        let content = fs::read_to_string(&file_path).unwrap();
        assert_eq!(content, "edited elsewhere");
    }

    #[test]
    fn test_write_verified_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("gone.html");

        let result = write_verified(&file_path, Fingerprint::of(""), "patched");
        assert!(matches!(result, Err(PersistError::Io(_))));
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("page.html");
        fs::write(&file_path, "a").unwrap();

        write_verified(&file_path, Fingerprint::of("a"), "b").unwrap();

        let entries = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
