//! Request-scoped scratch files.
//!
//! A [`ScratchFile`] names a unique path under the scratch directory and
//! removes whatever is at that path when it is dropped, so every exit path
//! of a request cleans up its intermediate input.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::MediaResult;

/// Unique scratch path, removed on drop.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    armed: bool,
}

impl ScratchFile {
    /// Reserve a fresh `clip-<uuid>.input` path in `dir`. No file is created.
    pub fn new_in(dir: impl AsRef<Path>) -> Self {
        let name = format!("clip-{}.input", Uuid::new_v4());
        Self {
            path: dir.as_ref().join(name),
            armed: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now, treating a missing file as success.
    pub async fn remove(mut self) -> MediaResult<()> {
        self.armed = false;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "Removed scratch file");
                Ok(())
            }
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed scratch file on drop"),
            Err(e) if is_not_found(&e) => {}
            Err(e) => warn!(path = %self.path.display(), "Failed to remove scratch file: {}", e),
        }
    }
}

fn is_not_found(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_are_unique_and_named() {
        let dir = TempDir::new().unwrap();
        let a = ScratchFile::new_in(dir.path());
        let b = ScratchFile::new_in(dir.path());

        assert_ne!(a.path(), b.path());
        let name = a.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("clip-"));
        assert!(name.ends_with(".input"));
        assert_eq!(a.path().parent(), Some(dir.path()));
    }

    #[test]
    fn test_drop_removes_file() {
        let dir = TempDir::new().unwrap();
        let scratch = ScratchFile::new_in(dir.path());
        let path = scratch.path().to_path_buf();
        std::fs::write(&path, b"partial").unwrap();

        drop(scratch);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_remove_tolerates_missing_file() {
        let dir = TempDir::new().unwrap();
        let scratch = ScratchFile::new_in(dir.path());
        scratch.remove().await.unwrap();
    }
}
