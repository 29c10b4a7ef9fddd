//! Scratch-file ownership tracking.
//!
//! Every temporary artifact a pipeline run creates (the downloaded original,
//! each generated chunk) is registered here so it can be released exactly
//! once at the end of the run, regardless of how the run ended.

use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Run-scoped registry of temporary files owned by one pipeline run.
///
/// Only the run's sequential stages append to it; chunk files are registered
/// after the transcription fan-out joins, never during it, so no
/// synchronization is needed.
#[derive(Debug)]
pub struct ScratchSet {
    files: HashSet<PathBuf>,
    keep: bool,
}

impl ScratchSet {
    /// Create a new scratch set. `keep` suppresses removal at release time
    /// (operator debugging override, never the default).
    pub fn new(keep: bool) -> Self {
        Self {
            files: HashSet::new(),
            keep,
        }
    }

    /// Register a file as owned by this run.
    pub fn register(&mut self, path: impl Into<PathBuf>) {
        self.files.insert(path.into());
    }

    /// Number of registered files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Delete every registered file, best effort.
    ///
    /// Removal errors are swallowed so cleanup never masks the primary
    /// failure of a run. Files that are already gone are not an error.
    pub fn release_all(&mut self) {
        if self.keep {
            debug!("keep_scratch set, leaving {} scratch file(s)", self.files.len());
            self.files.clear();
            return;
        }

        for path in self.files.drain() {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!("Removed scratch file {:?}", path),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove scratch file {:?}: {}", path, e),
            }
        }
    }
}

impl Drop for ScratchSet {
    fn drop(&mut self) {
        // Backstop for early returns and cancellation; release_all is
        // idempotent so the normal explicit call makes this a no-op.
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"scratch").unwrap();
        path
    }

    #[test]
    fn test_release_removes_registered_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "a.mp3");
        let b = touch(dir.path(), "b.mp3");

        let mut scratch = ScratchSet::new(false);
        scratch.register(&a);
        scratch.register(&b);
        scratch.release_all();

        assert!(!a.exists());
        assert!(!b.exists());
        assert!(scratch.is_empty());
    }

    #[test]
    fn test_release_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut scratch = ScratchSet::new(false);
        scratch.register(dir.path().join("never-created.mp3"));
        scratch.release_all();
        assert!(scratch.is_empty());
    }

    #[test]
    fn test_keep_suppresses_removal() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "kept.mp3");

        let mut scratch = ScratchSet::new(true);
        scratch.register(&a);
        scratch.release_all();

        assert!(a.exists());
    }

    #[test]
    fn test_drop_releases_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "dropped.mp3");

        {
            let mut scratch = ScratchSet::new(false);
            scratch.register(&a);
        }

        assert!(!a.exists());
    }

    #[test]
    fn test_register_deduplicates() {
        let mut scratch = ScratchSet::new(false);
        scratch.register("/tmp/lectern/x.mp3");
        scratch.register("/tmp/lectern/x.mp3");
        assert_eq!(scratch.len(), 1);
    }
}
