//! Cancellation for a running download: a shared abort flag and the
//! single-slot record of the file currently being written.
//!
//! The CLI's Ctrl+C listener sets the [`CancelToken`]; the engine checks it
//! between tracks and chunks, and the curl transport checks it from its
//! progress callback so a stalled read is cut short.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Shared abort flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Holds at most one in-flight destination path.
#[derive(Debug, Clone, Default)]
pub struct CurrentFile {
    slot: Arc<Mutex<Option<PathBuf>>>,
}

impl CurrentFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` as in flight. The slot is cleared when the guard drops.
    pub fn begin(&self, path: &Path) -> InFlight<'_> {
        *self.lock() = Some(path.to_path_buf());
        InFlight { owner: self }
    }

    pub fn get(&self) -> Option<PathBuf> {
        self.lock().clone()
    }

    /// Take the in-flight path and delete it. Returns the path if a file was removed.
    pub fn remove_in_flight(&self) -> Option<PathBuf> {
        let path = self.lock().take()?;
        match std::fs::remove_file(&path) {
            Ok(()) => Some(path),
            Err(e) => {
                tracing::warn!("could not remove {}: {}", path.display(), e);
                None
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<PathBuf>> {
        // A poisoned slot still holds a valid path.
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Clears the [`CurrentFile`] slot on drop, on every exit path of a transfer.
pub struct InFlight<'a> {
    owner: &'a CurrentFile,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.owner.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_clones_share_state() {
        let t = CancelToken::new();
        let c = t.clone();
        assert!(!c.is_cancelled());
        t.cancel();
        assert!(c.is_cancelled());
    }

    #[test]
    fn guard_clears_slot() {
        let current = CurrentFile::new();
        {
            let _g = current.begin(Path::new("Mix/a.mp3"));
            assert_eq!(current.get(), Some(PathBuf::from("Mix/a.mp3")));
        }
        assert_eq!(current.get(), None);
        assert_eq!(current.remove_in_flight(), None);
    }

    #[test]
    fn remove_in_flight_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.mp3");
        std::fs::write(&path, b"abc").unwrap();
        let current = CurrentFile::new();
        let _g = current.begin(&path);
        assert_eq!(current.remove_in_flight(), Some(path.clone()));
        assert!(!path.exists());
        assert_eq!(current.get(), None);
    }
}
