//! Watches one file on disk for external modification.
//!
//! Mirrors the calling convention of the original `inotify`-based watcher:
//! `watch` establishes (or replaces) the watch, `has_changed` is a
//! non-blocking poll that drains whatever events have queued up and
//! reports whether any of them was a content modification, and
//! `ignore_next_cycle` records the file's current mtime as self-induced —
//! callers use it right after writing the file themselves, so their own
//! save isn't mistaken for an external edit, without blocking on the
//! watch thread to catch up.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, SystemTime};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use crate::error::WatchError;

pub struct FileWatcher {
    watcher: Option<RecommendedWatcher>,
    events: Option<Receiver<notify::Result<Event>>>,
    path: Option<PathBuf>,
    suppressed_mtime: Option<SystemTime>,
}

impl Default for FileWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FileWatcher {
    #[must_use]
    pub fn new() -> Self {
        Self { watcher: None, events: None, path: None, suppressed_mtime: None }
    }

    /// Starts watching `path`, replacing any watch already in place.
    pub fn watch(&mut self, path: impl AsRef<Path>) -> Result<(), WatchError> {
        let path = path.as_ref().to_path_buf();
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            if tx.send(res).is_err() {
                debug!("file watcher channel dropped, receiver gone");
            }
        })?;
        watcher.watch(&path, RecursiveMode::NonRecursive)?;
        debug!(path = %path.display(), "watching file for external changes");
        self.watcher = Some(watcher);
        self.events = Some(rx);
        self.path = Some(path);
        self.suppressed_mtime = None;
        Ok(())
    }

    /// Non-blocking poll: drains every event queued since the last call and
    /// reports whether any of them is a content modification that isn't
    /// attributable to our own last self-induced save.
    pub fn has_changed(&mut self) -> Result<bool, WatchError> {
        let rx = self.events.as_ref().ok_or(WatchError::NotWatching)?;
        let mut changed = false;
        loop {
            match rx.recv_timeout(Duration::from_secs(0)) {
                Ok(Ok(event)) => {
                    if matches!(event.kind, EventKind::Modify(_)) {
                        changed = true;
                    }
                }
                Ok(Err(err)) => warn!(%err, "file watch event error"),
                Err(_) => break,
            }
        }
        if changed {
            if let Some(suppressed) = self.suppressed_mtime {
                if self.current_mtime() == Some(suppressed) {
                    self.suppressed_mtime = None;
                    return Ok(false);
                }
            }
        }
        Ok(changed)
    }

    /// Records the watched file's current mtime as self-induced. Call this
    /// immediately after writing the watched file under the editor's own
    /// control: the next `has_changed` that observes this exact mtime
    /// attributes it to our own save rather than an external edit, instead
    /// of blocking the caller to let the watch thread catch up first.
    pub fn ignore_next_cycle(&mut self) -> Result<(), WatchError> {
        let _ = self.has_changed()?;
        self.suppressed_mtime = self.current_mtime();
        Ok(())
    }

    fn current_mtime(&self) -> Option<SystemTime> {
        let path = self.path.as_ref()?;
        std::fs::metadata(path).and_then(|m| m.modified()).ok()
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::thread::sleep;

    fn wait_for_event(watcher: &mut FileWatcher) -> bool {
        for _ in 0..50 {
            if watcher.has_changed().unwrap() {
                return true;
            }
            sleep(Duration::from_millis(20));
        }
        false
    }

    #[test]
    fn detects_external_modification() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watched.txt");
        std::fs::write(&path, "hello").unwrap();

        let mut watcher = FileWatcher::new();
        watcher.watch(&path).unwrap();

        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(f, "world").unwrap();
        f.sync_all().unwrap();

        assert!(wait_for_event(&mut watcher));
    }

    #[test]
    fn has_changed_before_watch_is_an_error() {
        let mut watcher = FileWatcher::new();
        assert!(watcher.has_changed().is_err());
    }

    #[test]
    fn self_induced_save_is_suppressed_without_blocking() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watched.txt");
        std::fs::write(&path, "hello").unwrap();

        let mut watcher = FileWatcher::new();
        watcher.watch(&path).unwrap();

        std::fs::write(&path, "hello world").unwrap();
        watcher.ignore_next_cycle().unwrap();

        for _ in 0..50 {
            if watcher.has_changed().unwrap() {
                panic!("self-induced save reported as an external change");
            }
            sleep(Duration::from_millis(20));
        }
    }
}
