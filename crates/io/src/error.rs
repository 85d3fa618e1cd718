use thiserror::Error;

/// Errors surfaced by file I/O and filesystem watching.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("filesystem watcher error: {0}")]
    Notify(#[from] notify::Error),

    #[error("no watch has been established yet")]
    NotWatching,
}
