//! Filesystem access for the editor: memory-mapped reads and a change
//! watcher for the currently open file. Saving is the editor-state
//! component's job — it owns the atomic tempfile-and-persist dance,
//! since it's the one that knows what bytes to write.

pub mod error;
pub mod file_watcher;
pub mod mmap;

pub use error::WatchError;
pub use file_watcher::FileWatcher;
pub use mmap::MmapFile;
