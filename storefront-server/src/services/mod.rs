//! Application services

pub mod media;

pub use media::{FsMediaStore, MediaError, MediaStore, MemoryMediaStore, remove_quietly};
