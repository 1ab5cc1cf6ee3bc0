//! Chunk sink implementations.

mod file;

pub use file::FileChunkSink;
