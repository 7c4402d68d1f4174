//! Transcript storage implementations.
//!
//! - `file`: plain-text file, one line per record

pub mod file;

pub use file::FileTranscriptStore;
