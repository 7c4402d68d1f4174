//! Utilities shared by the Palaver server and client binaries.

pub mod logger;
pub mod time;
