//! Infrastructure layer: shared in-memory state and transcript storage.

pub mod dto;
pub mod history;
pub mod registry;
pub mod transcript;

pub use history::{HistoryGuard, HistoryLog};
pub use registry::{Delivery, RegistrySnapshot, SessionRegistry};
