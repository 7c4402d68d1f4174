//! Transcript storage trait.
//!
//! The history log depends on this trait; the file-backed implementation lives
//! in the infrastructure layer.

use async_trait::async_trait;

use super::{ChatLine, TranscriptError};

/// Durable storage for the chat transcript.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Load every previously persisted line, oldest first. A missing transcript is empty.
    async fn load(&self) -> Result<Vec<ChatLine>, TranscriptError>;

    /// Replace the stored transcript with `lines`, in order.
    async fn persist(&self, lines: &[ChatLine]) -> Result<(), TranscriptError>;
}
