//! Domain layer: value objects, the connection entity, and the transcript seam.

mod error;
mod member;
mod transcript;
mod value_object;

pub use error::{DomainError, RegistryError, TranscriptError};
pub use member::{Member, PusherChannel};
pub use transcript::TranscriptStore;
#[cfg(test)]
pub use transcript::MockTranscriptStore;
pub use value_object::{ChatLine, ConnectionId, ConnectionIdFactory, DisplayName, Timestamp};
