//! UseCase error types.

use thiserror::Error;

use crate::domain::{ConnectionId, RegistryError};

/// Reasons a freshly accepted connection cannot be admitted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("connection {0} is already registered")]
    DuplicateConnection(ConnectionId),

    #[error("server is full ({max} connections)")]
    CapacityExceeded { max: usize },
}

impl From<RegistryError> for ConnectError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::DuplicateConnection(id) => Self::DuplicateConnection(id),
            RegistryError::CapacityExceeded { max } => Self::CapacityExceeded { max },
        }
    }
}
