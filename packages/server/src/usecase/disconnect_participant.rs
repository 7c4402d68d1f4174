//! UseCase: removing a terminated connection.

use std::sync::Arc;

use crate::{domain::ConnectionId, infrastructure::SessionRegistry};

/// Participant disconnect use case
pub struct DisconnectParticipantUseCase {
    registry: Arc<SessionRegistry>,
}

impl DisconnectParticipantUseCase {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Remove `id` from the registry.
    ///
    /// Returns `false` when another path (a failed fan-out) already removed it.
    pub async fn execute(&self, id: ConnectionId) -> bool {
        let removed = self.registry.leave(id).await;
        let remaining = self.registry.len().await;
        tracing::info!(
            "Connection {} removed (was registered: {}), {} remaining",
            id,
            removed,
            remaining
        );
        removed
    }
}
