//! UseCase: broadcasting one chat line
//!
//! Frames the line, appends it to the history log and fans it out to the
//! registry snapshot taken at append time. Members whose channel is gone are
//! dropped from the registry; the sender never sees their failure.

use std::sync::Arc;

use crate::{
    config::SelfDelivery,
    domain::{ChatLine, ConnectionId, DisplayName},
    infrastructure::{HistoryLog, SessionRegistry},
};

/// Outcome of one broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub line: ChatLine,
    /// 1-based position of the line in the history log
    pub sequence: usize,
    pub delivered: Vec<ConnectionId>,
    /// Recipients found gone during fan-out and removed from the registry
    pub dropped: Vec<ConnectionId>,
}

/// Message broadcast use case
pub struct SendMessageUseCase {
    registry: Arc<SessionRegistry>,
    history: Arc<HistoryLog>,
    self_delivery: SelfDelivery,
}

impl SendMessageUseCase {
    pub fn new(
        registry: Arc<SessionRegistry>,
        history: Arc<HistoryLog>,
        self_delivery: SelfDelivery,
    ) -> Self {
        Self {
            registry,
            history,
            self_delivery,
        }
    }

    /// Broadcast `text` on behalf of connection `from`.
    ///
    /// # Arguments
    ///
    /// * `from` - The sending connection
    /// * `name` - The sender's bound display name
    /// * `text` - One inbound line, without its terminator
    pub async fn execute(
        &self,
        from: ConnectionId,
        name: &DisplayName,
        text: &str,
    ) -> BroadcastReport {
        let line = ChatLine::compose(name, text);

        let exclude = match self.self_delivery {
            SelfDelivery::Include => None,
            SelfDelivery::Exclude => Some(from),
        };

        // Append, snapshot and enqueue under the history lock: recipients are
        // decided at append time and every member receives lines in log order.
        // Enqueueing never blocks, so the lock is held only briefly.
        let (sequence, delivery) = {
            let mut history = self.history.lock().await;
            let sequence = history.push(line.clone());
            let snapshot = self.registry.snapshot().await;
            (sequence, snapshot.deliver(line.as_str(), exclude))
        };

        for gone in &delivery.failed {
            self.registry.leave(*gone).await;
        }

        tracing::debug!(
            "Broadcast #{} from {} reached {} member(s), dropped {}",
            sequence,
            from,
            delivery.delivered.len(),
            delivery.failed.len()
        );

        BroadcastReport {
            line,
            sequence,
            delivered: delivery.delivered,
            dropped: delivery.failed,
        }
    }
}
