//! UseCase: admitting a connection and binding its display name.

use std::{net::SocketAddr, sync::Arc};

use palaver_shared::time::Clock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{ConnectionId, ConnectionIdFactory, DisplayName, Member, PusherChannel, Timestamp},
    infrastructure::{HistoryLog, SessionRegistry},
};

use super::error::ConnectError;

/// A connection that made it into the registry
#[derive(Debug)]
pub struct Admission {
    pub id: ConnectionId,
    /// Lines queued for this connection, history replay first
    pub outbound: mpsc::Receiver<String>,
}

/// Admits accepted sockets into the session registry
pub struct ConnectParticipantUseCase {
    registry: Arc<SessionRegistry>,
    history: Arc<HistoryLog>,
    clock: Arc<dyn Clock>,
    id_factory: ConnectionIdFactory,
    /// Replay the history log into a new connection before it goes live
    replay_history: bool,
    /// Live lines a connection may fall behind by before it is dropped
    queue_depth: usize,
}

impl ConnectParticipantUseCase {
    pub fn new(
        registry: Arc<SessionRegistry>,
        history: Arc<HistoryLog>,
        clock: Arc<dyn Clock>,
        replay_history: bool,
        queue_depth: usize,
    ) -> Self {
        Self {
            registry,
            history,
            clock,
            id_factory: ConnectionIdFactory::new(),
            replay_history,
            queue_depth: queue_depth.max(1),
        }
    }

    /// Register a new connection with no name yet.
    ///
    /// # Arguments
    ///
    /// * `peer` - Remote address of the accepted socket
    /// * `hangup` - Token the connection's handler watches; cancelled when the
    ///   connection is dropped for not keeping up
    ///
    /// # Returns
    ///
    /// * `Ok(Admission)` - The connection is live and will receive broadcasts
    /// * `Err(ConnectError)` - The connection was not admitted
    pub async fn execute(
        &self,
        peer: SocketAddr,
        hangup: CancellationToken,
    ) -> Result<Admission, ConnectError> {
        let id = self.id_factory.generate();

        // Replay and join under the history lock: each line reaches the
        // newcomer exactly once, either here or through a later snapshot.
        let history = self.history.lock().await;
        let replay = if self.replay_history {
            history.lines()
        } else {
            &[]
        };

        // The replay is queued up front, so it never counts against the live budget.
        let (tx, outbound) = mpsc::channel(replay.len() + self.queue_depth);
        let member = Member::new(
            id,
            peer,
            Timestamp::new(self.clock.now_millis()),
            PusherChannel::new(tx, hangup),
        );
        for line in replay {
            if member.push(line.as_str()).is_err() {
                break;
            }
        }
        self.registry.join(member).await?;
        drop(history);

        tracing::info!("Connection {} from {} registered", id, peer);
        Ok(Admission { id, outbound })
    }

    /// Bind the display name from a connection's first line.
    ///
    /// An unusable name falls back to [`DisplayName::anonymous`].
    pub async fn bind_display_name(&self, id: ConnectionId, raw: &str) -> DisplayName {
        let name = DisplayName::new(raw).unwrap_or_else(|e| {
            tracing::warn!("Connection {} sent an unusable name ({}), using fallback", id, e);
            DisplayName::anonymous()
        });

        if !self.registry.bind_name(id, name.clone()).await {
            tracing::debug!("Connection {} left before its name was bound", id);
        }
        name
    }
}
