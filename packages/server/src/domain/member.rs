//! The connection entity tracked by the session registry.

use std::net::SocketAddr;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;

use super::{ConnectionId, DisplayName, Timestamp};

/// Outbound side of one connection.
///
/// A bounded line queue drained by the connection's writer task, plus the token
/// its handler watches to hang up. Cloning shares both.
#[derive(Debug, Clone)]
pub struct PusherChannel {
    lines: mpsc::Sender<String>,
    hangup: CancellationToken,
}

impl PusherChannel {
    pub fn new(lines: mpsc::Sender<String>, hangup: CancellationToken) -> Self {
        Self { lines, hangup }
    }

    /// Queue one line without waiting.
    ///
    /// `Full` means the peer stopped reading; `Closed` means its writer is gone.
    pub fn try_push(&self, line: &str) -> Result<(), TrySendError<String>> {
        self.lines.try_send(line.to_string())
    }

    /// Ask the connection's handler to terminate.
    pub fn hang_up(&self) {
        self.hangup.cancel();
    }
}

/// One live connection: identity, peer address, bound name and outbound channel.
///
/// Cloning is cheap (the channel is a handle), which is what registry snapshots rely on.
#[derive(Debug, Clone)]
pub struct Member {
    pub id: ConnectionId,
    pub peer: SocketAddr,
    /// `None` until the first inbound line binds a name.
    pub name: Option<DisplayName>,
    pub connected_at: Timestamp,
    outbound: PusherChannel,
}

impl Member {
    pub fn new(
        id: ConnectionId,
        peer: SocketAddr,
        connected_at: Timestamp,
        outbound: PusherChannel,
    ) -> Self {
        Self {
            id,
            peer,
            name: None,
            connected_at,
            outbound,
        }
    }

    /// Queue one line for this member.
    pub fn push(&self, line: &str) -> Result<(), TrySendError<String>> {
        self.outbound.try_push(line)
    }

    /// Tell this member's handler to close the connection.
    pub fn hang_up(&self) {
        self.outbound.hang_up();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(depth: usize) -> (Member, mpsc::Receiver<String>, CancellationToken) {
        let (tx, rx) = mpsc::channel(depth);
        let hangup = CancellationToken::new();
        let member = Member::new(
            ConnectionId::new(1),
            "127.0.0.1:5000".parse().unwrap(),
            Timestamp::new(0),
            PusherChannel::new(tx, hangup.clone()),
        );
        (member, rx, hangup)
    }

    #[test]
    fn test_push_reports_full_queue() {
        // Test: pushing past the queue depth fails with Full instead of growing
        // given (preconditions):
        let (member, _rx, _hangup) = member(2);
        member.push("one").unwrap();
        member.push("two").unwrap();

        // when (action):
        let result = member.push("three");

        // then (expected):
        assert!(matches!(result, Err(TrySendError::Full(_))));
    }

    #[test]
    fn test_push_reports_closed_writer() {
        // Test: pushing after the writer dropped its receiver fails with Closed
        // given (preconditions):
        let (member, rx, _hangup) = member(2);
        drop(rx);

        // when (action):
        let result = member.push("one");

        // then (expected):
        assert!(matches!(result, Err(TrySendError::Closed(_))));
    }

    #[test]
    fn test_hang_up_cancels_handler_token() {
        // Test: hanging up is visible through the handler's token
        // given (preconditions):
        let (member, _rx, hangup) = member(1);

        // when (action):
        member.clone().hang_up();

        // then (expected):
        assert!(hangup.is_cancelled());
    }
}
