//! Per-connection chat handler.
//!
//! Lifecycle: `AwaitingName → Active → terminated`. The first line binds the
//! display name, every following non-blank line is broadcast. Any of EOF, a
//! read error, an oversized or undecodable line, a dead writer, a hang-up
//! (server shutdown or falling too far behind) ends the connection, which then
//! removes itself from the registry.

use std::{io, sync::Arc};

use futures_util::{SinkExt, StreamExt};
use tokio::{
    net::{TcpStream, tcp::OwnedWriteHalf},
    sync::mpsc,
    task::JoinHandle,
};
use tokio_util::{
    codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError},
    sync::CancellationToken,
};

use crate::{
    domain::{ConnectionId, DisplayName},
    ui::state::AppState,
};

enum Phase {
    AwaitingName,
    Active { name: DisplayName },
}

enum Event {
    Inbound(Option<Result<String, LinesCodecError>>),
    OutboundClosed,
    HungUp,
}

#[derive(Debug)]
enum Termination {
    EndOfStream,
    LineTooLong,
    InvalidEncoding,
    ReadFailed(io::Error),
    OutboundClosed,
    HungUp,
}

impl Termination {
    fn from_read_error(err: LinesCodecError) -> Self {
        match err {
            LinesCodecError::MaxLineLengthExceeded => Self::LineTooLong,
            LinesCodecError::Io(e) if e.kind() == io::ErrorKind::InvalidData => {
                Self::InvalidEncoding
            }
            LinesCodecError::Io(e) => Self::ReadFailed(e),
        }
    }

    /// The peer stopped sending but may still be reading, so lines already
    /// queued for it are still written out.
    fn drains_outbound(&self) -> bool {
        !matches!(self, Self::OutboundClosed | Self::HungUp)
    }
}

/// Drive one accepted connection until it terminates.
///
/// # Arguments
///
/// * `state` - Shared use cases
/// * `stream` - The accepted socket
/// * `id` - Registry identity assigned at accept time
/// * `rx` - Outbound lines queued by broadcasts (and history replay)
/// * `hangup` - Cancelled when the server closes or drops this connection
pub async fn handle_client(
    state: Arc<AppState>,
    stream: TcpStream,
    id: ConnectionId,
    rx: mpsc::Receiver<String>,
    hangup: CancellationToken,
) {
    let (read_half, write_half) = stream.into_split();
    let mut lines = FramedRead::new(
        read_half,
        LinesCodec::new_with_max_length(state.max_line_length),
    );
    let mut pusher = pusher_loop(id, rx, write_half);
    let mut phase = Phase::AwaitingName;

    let termination = loop {
        let event = tokio::select! {
            _ = hangup.cancelled() => Event::HungUp,
            _ = &mut pusher => Event::OutboundClosed,
            next = lines.next() => Event::Inbound(next),
        };

        let line = match event {
            Event::Inbound(Some(Ok(line))) => line,
            Event::Inbound(Some(Err(e))) => break Termination::from_read_error(e),
            Event::Inbound(None) => break Termination::EndOfStream,
            Event::OutboundClosed => break Termination::OutboundClosed,
            Event::HungUp => break Termination::HungUp,
        };

        phase = match phase {
            Phase::AwaitingName => {
                let name = state
                    .connect_participant_usecase
                    .bind_display_name(id, &line)
                    .await;
                tracing::info!("Connection {} is now known as '{}'", id, name);
                Phase::Active { name }
            }
            Phase::Active { name } => {
                if !line.trim().is_empty() {
                    state
                        .send_message_usecase
                        .execute(id, &name, &line)
                        .await;
                }
                Phase::Active { name }
            }
        };
    };

    match &termination {
        Termination::LineTooLong => tracing::warn!(
            "Connection {} sent a line over {} bytes",
            id,
            state.max_line_length
        ),
        Termination::InvalidEncoding => {
            tracing::warn!("Connection {} sent a line that is not valid UTF-8", id)
        }
        Termination::ReadFailed(e) => tracing::warn!("Connection {} read failed: {}", id, e),
        other => tracing::info!("Connection {} terminated: {:?}", id, other),
    }
    if matches!(phase, Phase::AwaitingName) {
        tracing::debug!("Connection {} ended before sending a name", id);
    }

    state.disconnect_participant_usecase.execute(id).await;

    // With the member out of the registry no new line can be queued, and the
    // writer ends once it has written what is already there.
    if termination.drains_outbound() {
        let drained = tokio::select! {
            _ = hangup.cancelled() => false,
            finished = tokio::time::timeout(state.drain_timeout, &mut pusher) => finished.is_ok(),
        };
        if !drained {
            tracing::debug!("Connection {} did not drain its outbound queue", id);
        }
    }
    pusher.abort();
}

/// Spawn the task that drains `rx` into the socket's write half.
///
/// The task ends when every sender is gone or a write fails.
fn pusher_loop(
    id: ConnectionId,
    mut rx: mpsc::Receiver<String>,
    write_half: OwnedWriteHalf,
) -> JoinHandle<()> {
    let mut sink = FramedWrite::new(write_half, LinesCodec::new());
    tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if let Err(e) = sink.send(line).await {
                tracing::debug!("Connection {} write failed: {}", id, e);
                break;
            }
        }
    })
}
