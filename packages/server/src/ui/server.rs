//! Server control loop: listener ownership, accept loop and lifecycle.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use palaver_shared::time::{Clock, SystemClock};
use thiserror::Error;
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    sync::{Mutex, OnceCell},
    task::JoinHandle,
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{
    config::ServerConfig,
    domain::{TranscriptError, TranscriptStore},
    infrastructure::{HistoryLog, SessionRegistry, transcript::FileTranscriptStore},
    usecase::{
        ConnectError, ConnectParticipantUseCase, DisconnectParticipantUseCase,
        GetSessionStateUseCase, SendMessageUseCase, SessionState,
    },
};

use super::{
    handler::{admin_router, handle_client},
    state::AppState,
};

/// Pause after a failed `accept` before trying again
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Line sent to a connection refused because the registry is full
const SERVER_FULL_LINE: &[u8] = b"server full, try again later\n";

/// Fatal startup errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to restore history: {0}")]
    Transcript(#[from] TranscriptError),
}

/// What happened to the transcript during `close()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    Persisted { lines: usize },
    Failed(String),
}

/// Result of a controlled shutdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseReport {
    /// Every handler finished within the shutdown grace period
    pub handlers_finished: bool,
    pub transcript: FlushOutcome,
}

/// Chat server, configured but not yet listening
///
/// # Example
///
/// ```ignore
/// let handle = Server::new(ServerConfig::default()).start().await?;
/// // ...
/// handle.close().await;
/// ```
pub struct Server {
    config: ServerConfig,
    store: Arc<dyn TranscriptStore>,
    clock: Arc<dyn Clock>,
}

impl Server {
    /// Server persisting into the config's transcript file, using the system clock
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(FileTranscriptStore::new(config.transcript_path.clone()));
        Self {
            config,
            store,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn TranscriptStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Restore history, bind the listeners and start accepting.
    ///
    /// # Errors
    ///
    /// Returns an error if the transcript cannot be read or a listener cannot
    /// be bound; the accept loop is not started in that case.
    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let config = self.config;

        let history = Arc::new(HistoryLog::restore(self.store).await?);
        let registry = Arc::new(match config.max_connections {
            Some(max) => SessionRegistry::with_capacity(max),
            None => SessionRegistry::new(),
        });

        let listener = bind(config.bind_addr()).await?;
        let local_addr = listener.local_addr().map_err(|source| ServerError::Bind {
            addr: config.bind_addr(),
            source,
        })?;
        let admin_listener = match config.admin_bind_addr() {
            Some(addr) => Some(bind(addr).await?),
            None => None,
        };

        let state = Arc::new(AppState {
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                registry.clone(),
                history.clone(),
                self.clock,
                config.replay_history,
                config.outbound_queue_depth,
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                registry.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                registry.clone(),
                history.clone(),
                config.self_delivery,
            )),
            get_session_state_usecase: Arc::new(GetSessionStateUseCase::new(
                registry,
                history.clone(),
            )),
            max_line_length: config.max_line_length,
            drain_timeout: config.shutdown_grace,
        });

        let shutdown = CancellationToken::new();
        let handlers = TaskTracker::new();
        let mut tasks = Vec::new();

        tracing::info!("Chat server listening on {}", local_addr);
        tasks.push(tokio::spawn(accept_loop(
            listener,
            state.clone(),
            shutdown.clone(),
            handlers.clone(),
        )));

        let mut admin_addr = None;
        if let Some(listener) = admin_listener {
            let addr = listener.local_addr().map_err(|source| ServerError::Bind {
                addr: config.admin_bind_addr().unwrap_or_default(),
                source,
            })?;
            tracing::info!("Admin API listening on http://{}/api", addr);
            admin_addr = Some(addr);
            tasks.push(tokio::spawn(serve_admin(
                listener,
                state.clone(),
                shutdown.clone(),
            )));
        }

        Ok(ServerHandle {
            local_addr,
            admin_addr,
            state,
            history,
            shutdown,
            handlers,
            tasks: Mutex::new(tasks),
            shutdown_grace: config.shutdown_grace,
            close_report: OnceCell::new(),
        })
    }
}

async fn bind(addr: String) -> Result<TcpListener, ServerError> {
    TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Handle to a running server
pub struct ServerHandle {
    local_addr: SocketAddr,
    admin_addr: Option<SocketAddr>,
    state: Arc<AppState>,
    history: Arc<HistoryLog>,
    shutdown: CancellationToken,
    handlers: TaskTracker,
    /// Accept loop and admin server
    tasks: Mutex<Vec<JoinHandle<()>>>,
    shutdown_grace: Duration,
    close_report: OnceCell<CloseReport>,
}

impl ServerHandle {
    /// Address the chat listener is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Address of the admin API, if enabled
    pub fn admin_addr(&self) -> Option<SocketAddr> {
        self.admin_addr
    }

    pub async fn session_state(&self) -> SessionState {
        self.state.get_session_state_usecase.execute().await
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Stop accepting, terminate every handler, flush the history log.
    ///
    /// Idempotent: later (or concurrent) calls wait for the first one and
    /// return its report; the transcript is flushed once.
    pub async fn close(&self) -> CloseReport {
        self.close_report
            .get_or_init(|| self.shutdown_and_flush())
            .await
            .clone()
    }

    async fn shutdown_and_flush(&self) -> CloseReport {
        tracing::info!("Shutting down chat server on {}", self.local_addr);
        self.shutdown.cancel();

        // The accept loop owns the listener; once it returns the port is released.
        for task in self.tasks.lock().await.drain(..) {
            match tokio::time::timeout(self.shutdown_grace, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!("Server task ended abnormally: {}", e),
                Err(_) => tracing::warn!("Server task did not stop within the grace period"),
            }
        }

        self.handlers.close();
        let handlers_finished = tokio::time::timeout(self.shutdown_grace, self.handlers.wait())
            .await
            .is_ok();
        if !handlers_finished {
            tracing::warn!(
                "{} connection handler(s) still running after {:?}",
                self.handlers.len(),
                self.shutdown_grace
            );
        }

        let transcript = match self.history.flush().await {
            Ok(lines) => FlushOutcome::Persisted { lines },
            Err(e) => {
                tracing::error!("History flush failed: {}", e);
                FlushOutcome::Failed(e.to_string())
            }
        };

        tracing::info!("Server shutdown complete");
        CloseReport {
            handlers_finished,
            transcript,
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Accept connections until `shutdown` is cancelled.
async fn accept_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: CancellationToken,
    handlers: TaskTracker,
) {
    loop {
        let (stream, peer) = tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::debug!("Accept loop received shutdown signal");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!("Failed to accept connection: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            },
        };

        admit(&state, stream, peer, &shutdown, &handlers).await;
    }
}

/// Register an accepted socket and hand it to its own handler task.
async fn admit(
    state: &Arc<AppState>,
    stream: TcpStream,
    peer: SocketAddr,
    shutdown: &CancellationToken,
    handlers: &TaskTracker,
) {
    let hangup = shutdown.child_token();

    match state
        .connect_participant_usecase
        .execute(peer, hangup.clone())
        .await
    {
        Ok(admission) => {
            handlers.spawn(handle_client(
                state.clone(),
                stream,
                admission.id,
                admission.outbound,
                hangup,
            ));
        }
        Err(ConnectError::CapacityExceeded { max }) => {
            tracing::warn!("Refusing {}: server full ({} connections)", peer, max);
            handlers.spawn(refuse(stream));
        }
        Err(e @ ConnectError::DuplicateConnection(_)) => {
            tracing::error!("Dropping connection from {}: {}", peer, e);
        }
    }
}

async fn refuse(mut stream: TcpStream) {
    if let Err(e) = stream.write_all(SERVER_FULL_LINE).await {
        tracing::debug!("Failed to notify refused connection: {}", e);
    }
    let _ = stream.shutdown().await;
}

async fn serve_admin(listener: TcpListener, state: Arc<AppState>, shutdown: CancellationToken) {
    let app = admin_router(state);
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
    {
        tracing::error!("Admin API error: {}", e);
    }
}
