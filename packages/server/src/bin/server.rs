//! Line-oriented TCP chat server.
//!
//! Every connected client sends its display name as the first line; each later
//! line is broadcast to all connected clients as `"<name>: <line>"`. The
//! conversation is loaded from the history file at startup and written back
//! when the server shuts down (`/close` on stdin, Ctrl+C or SIGTERM).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin palaver-server
//! cargo run --bin palaver-server -- --host 0.0.0.0 --port 3000 --admin-port 3001
//! ```

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use palaver_server::{
    config::{SelfDelivery, ServerConfig},
    ui::{FlushOutcome, Server, operator_close_command, shutdown_signal},
};
use palaver_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "palaver-server")]
#[command(about = "Line-oriented TCP chat server with broadcast and history", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number for the chat listener
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Port number for the admin HTTP API (disabled when omitted)
    #[arg(long)]
    admin_port: Option<u16>,

    /// Transcript file loaded at startup and rewritten at shutdown
    #[arg(long, default_value = "history.txt")]
    history_file: PathBuf,

    /// Do not send the history to newly connected clients
    #[arg(long)]
    no_replay: bool,

    /// Whether the sender receives its own messages
    #[arg(long, value_enum, default_value_t = SelfDelivery::Include)]
    self_delivery: SelfDelivery,

    /// Maximum number of simultaneous connections (unbounded when omitted)
    #[arg(long)]
    max_connections: Option<usize>,

    /// Maximum accepted line length in bytes
    #[arg(long, default_value = "4096")]
    max_line_length: usize,

    /// Live lines a client may fall behind by before it is disconnected
    #[arg(long, default_value = "256")]
    outbound_queue_depth: usize,

    /// Seconds to wait for connections to finish during shutdown
    #[arg(long, default_value = "5")]
    shutdown_grace_secs: u64,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            admin_port: args.admin_port,
            transcript_path: args.history_file,
            replay_history: !args.no_replay,
            self_delivery: args.self_delivery,
            max_connections: args.max_connections,
            max_line_length: args.max_line_length,
            outbound_queue_depth: args.outbound_queue_depth,
            shutdown_grace: Duration::from_secs(args.shutdown_grace_secs),
        }
    }
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let config = ServerConfig::from(Args::parse());
    tracing::info!(
        "Using history file {}",
        config.transcript_path.display()
    );

    let handle = match Server::new(config).start().await {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!("Server error: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Type /close to shut the server down");

    tokio::select! {
        _ = shutdown_signal() => {}
        _ = operator_close_command() => {}
    }

    let report = handle.close().await;
    match report.transcript {
        FlushOutcome::Persisted { lines } => {
            tracing::info!("History saved ({} lines)", lines)
        }
        FlushOutcome::Failed(e) => {
            tracing::error!("History was not saved: {}", e);
            std::process::exit(1);
        }
    }
}
