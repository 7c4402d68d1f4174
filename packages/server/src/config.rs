//! Server configuration.

use std::{path::PathBuf, time::Duration};

/// Whether the sender of a line also receives its own echo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SelfDelivery {
    /// Every member of the snapshot receives the line, sender included
    #[default]
    Include,
    /// Every member except the sender
    Exclude,
}

/// Runtime configuration of the chat server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind the chat listener (and the admin API) to
    pub host: String,
    /// Chat port; `0` picks an ephemeral port
    pub port: u16,
    /// Admin HTTP API port; `None` disables the admin API
    pub admin_port: Option<u16>,
    /// Transcript file read at startup and rewritten at shutdown
    pub transcript_path: PathBuf,
    /// Send the history log to each new connection before live lines
    pub replay_history: bool,
    pub self_delivery: SelfDelivery,
    /// Upper bound on simultaneous connections; `None` is unbounded
    pub max_connections: Option<usize>,
    /// Longest accepted inbound line in bytes; longer lines end the connection
    pub max_line_length: usize,
    /// Live lines a connection may have queued; a peer that falls further
    /// behind is dropped
    pub outbound_queue_depth: usize,
    /// How long `close()` waits for handlers before flushing anyway, and how
    /// long a departing connection may take to receive its queued lines
    pub shutdown_grace: Duration,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn admin_bind_addr(&self) -> Option<String> {
        self.admin_port
            .map(|port| format!("{}:{}", self.host, port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            admin_port: None,
            transcript_path: PathBuf::from("history.txt"),
            replay_history: true,
            self_delivery: SelfDelivery::Include,
            max_connections: None,
            max_line_length: 4096,
            outbound_queue_depth: 256,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}
