//! Terminal chat client with reconnection support.
//!
//! Connects to a Palaver server, sends the display name, then sends each typed
//! line and prints every broadcast line with its local receive time.
//! Reconnects automatically when the connection is lost.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin palaver-client -- --name alice
//! cargo run --bin palaver-client -- -H 10.0.0.5 -p 3000 -n bob
//! ```

use std::time::Duration;

use clap::Parser;
use palaver_client::{ReconnectPolicy, run_client, ui::spawn_input_reader};
use palaver_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "palaver-client")]
#[command(about = "Terminal client for the Palaver chat server", long_about = None)]
struct Args {
    /// Display name sent as the first line
    #[arg(short = 'n', long)]
    name: String,

    /// Server host
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Consecutive connection attempts before giving up
    #[arg(long, default_value = "5")]
    attempts: u32,

    /// Seconds between connection attempts
    #[arg(long, default_value = "5")]
    retry_interval_secs: u64,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);
    let policy = ReconnectPolicy {
        max_attempts: args.attempts.max(1),
        interval: Duration::from_secs(args.retry_interval_secs),
    };

    let mut input = spawn_input_reader(&args.name);
    if let Err(e) = run_client(&addr, &args.name, policy, &mut input).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
