//! Client execution logic with reconnection support.

use std::time::Duration;

use tokio::sync::mpsc;

use super::{
    error::ClientError,
    session::{ClientSession, SessionEnd},
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// How often and how fast to retry a lost or refused connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RECONNECT_ATTEMPTS,
            interval: Duration::from_secs(RECONNECT_INTERVAL_SECS),
        }
    }
}

/// Run the chat client, reconnecting as long as the policy allows.
///
/// Consecutive failures count against `policy.max_attempts`; a session that
/// connected successfully resets the count.
pub async fn run_client(
    addr: &str,
    name: &str,
    policy: ReconnectPolicy,
    input: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let mut failures = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} as '{}' (attempt {}/{})",
            addr,
            name,
            failures + 1,
            policy.max_attempts
        );

        let outcome = match ClientSession::connect(addr, name).await {
            Ok(session) => {
                failures = 0;
                session.run(input).await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(SessionEnd::Quit) => {
                tracing::info!("Client session ended normally");
                return Ok(());
            }
            Ok(SessionEnd::ServerClosed) => tracing::warn!("Server closed the connection"),
            Err(e) => tracing::warn!("Connection lost: {}", e),
        }

        failures += 1;
        if failures >= policy.max_attempts {
            tracing::error!("Failed to reconnect after {} attempts", failures);
            return Err(ClientError::ReconnectExhausted { attempts: failures });
        }

        tracing::info!(
            "Reconnecting in {:?}... (attempt {}/{})",
            policy.interval,
            failures + 1,
            policy.max_attempts
        );
        tokio::time::sleep(policy.interval).await;
    }
}
