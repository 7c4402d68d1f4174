//! Shutdown triggers: process signals and the operator console.

use std::io::BufRead;

use tokio::sync::oneshot;

/// Resolve on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

/// Resolve once the operator types `/close` on stdin.
///
/// Stdin is read on a plain thread so a pending read never holds up runtime
/// shutdown. If stdin closes without the command this never resolves.
pub async fn operator_close_command() {
    let (tx, rx) = oneshot::channel();

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) if is_close_command(&line) => {
                    let _ = tx.send(());
                    return;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Operator console read failed: {}", e);
                    break;
                }
            }
        }
    });

    if rx.await.is_ok() {
        tracing::info!("Operator requested close");
    } else {
        std::future::pending::<()>().await;
    }
}

/// `/close`, case-insensitive, surrounding whitespace ignored
pub fn is_close_command(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("/close")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_close_command() {
        // Test: only the /close command (any case) triggers shutdown
        // then (expected):
        assert!(is_close_command("/close"));
        assert!(is_close_command("  /CLOSE \r"));
        assert!(!is_close_command("/closed"));
        assert!(!is_close_command("close"));
        assert!(!is_close_command(""));
    }
}
