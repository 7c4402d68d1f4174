//! Logging setup for the Palaver binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The default filter enables `default_log_level` for this crate and for the
/// crate named by `binary_name` (dashes are mapped to underscores, so
/// `palaver-server` covers both the binary and its library). `RUST_LOG`
/// overrides the default entirely.
///
/// # Examples
///
/// ```no_run
/// use palaver_shared::logger::setup_logger;
///
/// setup_logger("palaver-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_directives(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "{}={},{}={}",
        env!("CARGO_PKG_NAME").replace('-', "_"),
        default_log_level,
        binary_name.replace('-', "_"),
        default_log_level
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_cover_shared_and_binary_crates() {
        // Test: the default filter names this crate and the binary crate
        // given (preconditions):
        let binary_name = "palaver-server";

        // when (action):
        let directives = default_directives(binary_name, "info");

        // then (expected):
        assert_eq!(directives, "palaver_shared=info,palaver_server=info");
    }
}
