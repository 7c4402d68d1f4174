//! Message formatting utilities for client display.

use palaver_shared::time::format_clock_time;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format one line received from the server
    ///
    /// # Arguments
    ///
    /// * `line` - The line as broadcast (`"<name>: <text>"` or a replayed history line)
    /// * `received_at` - Unix timestamp when the line arrived (milliseconds)
    ///
    /// # Returns
    ///
    /// The line prefixed with the local receive time, e.g. `[14:03:27] alice: hi`
    pub fn format_received(line: &str, received_at: i64) -> String {
        format!("\r[{}] {}\n", format_clock_time(received_at), line)
    }

    /// Format the greeting printed once a session is established
    pub fn format_connected(addr: &str, name: &str) -> String {
        format!(
            "\nConnected to {} as '{}'. Type messages and press Enter to send, /quit to exit.\n",
            addr, name
        )
    }

    /// Format the notice printed when the server ends the session
    pub fn format_disconnected(addr: &str) -> String {
        format!("\n- Connection to {} closed\n", addr)
    }
}
