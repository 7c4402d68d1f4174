//! Palaver terminal chat client.
//!
//! Connects to a Palaver server, sends the display name as the first line, then
//! forwards typed lines and prints everything the server broadcasts.

pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;
pub mod ui;

pub use error::ClientError;
pub use runner::{ReconnectPolicy, run_client};
pub use session::{ClientSession, SessionEnd};
