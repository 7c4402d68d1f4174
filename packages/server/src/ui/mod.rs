//! UI layer: the TCP chat listener, per-connection handlers and the admin API.

mod handler;
mod server;
mod signal;
mod state;

pub use server::{CloseReport, FlushOutcome, Server, ServerError, ServerHandle};
pub use signal::{is_close_command, operator_close_command, shutdown_signal};
pub use state::AppState;
