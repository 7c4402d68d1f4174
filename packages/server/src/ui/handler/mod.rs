//! Connection and HTTP handlers.

pub mod client;
pub mod http;

pub use client::handle_client;
pub use http::admin_router;
