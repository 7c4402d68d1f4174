//! Data transfer objects for the admin HTTP API.

pub mod http;
