//! JSON bodies served by the admin HTTP API.

use serde::{Deserialize, Serialize};

/// One live connection, as listed by `GET /api/members`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDto {
    pub connection_id: u64,
    /// `None` while the connection has not sent its name line yet
    pub name: Option<String>,
    pub peer: String,
    /// RFC 3339 (UTC)
    pub connected_at: String,
}

/// Response of `GET /api/members`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembersDto {
    pub count: usize,
    pub members: Vec<MemberDto>,
}

/// Response of `GET /api/history`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDto {
    pub count: usize,
    pub lines: Vec<String>,
}
