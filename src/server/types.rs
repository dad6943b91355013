//! Type definitions for the HTTP server.

use serde::Serialize;
use serde_json::Value;

use crate::domain::UserId;
use crate::progression::PlayerStats;
use crate::tracker::Tracker;

/// Shared state for request handlers
#[derive(Clone)]
pub struct ApiState {
    pub tracker: Tracker,
    /// Expected `X-Growquest-Token`; empty disables auth
    pub token: String,
}

/// Status code plus JSON body, independent of the transport
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn error(status: u16, code: &str) -> Self {
        Self {
            status,
            body: serde_json::json!({ "error": code }),
        }
    }
}

/// `GET /users/{id}/progress`
#[derive(Debug, Clone, Serialize)]
pub struct UserProgressResponse {
    pub user_id: UserId,
    pub name: String,
    #[serde(flatten)]
    pub stats: PlayerStats,
}
