//! HTTP request handlers for the read-only API.
//!
//! Handlers map `(method, url)` to an [`ApiResponse`] and never touch the
//! socket, so they run the same under tiny_http and in tests.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error};

use super::types::{ApiResponse, ApiState, UserProgressResponse};
use crate::domain::UserId;
use crate::tracker::TrackerError;

/// Leaderboard size when no `limit` is given
const DEFAULT_LEADERBOARD_LIMIT: usize = 50;
const MAX_LEADERBOARD_LIMIT: usize = 500;

/// Dispatch an authorized request
pub fn route(state: &ApiState, method: &str, url: &str, today: NaiveDate) -> ApiResponse {
    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    };
    debug!("[growquest:http] {} {}", method, path);

    match (method, path) {
        ("GET", "/ping") => ApiResponse::ok(serde_json::json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
        })),
        ("GET", "/leaderboard") => handle_leaderboard(state, query, today),
        ("GET", p) if p.starts_with("/users/") && p.ends_with("/progress") => {
            handle_user_progress(state, p, today)
        }
        _ => ApiResponse::error(404, "not_found"),
    }
}

/// Handle GET /leaderboard[?limit=N]
fn handle_leaderboard(state: &ApiState, query: Option<&str>, today: NaiveDate) -> ApiResponse {
    let limit = match query_param(query, "limit") {
        None => DEFAULT_LEADERBOARD_LIMIT,
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n > 0 => n.min(MAX_LEADERBOARD_LIMIT),
            _ => return ApiResponse::error(400, "invalid_limit"),
        },
    };

    match state.tracker.leaderboard(today, Some(limit)) {
        Ok(entries) => json_or_500(&entries),
        Err(e) => internal_error("leaderboard", &e),
    }
}

/// Handle GET /users/{id}/progress
fn handle_user_progress(state: &ApiState, path: &str, today: NaiveDate) -> ApiResponse {
    let raw_id = path
        .trim_start_matches("/users/")
        .trim_end_matches("/progress")
        .trim_end_matches('/');
    let Ok(user_id) = UserId::parse(raw_id) else {
        return ApiResponse::error(400, "invalid_user_id");
    };

    let record = match state.tracker.user(&user_id) {
        Ok(Some(record)) => record,
        Ok(None) => return ApiResponse::error(404, "unknown_user"),
        Err(e) => return internal_error("user lookup", &e),
    };

    match state.tracker.player_stats(&user_id, today) {
        Ok(stats) => json_or_500(&UserProgressResponse {
            user_id,
            name: record.name,
            stats,
        }),
        Err(e) => internal_error("player stats", &e),
    }
}

fn query_param<'a>(query: Option<&'a str>, key: &str) -> Option<&'a str> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

fn json_or_500<T: Serialize>(value: &T) -> ApiResponse {
    match serde_json::to_value(value) {
        Ok(body) => ApiResponse::ok(body),
        Err(e) => {
            error!("[growquest:http] Failed to serialize response: {}", e);
            ApiResponse::error(500, "serialize")
        }
    }
}

fn internal_error(what: &str, e: &TrackerError) -> ApiResponse {
    error!("[growquest:http] {} failed: {}", what, e);
    ApiResponse::error(500, "internal")
}
