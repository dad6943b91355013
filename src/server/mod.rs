//! Read-only HTTP API over the tracker
//!
//! Listens on localhost and serves:
//! - GET /ping - liveness and version
//! - GET /leaderboard[?limit=N] - users ranked by total XP
//! - GET /users/{id}/progress - level, badge and streak snapshot

mod handlers;
mod types;

pub use handlers::route;
pub use types::{ApiResponse, ApiState, UserProgressResponse};

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Result, anyhow};
use tiny_http::{Response, Server};
use tracing::{error, info};

use crate::progression::local_today;

const AUTH_HEADER: &str = "X-Growquest-Token";

/// A running server; dropping it leaves the thread running until exit
pub struct ServerHandle {
    server: Arc<Server>,
    thread: JoinHandle<()>,
    addr: String,
}

impl ServerHandle {
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Stop accepting requests and wait for the worker thread
    pub fn shutdown(self) {
        self.server.unblock();
        if self.thread.join().is_err() {
            error!("[growquest:http] Server thread panicked");
        }
    }
}

/// Bind `127.0.0.1:port` and serve requests on a background thread
pub fn start_http_server(state: ApiState, port: u16) -> Result<ServerHandle> {
    let bind_addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&bind_addr)
        .map_err(|e| anyhow!("Failed to start server on {}: {}", bind_addr, e))?;
    let server = Arc::new(server);

    info!(
        "[growquest:http] Server listening on http://{} (auth: {})",
        bind_addr,
        if state.token.trim().is_empty() { "disabled" } else { "enabled" }
    );

    let worker = Arc::clone(&server);
    let thread = thread::spawn(move || {
        for request in worker.incoming_requests() {
            let response = if is_authorized(&request, &state.token) {
                route(&state, request.method().as_str(), request.url(), local_today())
            } else {
                ApiResponse::error(401, "unauthorized")
            };
            respond_json(request, response);
        }
        info!("[growquest:http] Server stopped");
    });

    Ok(ServerHandle {
        server,
        thread,
        addr: bind_addr,
    })
}

fn is_authorized(request: &tiny_http::Request, expected: &str) -> bool {
    if expected.trim().is_empty() {
        return true;
    }

    request
        .headers()
        .iter()
        .find(|h| h.field.equiv(AUTH_HEADER))
        .is_some_and(|h| h.value.as_str() == expected)
}

fn json_content_type() -> tiny_http::Header {
    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .expect("static header is valid")
}

fn respond_json(request: tiny_http::Request, response: ApiResponse) {
    let body = serde_json::to_string(&response.body)
        .unwrap_or_else(|_| "{\"error\":\"serialize\"}".to_string());
    let response = Response::from_string(body)
        .with_status_code(response.status)
        .with_header(json_content_type());
    if let Err(e) = request.respond(response) {
        error!("[growquest:http] Failed to send response: {}", e);
    }
}
