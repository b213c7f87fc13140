//! Keep-alive HTTP server powered by axum.
//!
//! Serves:
//! - `GET /`       — basic liveness check
//! - `GET /health` — detailed health information
//! - `GET /ping`   — minimal ping response
//! - `GET /stats`  — uptime statistics and endpoint listing
//!
//! Unknown paths get a JSON 404; a handler failure (e.g. system clock
//! moving backwards past the recorded start time) gets a JSON 500.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::config::KeepAliveConfig;
use crate::error::KeepAliveError;

/// Name reported in identifying fields.
const SERVICE_NAME: &str = "TempMail Keep-Alive";

/// Shared state for the keep-alive server.
pub struct ServerState {
    /// When the server started.
    started_at: DateTime<Utc>,
    /// Configured bind address, echoed in responses.
    host: String,
    /// Configured listen port, echoed in responses.
    port: u16,
}

impl ServerState {
    /// Create state stamped with the current time.
    #[must_use]
    pub fn new(host: String, port: u16) -> Self {
        Self {
            started_at: Utc::now(),
            host,
            port,
        }
    }
}

type SharedState = Arc<ServerState>;

/// Error response rendered as the JSON 500 body.
struct ServerError(String);

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": "Internal Server Error",
            "message": self.0,
            "timestamp": Utc::now().to_rfc3339(),
        });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Build the axum router for the keep-alive server.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/ping", get(ping))
        .route("/stats", get(stats))
        .fallback(not_found)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
///
/// # Errors
///
/// Returns [`KeepAliveError::Io`] if the socket cannot be bound or the
/// server fails while running.
pub async fn serve(config: KeepAliveConfig) -> Result<(), KeepAliveError> {
    let state = Arc::new(ServerState::new(config.host.clone(), config.port));
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| KeepAliveError::Config(format!("invalid bind address: {e}")))?;

    tracing::info!("Keep-alive server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Seconds elapsed since startup.
///
/// Fails if the wall clock reports a start time in the future (clock skew),
/// which surfaces as the JSON 500 body.
fn uptime_secs(state: &ServerState) -> Result<u64, ServerError> {
    let elapsed = Utc::now().signed_duration_since(state.started_at);
    u64::try_from(elapsed.num_seconds())
        .map_err(|_| ServerError("uptime unavailable: start time is in the future".to_string()))
}

/// Render seconds as `H:MM:SS`.
fn uptime_human(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

/// GET / — basic liveness check.
async fn index(State(state): State<SharedState>) -> Result<Json<Value>, ServerError> {
    let secs = uptime_secs(&state)?;
    Ok(Json(json!({
        "status": "alive",
        "message": SERVICE_NAME,
        "uptime": uptime_human(secs),
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

/// GET /health — detailed health information.
async fn health(State(state): State<SharedState>) -> Result<Json<Value>, ServerError> {
    let secs = uptime_secs(&state)?;
    Ok(Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "uptime": {
            "human": uptime_human(secs),
            "seconds": secs,
            "started_at": state.started_at.to_rfc3339(),
        },
        "system": {
            "host": state.host,
            "port": state.port,
        },
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

/// GET /ping — minimal ping response.
async fn ping() -> Json<Value> {
    Json(json!({
        "response": "pong",
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// GET /stats — uptime statistics and endpoint listing.
async fn stats(State(state): State<SharedState>) -> Result<Json<Value>, ServerError> {
    let secs = uptime_secs(&state)?;
    Ok(Json(json!({
        "server": SERVICE_NAME,
        "stats": {
            "uptime_seconds": secs,
            "uptime_human": uptime_human(secs),
            "started_at": state.started_at.to_rfc3339(),
            "current_time": Utc::now().to_rfc3339(),
            "port": state.port,
        },
        "endpoints": [
            {"path": "/", "description": "Basic liveness check"},
            {"path": "/health", "description": "Detailed health information"},
            {"path": "/ping", "description": "Minimal ping response"},
            {"path": "/stats", "description": "Server statistics"},
        ],
    })))
}

/// JSON 404 for unknown paths.
async fn not_found() -> Response {
    let body = json!({
        "error": "Not Found",
        "message": "The requested endpoint does not exist",
        "available_endpoints": ["/", "/health", "/ping", "/stats"],
    });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_router() -> Router {
        build_router(Arc::new(ServerState::new("127.0.0.1".to_string(), 18080)))
    }

    async fn get_json(router: Router, path: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .uri(path)
            .body(Body::empty())
            .expect("request");
        let resp = router.oneshot(req).await.expect("response");
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = serde_json::from_slice(&bytes).expect("json body");
        (status, value)
    }

    #[tokio::test]
    async fn index_reports_alive() {
        let (status, body) = get_json(test_router(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "alive");
        assert!(body["uptime"].is_string());
    }

    #[tokio::test]
    async fn health_reports_uptime_and_bind_address() {
        let (status, body) = get_json(test_router(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["system"]["host"], "127.0.0.1");
        assert_eq!(body["system"]["port"], 18080);
        assert!(body["uptime"]["seconds"].is_u64());
    }

    #[tokio::test]
    async fn ping_pongs() {
        let (status, body) = get_json(test_router(), "/ping").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "pong");
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn stats_lists_endpoints() {
        let (status, body) = get_json(test_router(), "/stats").await;
        assert_eq!(status, StatusCode::OK);
        let endpoints = body["endpoints"].as_array().expect("endpoints array");
        assert_eq!(endpoints.len(), 4);
        assert_eq!(body["stats"]["port"], 18080);
    }

    #[tokio::test]
    async fn unknown_path_gets_json_404() {
        let (status, body) = get_json(test_router(), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not Found");
        assert!(body["available_endpoints"].is_array());
    }

    #[test]
    fn uptime_human_formats() {
        assert_eq!(uptime_human(0), "0:00:00");
        assert_eq!(uptime_human(61), "0:01:01");
        assert_eq!(uptime_human(3_661), "1:01:01");
        assert_eq!(uptime_human(90_000), "25:00:00");
    }
}
