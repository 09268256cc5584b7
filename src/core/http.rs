//! HTTP endpoint server using Axum

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

use crate::cache::RedisCache;
use crate::models::Signal;
use crate::signals::SignalDispatcher;
use crate::store::PreferenceStore;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<SignalDispatcher>,
    pub store: Arc<dyn PreferenceStore>,
    pub cache: Option<RedisCache>,
    pub bot_connected: Arc<AtomicBool>,
}

/// JSON error body in the `{"detail": ...}` shape callers expect.
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// Fan a signal out to every matched subscriber.
pub async fn send_signal(
    State(state): State<AppState>,
    Json(signal): Json<Signal>,
) -> Result<Json<Value>, ApiError> {
    let report = state.dispatcher.dispatch(&signal).await.map_err(|e| {
        error!(error = %e, symbol = ?signal.symbol, "Signal dispatch failed");
        ApiError::internal(e.to_string())
    })?;

    if report.total_subscribers == 0 {
        return Ok(Json(json!({
            "status": "success",
            "message": "No subscribers found",
            "sent_to": 0,
            "total_subscribers": 0
        })));
    }

    Ok(Json(json!({
        "status": "success",
        "sent_to": report.sent_count,
        "total_subscribers": report.total_subscribers
    })))
}

async fn probe(state: AppState) -> Value {
    let bot_connected = state.bot_connected.load(Ordering::SeqCst);
    let supabase_connected = state.store.ping().await.is_ok();
    let redis_connected = match &state.cache {
        Some(cache) => cache.ping().await.is_ok(),
        None => false,
    };

    json!({
        "status": "healthy",
        "bot_connected": bot_connected,
        "supabase_connected": supabase_connected,
        "redis_connected": redis_connected
    })
}

/// Report connectivity. Dependency failures are data, not errors.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    match tokio::spawn(probe(state)).await {
        Ok(body) => Json(body),
        Err(e) => {
            error!(error = %e, "Health probe aborted");
            Json(json!({ "status": "error", "message": e.to_string() }))
        }
    }
}

/// Log every server error with its route and latency.
async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = start.elapsed().as_millis() as u64,
            "HTTP request error"
        );
    }

    response
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/send", post(send_signal))
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn(error_logging_middleware))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, port: u16) -> std::io::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    axum::serve(listener, app).await
}
