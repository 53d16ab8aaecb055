//! HTTP server for the front end.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/get_random_shloka` | Explain a random verse |
//! | `POST` | `/get_advice` | Advice for `{"life_situation": ...}` |
//! | `GET`  | `/health` | Version and startup indexing outcome |
//!
//! # Error Contract
//!
//! Every response is `200 OK`. Failures are carried in the body: the
//! random-shloka text degrades to an apology, and advice requests answer
//! `{"error": "..."}` with one of two fixed messages.
//!
//! # CORS
//!
//! Only the configured origins (default `http://localhost:3000`) are
//! allowed. Requested methods and headers are mirrored and credentials are
//! permitted.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

use crate::advisor::Advisor;
use crate::indexer::IndexOutcome;
use crate::models::{AdviceRequest, AdviceResponse, ShlokaResponse};

pub const LIFE_SITUATION_REQUIRED: &str = "Life situation is required.";
pub const REQUEST_FAILED: &str = "An error occurred while processing the request.";

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub advisor: Arc<Advisor>,
    /// Outcome of the startup indexing phase, reported by `/health`.
    pub index: Arc<IndexOutcome>,
}

impl AppState {
    pub fn new(advisor: Arc<Advisor>, index: IndexOutcome) -> Self {
        Self {
            advisor,
            index: Arc::new(index),
        }
    }
}

/// Build the CORS layer for the given origins.
pub fn cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).map_err(|e| anyhow::anyhow!("invalid CORS origin {:?}: {}", o, e))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    // Wildcards are not allowed together with credentials, so mirror instead.
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

pub fn build_router(state: AppState, allowed_origins: &[String]) -> anyhow::Result<Router> {
    let router = Router::new()
        .route("/get_random_shloka", get(handle_random_shloka))
        .route("/get_advice", post(handle_get_advice))
        .route("/health", get(handle_health))
        .layer(cors_layer(allowed_origins)?)
        .with_state(state);
    Ok(router)
}

/// Bind `bind_addr` and serve until the process is terminated.
pub async fn run_server(
    bind_addr: &str,
    state: AppState,
    allowed_origins: &[String],
) -> anyhow::Result<()> {
    let app = build_router(state, allowed_origins)?;

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(addr = %listener.local_addr()?, "server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ GET /get_random_shloka ============

async fn handle_random_shloka(State(state): State<AppState>) -> Json<ShlokaResponse> {
    Json(ShlokaResponse {
        shloka: state.advisor.random_shloka().await,
    })
}

// ============ POST /get_advice ============

async fn handle_get_advice(
    State(state): State<AppState>,
    payload: Result<Json<AdviceRequest>, JsonRejection>,
) -> Json<AdviceResponse> {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            warn!(error = %rejection, "unreadable advice request");
            return Json(AdviceResponse::Error(REQUEST_FAILED.to_string()));
        }
    };

    let Some(situation) = request.situation() else {
        return Json(AdviceResponse::Error(LIFE_SITUATION_REQUIRED.to_string()));
    };

    match state.advisor.advise(situation).await {
        Ok(advice) => Json(AdviceResponse::Advice(advice)),
        Err(e) => {
            error!(error = %e, "an error occurred while processing the request");
            Json(AdviceResponse::Error(REQUEST_FAILED.to_string()))
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    index: IndexOutcome,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        index: (*state.index).clone(),
    })
}
