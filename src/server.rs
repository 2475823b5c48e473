//! REST HTTP server.
//!
//! Maps HTTP routes onto [`ContactService`] operations.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/contacts` | List all contacts, newest first |
//! | `GET`    | `/contacts/search?q=term` | Substring search over name and email |
//! | `GET`    | `/contacts/count` | Total number of contacts |
//! | `GET`    | `/contacts/{id}` | Fetch one contact |
//! | `POST`   | `/contacts` | Create a contact from `{ "name", "email" }` |
//! | `DELETE` | `/contacts/{id}` | Delete a contact |
//! | `GET`    | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "validation_failed", "message": "...", "details": ["Name is required"] } }
//! ```
//!
//! Error codes: `validation_failed` (400), `bad_request` (400),
//! `not_found` (404), `duplicate_email` (409), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser UI served
//! from another origin can call the API.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::error::ContactError;
use crate::models::{ContactResponse, NewContact};
use crate::service::ContactService;
use crate::store;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    service: ContactService,
}

/// Starts the HTTP server on `[server].bind`.
///
/// Opens the configured store, serves until Ctrl-C, then closes the store.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let store = store::open(config).await?;
    let service = ContactService::new(store.clone());

    let listener = TcpListener::bind(&config.server.bind).await?;
    info!(
        "contacts API listening on http://{}",
        listener.local_addr()?
    );

    let result = serve(listener, service, shutdown_signal()).await;

    store.close().await;
    info!("contact store closed");
    result
}

/// Serves the API on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    service: ContactService,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Builds the router with CORS and request tracing layers.
pub fn router(service: ContactService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/contacts", get(handle_list).post(handle_create))
        .route("/contacts/search", get(handle_search))
        .route("/contacts/count", get(handle_count))
        .route("/contacts/{id}", get(handle_get).delete(handle_delete))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { service })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"validation_failed"`).
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<Vec<String>>,
}

impl AppError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
                details: self.details,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::NOT_FOUND, "not_found", message)
}

impl From<ContactError> for AppError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::ValidationFailed(errors) => AppError {
                status: StatusCode::BAD_REQUEST,
                code: "validation_failed",
                message: "contact failed validation".to_string(),
                details: Some(errors),
            },
            ContactError::DuplicateEmail(email) => AppError::new(
                StatusCode::CONFLICT,
                "duplicate_email",
                format!("a contact with email {} already exists", email),
            ),
            ContactError::Storage(e) => {
                // Storage faults stay opaque to callers.
                error!("storage failure: {:#}", e);
                AppError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "internal server error",
                )
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::new(StatusCode::BAD_REQUEST, "bad_request", rejection.body_text())
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ /contacts ============

async fn handle_list(State(state): State<AppState>) -> Result<Json<Vec<ContactResponse>>, AppError> {
    Ok(Json(state.service.get_all().await?))
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

/// Handler for `GET /contacts/search`. A missing or blank `q` lists everything.
async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ContactResponse>>, AppError> {
    Ok(Json(state.service.search(&params.q).await?))
}

#[derive(Serialize)]
struct CountResponse {
    count: u64,
}

async fn handle_count(State(state): State<AppState>) -> Result<Json<CountResponse>, AppError> {
    Ok(Json(CountResponse {
        count: state.service.count().await?,
    }))
}

async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContactResponse>, AppError> {
    state
        .service
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("contact not found: {}", id)))
}

/// Handler for `POST /contacts`. Returns `201` with the created contact.
async fn handle_create(
    State(state): State<AppState>,
    payload: Result<Json<NewContact>, JsonRejection>,
) -> Result<(StatusCode, Json<ContactResponse>), AppError> {
    let Json(input) = payload?;
    let created = state.service.create(&input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Serialize)]
struct DeleteResponse {
    message: String,
    id: String,
}

async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    if state.service.delete(&id).await? {
        Ok(Json(DeleteResponse {
            message: "contact deleted".to_string(),
            id,
        }))
    } else {
        Err(not_found(format!("contact not found: {}", id)))
    }
}
