//! HTTP server for the history API.
//!
//! Exposes the [`HistoryService`] and the meal-plan content as a small JSON
//! API consumed by the single-page client.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/history` | Full history document, `{ dayId: [entry, ...] }` |
//! | `POST` | `/api/history/{dayId}` | Append an entry; `201 Created` with the stored entry |
//! | `GET`  | `/api/plan` | Configured meal-plan weeks |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! All error responses share one shape:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "..." } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `storage_read` (500),
//! `storage_write` (500), `internal` (500). A POST without a day segment
//! (`/api/history/`) is a `bad_request`; unknown paths are `not_found`.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted; the client is served
//! from a different origin during development.

use axum::{
    extract::{FromRequest, Path, Request, State},
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use greenblog_core::models::{EntryDraft, HistoryDocument};

use crate::config::Config;
use crate::file_store::JsonFileStore;
use crate::history::{HistoryError, HistoryService};
use crate::plan::{load_plan, WeekPlan};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    history: Arc<HistoryService>,
    /// Meal-plan content file, if one is configured.
    plan_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(history: Arc<HistoryService>, plan_path: Option<PathBuf>) -> Self {
        Self { history, plan_path }
    }

    /// State backed by the JSON file store named in `config`.
    pub fn from_config(config: &Config) -> Self {
        let store = Arc::new(JsonFileStore::new(&config.storage.path));
        Self::new(
            Arc::new(HistoryService::new(store)),
            config.plan.as_ref().map(|p| p.path.clone()),
        )
    }
}

/// Build the application router with CORS and request tracing applied.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([header::LOCATION]);

    Router::new()
        .route("/api/history", get(handle_list_history))
        .route("/api/history/", post(handle_missing_day))
        .route("/api/history/{day_id}", post(handle_append_history))
        .route("/api/plan", get(handle_plan))
        .route("/health", get(handle_health))
        .fallback(handle_fallback)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server.
///
/// Binds to `[server].bind` and serves until Ctrl-C is received.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let app = router(AppState::from_config(config));

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        bind = %config.server.bind,
        history = %config.storage.path.display(),
        "history API listening"
    );
    println!("GreenBlog API listening on http://{}", config.server.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"storage_read"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn app_error(status: StatusCode, code: &str, message: impl Into<String>) -> AppError {
    AppError {
        status,
        code: code.to_string(),
        message: message.into(),
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    app_error(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn not_found(message: impl Into<String>) -> AppError {
    app_error(StatusCode::NOT_FOUND, "not_found", message)
}

fn internal(message: impl Into<String>) -> AppError {
    app_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::Validation(msg) => bad_request(msg),
            HistoryError::Store(e) => {
                tracing::error!(error = %e, "history storage failure");
                let code = if e.is_read() {
                    "storage_read"
                } else {
                    "storage_write"
                };
                app_error(StatusCode::INTERNAL_SERVER_ERROR, code, e.to_string())
            }
        }
    }
}

/// `Json` extractor whose rejections follow the error contract above.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(bad_request(rejection.body_text())),
        }
    }
}

/// Characters escaped in a path segment: everything except RFC 3986 unreserved.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a single path segment for the `Location` header.
fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
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

// ============ GET /api/history ============

/// Returns the stored document verbatim. A corrupt record is a 500, never
/// an empty map.
async fn handle_list_history(
    State(state): State<AppState>,
) -> Result<Json<HistoryDocument>, AppError> {
    let doc = state.history.list().await?;
    Ok(Json(doc))
}

// ============ POST /api/history/{dayId} ============

async fn handle_append_history(
    State(state): State<AppState>,
    Path(day_id): Path<String>,
    JsonBody(draft): JsonBody<EntryDraft>,
) -> Result<Response, AppError> {
    let entry = state.history.append(&day_id, draft).await?;

    let mut response = (StatusCode::CREATED, Json(entry)).into_response();
    let location = format!("/api/history/{}", encode_segment(&day_id));
    if let Ok(value) = HeaderValue::from_str(&location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    Ok(response)
}

/// `POST /api/history/`: the day segment is empty.
async fn handle_missing_day() -> AppError {
    bad_request("day id must not be empty")
}

async fn handle_fallback(uri: Uri) -> AppError {
    not_found(format!("no route for {}", uri.path()))
}

// ============ GET /api/plan ============

async fn handle_plan(State(state): State<AppState>) -> Result<Json<Vec<WeekPlan>>, AppError> {
    let path = state
        .plan_path
        .clone()
        .ok_or_else(|| not_found("no meal plan configured"))?;

    let weeks = tokio::task::spawn_blocking(move || load_plan(&path))
        .await
        .map_err(|e| internal(e.to_string()))?
        .map_err(|e| {
            let message = format!("{:#}", e);
            tracing::error!(error = %message, "meal plan unavailable");
            internal(message)
        })?;

    Ok(Json(weeks))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("montag"), "montag");
        assert_eq!(encode_segment("woche 2"), "woche%202");
        assert_eq!(encode_segment("märz"), "m%C3%A4rz");
        assert_eq!(encode_segment("a/b"), "a%2Fb");
        assert_eq!(encode_segment("rest-tag_2.~"), "rest-tag_2.~");
    }

    #[test]
    fn test_history_error_mapping() {
        let err: AppError = HistoryError::Validation("day id must not be empty".into()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "bad_request");

        let parse = serde_json::from_str::<HistoryDocument>("[").unwrap_err();
        let err: AppError = HistoryError::Store(greenblog_core::store::StoreError::Parse {
            path: PathBuf::from("history.json"),
            source: parse,
        })
        .into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, "storage_read");

        let err: AppError = HistoryError::Store(greenblog_core::store::StoreError::Write {
            path: PathBuf::from("history.json"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        })
        .into();
        assert_eq!(err.code, "storage_write");
    }
}
