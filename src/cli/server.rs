//! HTTP server mode for paging over a record file

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::accessor::{DateTimeAccessor, JsonAccessor};
use crate::cli::runner::{page_response, PageResponse};
use crate::config::PagerConfig;
use crate::error::{Error, Result};
use crate::pager::{InMemorySource, Pager, RecordSource};
use crate::request::{page_size_from_query, selector_from_query};
use crate::selector::PageSelector;
use crate::types::StringMap;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Paging defaults, ordering and parameter names
    pub pager: PagerConfig,
    /// Records served
    pub records: Arc<Vec<Value>>,
}

/// App state shared across handlers
struct AppState {
    config: PagerConfig,
    /// Records, sorted once by the configured ordering
    source: InMemorySource<Value>,
}

/// Response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Build the router. Records are sorted here, not per request.
pub fn router(config: ServerConfig) -> Result<Router> {
    let mut source = InMemorySource::from_arc(config.records);
    source.apply_ordering(&config.pager.ordering, &DateTimeAccessor::new(JsonAccessor))?;

    let state = AppState {
        config: config.pager,
        source,
    };

    // Build CORS layer - allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/health", get(health))
        .route("/records", get(list_records))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state)))
}

/// Start the HTTP server
pub async fn serve(config: ServerConfig, port: u16) -> Result<()> {
    let records = config.records.len();
    let app = router(config)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(records, "Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Page over the records
///
/// An unparseable continuation token is logged and answered with the
/// first page.
async fn list_records(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StringMap>,
) -> Response {
    let selector = match selector_from_query(&params, &state.config.params) {
        Ok(selector) => selector,
        Err(Error::InvalidToken { message }) => {
            tracing::warn!(%message, "Invalid continuation token, serving first page");
            PageSelector::None
        }
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(e.to_string())),
            )
                .into_response();
        }
    };
    let page_size = page_size_from_query(&params, &state.config);

    match compute(&state, selector, page_size) {
        Ok(page) => Json(ApiResponse::success(page)).into_response(),
        Err(e) => {
            let status = if e.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            tracing::error!(error = %e, "Failed to compute page");
            (status, Json(ApiResponse::<()>::error(e.to_string()))).into_response()
        }
    }
}

fn compute(state: &AppState, selector: PageSelector, page_size: usize) -> Result<PageResponse> {
    let mut pager = Pager::new(
        state.source.clone(),
        state.config.ordering.clone(),
        DateTimeAccessor::new(JsonAccessor),
    )?
    .with_page_size(page_size);
    pager.set_current_page(selector);
    page_response(&mut pager)
}
