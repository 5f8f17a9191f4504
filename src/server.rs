//! HTTP surface for the import pipeline.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/import-lampadaires` | Replace the registry from a GeoJSON upload |
//! | `POST` | `/` | Same as above, for function-style deployments |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! Errors are returned as `{ "error": "message" }`.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{
        HeaderMap, HeaderName, Method, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::client::Backend;
use crate::error::ImportError;
use crate::pipeline::{ImportPipeline, ImportReport};

struct AppState<B> {
    pipeline: Arc<ImportPipeline<B>>,
}

impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// An [`ImportError`] mapped to an HTTP status.
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        let status = match &err {
            ImportError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ImportError::Forbidden(_) => StatusCode::FORBIDDEN,
            ImportError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Error: {}", err);
        }

        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Builds the router around a shared pipeline.
pub fn build_router<B>(pipeline: Arc<ImportPipeline<B>>) -> Router
where
    B: Backend + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]);

    Router::new()
        .route("/", post(handle_import::<B>))
        .route("/import-lampadaires", post(handle_import::<B>))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { pipeline })
}

/// Binds `bind` and serves until the process is stopped.
pub async fn serve<B>(bind: &str, pipeline: Arc<ImportPipeline<B>>) -> Result<(), ImportError>
where
    B: Backend + 'static,
{
    let app = build_router(pipeline);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Import service listening on http://{}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn handle_import<B>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ImportReport>, AppError>
where
    B: Backend + 'static,
{
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let report = state.pipeline.run(authorization, &body).await?;
    Ok(Json(report))
}

async fn handle_health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
