use axum::{
    Json, Router, async_trait,
    extract::{FromRequestParts, Path, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use folio_core::{PortfolioConfiguration, SectionTemplate};
use folio_storage::Storage;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{ApiError, ApiResult};

pub const OWNER_HEADER: &str = "x-owner-id";

#[derive(Deserialize)]
struct SaveRequest {
    config: PortfolioConfiguration,
    #[serde(default)]
    label: Option<String>,
}

pub struct ApiServer {
    pub db: Arc<Storage>,
    pub read_only: bool,
}

#[derive(Clone)]
struct AppState {
    server: Arc<ApiServer>,
}

impl ApiServer {
    pub fn new(db: Arc<Storage>, read_only: bool) -> Self {
        Self { db, read_only }
    }

    /// Build the HTTP router for this server
    pub fn router(self) -> Router {
        let state = AppState {
            server: Arc::new(self),
        };

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/health", get(handle_health))
            .route(
                "/api/portfolio/config",
                get(api_get_config).put(api_save_config),
            )
            .route("/api/portfolio/versions", get(api_list_versions))
            .route("/api/portfolio/versions/:id", get(api_get_version))
            .route(
                "/api/portfolio/versions/:id/restore",
                post(api_restore_version),
            )
            .route("/api/portfolio/publish", post(api_publish))
            .route("/api/portfolio/templates", get(api_templates))
            .route("/p/:owner", get(public_portfolio))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(state)
    }

    pub async fn serve(
        db: Arc<Storage>,
        host: &str,
        port: u16,
        read_only: bool,
    ) -> anyhow::Result<()> {
        let app = Self::new(db, read_only).router();

        let addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&addr).await?;

        info!(read_only, "folio API listening on {}", addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Owner identity taken from the `x-owner-id` header
pub struct OwnerId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|owner| !owner.is_empty())
            .map(|owner| OwnerId(owner.to_string()))
            .ok_or(ApiError::Unauthorized)
    }
}

fn ensure_writable(state: &AppState) -> ApiResult<()> {
    if state.server.read_only {
        Err(ApiError::ReadOnly)
    } else {
        Ok(())
    }
}

/// GET /health
async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "folio",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok"
    }))
}

/// GET /api/portfolio/config - Current configuration for the caller
async fn api_get_config(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
) -> ApiResult<Response> {
    let current = state.server.db.get_current_configuration(&owner).await?;

    let etag = current
        .content_hash
        .as_deref()
        .and_then(|hash| HeaderValue::from_str(&format!("\"{}\"", hash)).ok());

    let mut response = Json(current).into_response();
    if let Some(etag) = etag {
        response.headers_mut().insert(header::ETAG, etag);
    }
    Ok(response)
}

/// PUT /api/portfolio/config - Save a new version and make it current
async fn api_save_config(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    body: Result<Json<SaveRequest>, JsonRejection>,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let summary = state
        .server
        .db
        .save_configuration(&owner, &req.config, req.label)
        .await?;

    Ok((StatusCode::CREATED, Json(summary)).into_response())
}

/// GET /api/portfolio/versions - Version list, newest first
async fn api_list_versions(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
) -> ApiResult<Response> {
    let versions = state.server.db.list_versions(&owner).await?;
    Ok(Json(versions).into_response())
}

/// GET /api/portfolio/versions/:id
async fn api_get_version(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let version = state.server.db.get_version(&owner, &id).await?;
    Ok(Json(version).into_response())
}

/// POST /api/portfolio/versions/:id/restore
async fn api_restore_version(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    ensure_writable(&state)?;

    let config = state.server.db.restore_version(&owner, &id).await?;
    Ok(Json(serde_json::json!({
        "version_id": id,
        "config": config
    }))
    .into_response())
}

/// POST /api/portfolio/publish
async fn api_publish(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
) -> ApiResult<Response> {
    ensure_writable(&state)?;

    let url = state.server.db.publish(&owner).await?;
    Ok(Json(serde_json::json!({ "url": url })).into_response())
}

/// GET /api/portfolio/templates - Section templates for the add-section picker
async fn api_templates() -> Json<Vec<SectionTemplate>> {
    Json(SectionTemplate::catalog())
}

/// GET /p/:owner - Published configuration without hidden sections, no owner header required
async fn public_portfolio(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> ApiResult<Response> {
    let config = state.server.db.get_published_configuration(&owner).await?;
    Ok(Json(config.public_view()).into_response())
}
