//! HTTP server exposing the link engine and whitelist administration.
//!
//! ## API Endpoints
//!
//! - `GET /api/health` - Liveness probe
//! - `GET /api/snapshot` - Snapshot version and entry count
//! - `GET /api/terms` - All whitelist terms with aliases
//! - `POST /api/terms` - Create a term (idempotent by lowercase form)
//! - `PUT /api/terms/{id}` - Update a term
//! - `DELETE /api/terms/{id}` - Delete a term (cascades aliases)
//! - `POST /api/terms/{id}/aliases` - Add aliases to a term
//! - `DELETE /api/aliases/{id}` - Remove one alias
//! - `GET /api/articles/{id}/overrides` - List overrides for an article
//! - `PUT /api/articles/{id}/overrides` - Upsert one override
//! - `DELETE /api/articles/{id}/overrides/{term}` - Remove an override
//! - `GET /api/articles/{id}/headings` - Cached heading titles
//! - `POST /api/articles/{id}/headings/generate` - Generate and cache titles
//! - `DELETE /api/articles/{id}/headings` - Drop the article's heading cache
//! - `POST /api/articles/{id}/resolve` - Resolve links for content
//! - `POST /api/articles/{id}/render` - Render content with links applied

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use eyre::{Result, WrapErr};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use termlink_api::*;

use crate::engine::LinkEngine;
use crate::error::EngineError;

/// State shared across HTTP handlers.
pub struct AppState {
    pub engine: LinkEngine,
}

/// Build the API router over an engine.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(api_health))
        .route("/api/snapshot", get(api_snapshot))
        .route("/api/terms", get(api_list_terms).post(api_create_term))
        .route("/api/terms/{id}", put(api_update_term).delete(api_delete_term))
        .route("/api/terms/{id}/aliases", post(api_add_aliases))
        .route("/api/aliases/{id}", delete(api_remove_alias))
        .route(
            "/api/articles/{id}/overrides",
            get(api_list_overrides).put(api_upsert_override),
        )
        .route(
            "/api/articles/{id}/overrides/{term}",
            delete(api_delete_override),
        )
        .route(
            "/api/articles/{id}/headings",
            get(api_list_headings).delete(api_delete_headings),
        )
        .route("/api/articles/{id}/headings/generate", post(api_generate_headings))
        .route("/api/articles/{id}/resolve", post(api_resolve))
        .route("/api/articles/{id}/render", post(api_render))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Run the server until interrupted.
pub async fn run(state: Arc<AppState>, port: u16) -> Result<()> {
    let app = router(state);
    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {}", addr))?;

    info!("termlink listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

fn error_response(e: EngineError) -> Response {
    let status = match &e {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Store(_) => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ApiErrorBody {
            error: e.to_string(),
        }),
    )
        .into_response()
}

async fn api_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /api/snapshot - Snapshot cache state.
async fn api_snapshot(State(state): State<Arc<AppState>>) -> Response {
    match state.engine.index.get_snapshot().await {
        Ok(snapshot) => Json(ApiSnapshotInfo::from(&snapshot)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/terms - All terms with their aliases.
async fn api_list_terms(State(state): State<Arc<AppState>>) -> Response {
    match state.engine.index.list_terms().await {
        Ok(rows) => {
            let terms: Vec<ApiTerm> = rows
                .iter()
                .map(|(term, aliases)| ApiTerm::from_rows(term, aliases))
                .collect();
            Json(terms).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// POST /api/terms - Create a whitelist term.
async fn api_create_term(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTermRequest>,
) -> Response {
    match state
        .engine
        .index
        .create_term(&req.canonical_term, &req.standalone_title, req.description)
        .await
    {
        Ok(term) => term_response(&state, term).await,
        Err(e) => error_response(e),
    }
}

/// One term with its aliases, as the create/update handlers respond.
/// An idempotent create can return a term that already has aliases.
async fn term_response(state: &AppState, term: termlink_core::WhitelistTerm) -> Response {
    match state.engine.index.list_aliases_for_term(term.id).await {
        Ok(aliases) => Json(ApiTerm::from_rows(&term, &aliases)).into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/terms/{id} - Update a whitelist term.
async fn api_update_term(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(req): Json<UpdateTermRequest>,
) -> Response {
    let update = crate::index::TermUpdate {
        canonical_term: req.canonical_term,
        standalone_title: req.standalone_title,
        description: req.description,
        is_active: req.is_active,
    };
    match state.engine.index.update_term(id, update).await {
        Ok(term) => term_response(&state, term).await,
        Err(e) => error_response(e),
    }
}

/// DELETE /api/terms/{id} - Delete a term and its aliases.
async fn api_delete_term(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> Response {
    match state.engine.index.delete_term(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/terms/{id}/aliases - Add aliases to a term.
async fn api_add_aliases(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(req): Json<AddAliasesRequest>,
) -> Response {
    match state.engine.index.add_aliases(id, &req.aliases).await {
        Ok(rows) => {
            let aliases: Vec<ApiAlias> = rows.iter().map(ApiAlias::from).collect();
            Json(aliases).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// DELETE /api/aliases/{id} - Remove one alias.
async fn api_remove_alias(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> Response {
    match state.engine.index.remove_alias(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/articles/{id}/overrides - Overrides for one article.
async fn api_list_overrides(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.engine.overrides.list_for_article(&id).await {
        Ok(rows) => {
            let overrides: Vec<ApiOverride> = rows.iter().map(ApiOverride::from).collect();
            Json(overrides).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// PUT /api/articles/{id}/overrides - Upsert one override.
async fn api_upsert_override(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpsertOverrideRequest>,
) -> Response {
    match state.engine.overrides.upsert(&id, &req.term, req.action).await {
        Ok(row) => Json(ApiOverride::from(&row)).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/articles/{id}/overrides/{term} - Remove an override.
async fn api_delete_override(
    State(state): State<Arc<AppState>>,
    Path((id, term)): Path<(String, String)>,
) -> Response {
    match state.engine.overrides.delete(&id, &term).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/articles/{id}/headings - Cached heading titles.
async fn api_list_headings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.engine.headings.list_for_article(&id).await {
        Ok(rows) => {
            let headings: Vec<ApiHeadingLink> = rows.iter().map(ApiHeadingLink::from).collect();
            Json(headings).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// POST /api/articles/{id}/headings/generate - Generate titles for
/// every heading in the submitted content and cache them.
async fn api_generate_headings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<GenerateTitlesRequest>,
) -> Response {
    let requester_id = req.requester_id.as_deref().unwrap_or("server");
    let titles = state
        .engine
        .headings
        .generate_standalone_titles(&req.content, &req.article_title, requester_id)
        .await;
    if let Err(e) = state.engine.headings.save_heading_links(&id, &titles).await {
        return error_response(e);
    }
    Json(titles).into_response()
}

/// DELETE /api/articles/{id}/headings - Drop the heading cache.
async fn api_delete_headings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.engine.headings.delete_heading_links(&id).await {
        Ok(deleted) => Json(serde_json::json!({"deleted": deleted})).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/articles/{id}/resolve - Resolve links for content.
async fn api_resolve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ResolveRequest>,
) -> Response {
    match state.engine.resolve_links_for_article(&id, &req.content).await {
        Ok(links) => {
            let links: Vec<ApiResolvedLink> = links.iter().map(ApiResolvedLink::from).collect();
            Json(ResolveResponse { links }).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// POST /api/articles/{id}/render - Content with links applied.
///
/// Unlike resolve, a failure here degrades to the unmodified content.
async fn api_render(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ResolveRequest>,
) -> Response {
    let content = state.engine.render_article(&id, &req.content).await;
    Json(RenderResponse { content }).into_response()
}
