//! HTTP surface of the relay: route table, shared-secret check and the
//! mapping from [`RelayError`] to response bodies.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::{self, Config};
use crate::entries::{self, TaggedEntry};
use crate::error::RelayError;
use crate::notion::NotionApi;
use crate::reconcile::reconcile;
use crate::snippets::{Snippet, SnippetApi};
use crate::walker::TreeWalker;

/// Everything a handler needs: static configuration plus the two
/// upstream clients behind their trait seams.
pub struct AppState {
    pub config: Arc<Config>,
    pub notion: Arc<dyn NotionApi>,
    pub snippets: Arc<dyn SnippetApi>,
}

/// Builds the axum router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/now", get(now))
        .route("/fetch_notion", get(fetch_notion))
        .route("/fetch_notion_page_ids", get(fetch_notion_page_ids))
        .route("/fetch_notion_snippet", get(fetch_notion_snippet))
        .route(
            "/fetch_notion_snippet_compare_check",
            get(fetch_notion_snippet_compare_check),
        )
        .route("/fetch_notion_doc_md", get(fetch_notion_doc_md))
        .route("/fetch_snippet", get(fetch_snippet))
        .route("/add_snippet", post(add_snippet))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handler-level failure, mapped onto the relay's wire contract.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or wrong `Api-Key` header.
    Unauthorized,
    Relay(RelayError),
}

impl From<RelayError> for ApiError {
    fn from(e: RelayError) -> Self {
        ApiError::Relay(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "Unauthorized"})),
            )
                .into_response(),
            // Upstream non-success is encoded in the body, not the
            // status line; only the 401 path uses a real status code.
            ApiError::Relay(RelayError::UpstreamStatus { status, message }) => (
                StatusCode::OK,
                Json(json!({"error": status, "message": message})),
            )
                .into_response(),
            ApiError::Relay(e) => {
                warn!(error = %e, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": e.to_string()})),
                )
                    .into_response()
            }
        }
    }
}

/// Checks the shared-secret header before any upstream call is made.
fn authorize(headers: &HeaderMap, config: &Config) -> Result<(), ApiError> {
    let provided = headers
        .get("Api-Key")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;
    if provided != config.api_key {
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

const INDEX_HTML: &str = "<!doctype html>\n<html>\n  <body>\n    <h1>snippet-relay</h1>\n    <p>See /now, /fetch_notion, /fetch_notion_page_ids, /fetch_notion_snippet,\n    /fetch_notion_snippet_compare_check, /fetch_notion_doc_md, /fetch_snippet,\n    /add_snippet.</p>\n  </body>\n</html>\n";

async fn home() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn now() -> Json<Value> {
    let now = Local::now();
    Json(json!({
        "date": now.format("%Y-%m-%d").to_string(),
        "time": now.format("%H:%M:%S").to_string(),
        "iso": now.to_rfc3339(),
    }))
}

async fn fetch_notion(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    authorize(&headers, &state.config)?;
    let raw = state.notion.query_database().await?;
    Ok(Json(raw))
}

async fn fetch_notion_page_ids(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<entries::PageSummary>>, ApiError> {
    authorize(&headers, &state.config)?;
    let raw = state.notion.query_database().await?;
    let entries = entries::parse_entries(raw)?;
    Ok(Json(entries::page_summaries(&entries)))
}

#[derive(Deserialize)]
struct DateParams {
    date: String,
}

async fn fetch_notion_snippet(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<DateParams>,
) -> Result<Json<Vec<TaggedEntry>>, ApiError> {
    authorize(&headers, &state.config)?;
    let tagged = tagged_entries_with_content(&state, &params.date).await?;
    Ok(Json(tagged))
}

async fn fetch_notion_snippet_compare_check(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<DateParams>,
) -> Result<Json<Value>, ApiError> {
    authorize(&headers, &state.config)?;

    let tagged = tagged_entries_with_content(&state, &params.date).await?;
    let snippets = state.snippets.list(&params.date, &params.date).await?;
    let result = reconcile(&tagged, &snippets, config::USER_EMAILS);
    Ok(Json(json!({"result": result})))
}

#[derive(Deserialize)]
struct PageIdParams {
    page_id: String,
}

async fn fetch_notion_doc_md(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<PageIdParams>,
) -> Result<Json<Vec<String>>, ApiError> {
    authorize(&headers, &state.config)?;

    let page_id = params.page_id.replace('-', "");
    let walker = TreeWalker::new(state.notion.clone(), state.config.walk.clone());
    let lines = walker.walk(&page_id).await?;
    Ok(Json(lines))
}

#[derive(Deserialize)]
struct RangeParams {
    date_from: String,
    date_to: String,
}

async fn fetch_snippet(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<Snippet>>, ApiError> {
    authorize(&headers, &state.config)?;
    let snippets = state
        .snippets
        .list(&params.date_from, &params.date_to)
        .await?;
    Ok(Json(snippets))
}

async fn add_snippet(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(snippet): Json<Snippet>,
) -> Result<Json<Value>, ApiError> {
    authorize(&headers, &state.config)?;
    let response = state.snippets.create(&snippet).await?;
    Ok(Json(response))
}

async fn tagged_entries_with_content(
    state: &AppState,
    date: &str,
) -> Result<Vec<TaggedEntry>, RelayError> {
    let raw = state.notion.query_database().await?;
    let entries = entries::parse_entries(raw)?;
    let walker = TreeWalker::new(state.notion.clone(), state.config.walk.clone());
    entries::tagged_for_date_with_content(&entries, date, &walker).await
}
