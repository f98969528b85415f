//! HTTP routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use persona_render::render_state;
use persona_swr::PageState;
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::state::{AppState, INFO_KEY};

/// Build the router: the page, the read endpoint, and a health check.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(page))
        .route(INFO_KEY, get(api_info))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The profile page, served stale-while-revalidate.
async fn page(State(state): State<AppState>) -> Response {
    let page = state.load_page();
    let status = match page {
        PageState::Error(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };
    (status, Html(render_state(&page, state.site()))).into_response()
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Fresh profile JSON.
async fn api_info(State(state): State<AppState>) -> Response {
    match state.read_now().await {
        Ok(profile) => Json(profile.as_ref().clone()).into_response(),
        Err(err) => {
            debug!(error = %err, "read endpoint failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    page: &'static str,
    has_data: bool,
    last_updated: Option<DateTime<Utc>>,
}

/// Health check. Always 200; reports what the page is showing.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.cache().snapshot(INFO_KEY);
    Json(HealthResponse {
        status: "ok",
        page: state.page_state_name(),
        has_data: snapshot.data.is_some(),
        last_updated: snapshot.last_updated,
    })
}
