//! Statistics and report endpoints

use axum::{extract::State, Json};

use crate::{services::stats::StatsResponse, AppState};

/// Get library statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Library statistics", body = StatsResponse)
    )
)]
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.services.stats.get_stats().await)
}

/// Plain-text listing of items, copies and members
#[utoipa::path(
    get,
    path = "/report",
    tag = "stats",
    responses(
        (status = 200, description = "Library report", body = String, content_type = "text/plain")
    )
)]
pub async fn get_report(State(state): State<AppState>) -> String {
    state.services.catalog.report().await
}
