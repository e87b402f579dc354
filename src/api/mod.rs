//! API handlers for the lending REST endpoints

pub mod health;
pub mod items;
pub mod loans;
pub mod members;
pub mod openapi;
pub mod stats;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Catalog
        .route("/items", get(items::list_items).post(items::create_item))
        .route("/items/:title", get(items::get_item))
        .route(
            "/items/:title/copies",
            get(items::list_item_copies).post(items::add_copies),
        )
        .route("/copies", get(items::list_copies))
        .route("/copies/:id", get(items::get_copy))
        // Members
        .route("/members", get(members::list_members).post(members::register_member))
        .route(
            "/members/:id",
            get(members::get_member).delete(members::remove_member),
        )
        .route("/members/:id/report", get(members::member_report))
        // Circulation
        .route("/members/:id/loans", get(loans::get_member_loans))
        .route("/members/:id/borrow", post(loans::borrow))
        .route("/members/:id/renew", post(loans::renew))
        .route("/members/:id/return", post(loans::return_item))
        .route("/members/:id/lost", post(loans::report_lost))
        .route("/members/:id/payments", post(loans::pay))
        .route("/loans/overdue", get(loans::list_overdue))
        // Statistics
        .route("/stats", get(stats::get_stats))
        .route("/report", get(stats::get_report))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
}
