//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, items, loans, members, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lending Server API",
        version = "1.0.0",
        description = "Library lending REST API: catalog, copies, members, loans and fines",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Items
        items::list_items,
        items::get_item,
        items::create_item,
        items::list_item_copies,
        items::add_copies,
        items::list_copies,
        items::get_copy,
        // Members
        members::list_members,
        members::get_member,
        members::register_member,
        members::remove_member,
        members::member_report,
        // Loans
        loans::get_member_loans,
        loans::borrow,
        loans::renew,
        loans::return_item,
        loans::report_lost,
        loans::pay,
        loans::list_overdue,
        // Stats
        stats::get_stats,
        stats::get_report,
    ),
    components(
        schemas(
            // Items
            crate::models::item::Item,
            crate::models::item::ItemKind,
            crate::models::item::MediaType,
            crate::models::item::ItemSummary,
            crate::models::item::CreateItem,
            crate::models::copy::CopyStatus,
            crate::models::copy::ItemCopy,
            crate::models::copy::CopyDetails,
            items::AddCopiesRequest,
            // Members
            crate::models::member::Member,
            crate::models::member::MemberKind,
            crate::models::member::MemberSummary,
            crate::models::member::CreateMember,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::LoanScope,
            loans::BorrowRequest,
            loans::TitleRequest,
            loans::PaymentRequest,
            loans::LoanResponse,
            loans::ReturnResponse,
            loans::PaymentResponse,
            // Stats
            crate::services::stats::StatsResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "items", description = "Catalog items and copies"),
        (name = "members", description = "Member registration"),
        (name = "loans", description = "Borrowing, returns and fines"),
        (name = "stats", description = "Statistics and reports")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
