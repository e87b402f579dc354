//! Member endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::member::{CreateMember, Member, MemberSummary},
    AppState,
};

/// List members
#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    responses(
        (status = 200, description = "Registered members", body = Vec<MemberSummary>)
    )
)]
pub async fn list_members(State(state): State<AppState>) -> Json<Vec<MemberSummary>> {
    Json(state.services.members.list().await)
}

/// Get a member with their loan history
#[utoipa::path(
    get,
    path = "/members/{id}",
    tag = "members",
    params(
        ("id" = String, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member details", body = Member),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_member(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> AppResult<Json<Member>> {
    let member = state.services.members.get(&member_id).await?;
    Ok(Json(member))
}

/// Register a new member
#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    request_body = CreateMember,
    responses(
        (status = 201, description = "Member registered", body = MemberSummary),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Member ID already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn register_member(
    State(state): State<AppState>,
    Json(member): Json<CreateMember>,
) -> AppResult<(StatusCode, Json<MemberSummary>)> {
    let created = state.services.members.register(member).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Remove a member
#[utoipa::path(
    delete,
    path = "/members/{id}",
    tag = "members",
    params(
        ("id" = String, Path, description = "Member ID")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Member still has items on loan", body = crate::error::ErrorResponse)
    )
)]
pub async fn remove_member(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.members.remove(&member_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Plain-text statement of a member's balance and loans
#[utoipa::path(
    get,
    path = "/members/{id}/report",
    tag = "members",
    params(
        ("id" = String, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member statement", body = String, content_type = "text/plain"),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn member_report(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> AppResult<String> {
    state.services.members.report(&member_id).await
}
