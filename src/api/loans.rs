//! Circulation endpoints: borrow, renew, return, lost, payments

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::loan::{Loan, LoanDetails, LoanQuery},
    AppState,
};

/// Borrow request
#[derive(Deserialize, ToSchema)]
pub struct BorrowRequest {
    /// Copy to borrow
    pub copy_id: u32,
    /// Loan date (defaults to today)
    pub date: Option<NaiveDate>,
    /// Pay off any outstanding fines before borrowing
    pub settle_fines: Option<bool>,
}

/// Renew, return or lost request; the loan is found by title
#[derive(Deserialize, ToSchema)]
pub struct TitleRequest {
    /// Title of the borrowed item (case-insensitive)
    pub title: String,
    /// Date of the operation (defaults to today)
    pub date: Option<NaiveDate>,
}

/// Payment request
#[derive(Deserialize, ToSchema)]
pub struct PaymentRequest {
    pub amount: Decimal,
}

/// Borrow response
#[derive(Serialize, ToSchema)]
pub struct LoanResponse {
    pub loan: Loan,
    /// Fines paid off as part of the borrow
    pub settled: Decimal,
    /// Status message
    pub message: String,
}

/// Return or lost response
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Return status
    pub status: String,
    pub loan: Loan,
    /// Member balance after the charge
    pub amount_owed: Decimal,
}

#[derive(Serialize, ToSchema)]
pub struct PaymentResponse {
    /// Amount handed back when paying more than owed
    pub change: Decimal,
    /// Remaining balance
    pub amount_owed: Decimal,
}

/// Get loans for a member
#[utoipa::path(
    get,
    path = "/members/{id}/loans",
    tag = "loans",
    params(
        ("id" = String, Path, description = "Member ID"),
        LoanQuery
    ),
    responses(
        (status = 200, description = "Member's loans", body = Vec<LoanDetails>),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_member_loans(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state
        .services
        .loans
        .member_loans(&member_id, query.scope.unwrap_or_default())
        .await?;
    Ok(Json(loans))
}

/// Borrow a copy
#[utoipa::path(
    post,
    path = "/members/{id}/borrow",
    tag = "loans",
    params(
        ("id" = String, Path, description = "Member ID")
    ),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Loan created", body = LoanResponse),
        (status = 402, description = "Outstanding fines", body = crate::error::ErrorResponse),
        (status = 404, description = "Member or copy not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Copy not available", body = crate::error::ErrorResponse),
        (status = 422, description = "Loan quota reached", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<LoanResponse>)> {
    let outcome = state
        .services
        .loans
        .borrow(
            &member_id,
            request.copy_id,
            request.date,
            request.settle_fines.unwrap_or(false),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LoanResponse {
            message: format!("Item borrowed successfully, due {}", outcome.loan.due_date),
            loan: outcome.loan,
            settled: outcome.settled,
        }),
    ))
}

/// Renew a loan
#[utoipa::path(
    post,
    path = "/members/{id}/renew",
    tag = "loans",
    params(
        ("id" = String, Path, description = "Member ID")
    ),
    request_body = TitleRequest,
    responses(
        (status = 200, description = "Loan renewed", body = Loan),
        (status = 404, description = "No loan for this title", body = crate::error::ErrorResponse),
        (status = 409, description = "Already returned", body = crate::error::ErrorResponse),
        (status = 422, description = "Renewal after the due date", body = crate::error::ErrorResponse)
    )
)]
pub async fn renew(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    Json(request): Json<TitleRequest>,
) -> AppResult<Json<Loan>> {
    let loan = state
        .services
        .loans
        .renew(&member_id, &request.title, request.date)
        .await?;
    Ok(Json(loan))
}

/// Return a borrowed item
#[utoipa::path(
    post,
    path = "/members/{id}/return",
    tag = "loans",
    params(
        ("id" = String, Path, description = "Member ID")
    ),
    request_body = TitleRequest,
    responses(
        (status = 200, description = "Item returned", body = ReturnResponse),
        (status = 404, description = "No loan for this title", body = crate::error::ErrorResponse),
        (status = 409, description = "Already returned", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_item(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    Json(request): Json<TitleRequest>,
) -> AppResult<Json<ReturnResponse>> {
    let closed = state
        .services
        .loans
        .return_item(&member_id, &request.title, request.date)
        .await?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        loan: closed.loan,
        amount_owed: closed.amount_owed,
    }))
}

/// Report a borrowed item as lost
#[utoipa::path(
    post,
    path = "/members/{id}/lost",
    tag = "loans",
    params(
        ("id" = String, Path, description = "Member ID")
    ),
    request_body = TitleRequest,
    responses(
        (status = 200, description = "Loss recorded and charged", body = ReturnResponse),
        (status = 404, description = "No loan for this title", body = crate::error::ErrorResponse),
        (status = 409, description = "Already returned", body = crate::error::ErrorResponse)
    )
)]
pub async fn report_lost(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    Json(request): Json<TitleRequest>,
) -> AppResult<Json<ReturnResponse>> {
    let closed = state
        .services
        .loans
        .report_lost(&member_id, &request.title, request.date)
        .await?;

    Ok(Json(ReturnResponse {
        status: "lost".to_string(),
        loan: closed.loan,
        amount_owed: closed.amount_owed,
    }))
}

/// Pay towards outstanding fines
#[utoipa::path(
    post,
    path = "/members/{id}/payments",
    tag = "loans",
    params(
        ("id" = String, Path, description = "Member ID")
    ),
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment recorded", body = PaymentResponse),
        (status = 402, description = "Invalid amount", body = crate::error::ErrorResponse),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn pay(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    Json(request): Json<PaymentRequest>,
) -> AppResult<Json<PaymentResponse>> {
    let (change, amount_owed) = state.services.loans.pay(&member_id, request.amount).await?;
    Ok(Json(PaymentResponse { change, amount_owed }))
}

/// Open loans past their due date
#[utoipa::path(
    get,
    path = "/loans/overdue",
    tag = "loans",
    responses(
        (status = 200, description = "Overdue loans", body = Vec<LoanDetails>)
    )
)]
pub async fn list_overdue(State(state): State<AppState>) -> Json<Vec<LoanDetails>> {
    Json(state.services.loans.overdue().await)
}
