//! Error types for the lending server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Application error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NoSuchMember = 4,
    NoSuchItem = 5,
    ItemNotAvailable = 7,
    Duplicate = 8,
    MaxBorrowsReached = 11,
    NoSuchCopy = 13,
    OutstandingFines = 14,
    BadValue = 18,
    NoSuchLoan = 20,
    MemberHasLoans = 21,
    LoanReturned = 22,
    RenewalTooLate = 23,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Member not found: {0}")]
    MemberNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Copy not found: {0}")]
    CopyNotFound(u32),

    #[error("There is no loan recorded for {0}")]
    NoLoanRecorded(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Loan quota reached ({current}/{quota})")]
    QuotaReached { current: usize, quota: usize },

    #[error("{message}")]
    Payment { amount: Decimal, message: String },

    #[error("Item: {title} has been returned on {}", .returned_on.format("%d %b %Y"))]
    LoanReturned { title: String, returned_on: NaiveDate },

    #[error(
        "Date of renewal on {} exceed the existing due date on {}",
        .renew_date.format("%d %b %Y"),
        .due_date.format("%d %b %Y")
    )]
    RenewalTooLate { renew_date: NaiveDate, due_date: NaiveDate },

    #[error("Member {member_id} still has {count} outstanding loan(s)")]
    MemberHasLoans { member_id: String, count: usize },

    #[error("Business rule violation: {0}")]
    BusinessRule(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Amount involved in a payment error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
}

impl AppError {
    /// HTTP status and error code for this error
    pub fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::MemberNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchMember),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchItem),
            AppError::CopyNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchCopy),
            AppError::NoLoanRecorded(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchLoan),
            AppError::Validation(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue)
            }
            AppError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Duplicate),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
            AppError::Unavailable(_) => (StatusCode::CONFLICT, ErrorCode::ItemNotAvailable),
            AppError::QuotaReached { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::MaxBorrowsReached)
            }
            AppError::Payment { .. } => (StatusCode::PAYMENT_REQUIRED, ErrorCode::OutstandingFines),
            AppError::LoanReturned { .. } => (StatusCode::CONFLICT, ErrorCode::LoanReturned),
            AppError::RenewalTooLate { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::RenewalTooLate)
            }
            AppError::MemberHasLoans { .. } => (StatusCode::CONFLICT, ErrorCode::MemberHasLoans),
            AppError::BusinessRule(_) => (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::Failure),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::Validation(msg) | AppError::BadRequest(msg) => msg.clone(),
            other => other.to_string(),
        };

        let amount = match &self {
            AppError::Payment { amount, .. } => Some(*amount),
            _ => None,
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            amount,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
