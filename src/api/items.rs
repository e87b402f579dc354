//! Catalog endpoints: items and their copies

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{
        copy::CopyDetails,
        item::{CreateItem, ItemSummary},
    },
    AppState,
};

/// Copy listing filter
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CopiesQuery {
    /// Only copies that can be borrowed now
    pub available: Option<bool>,
}

/// Add copies request
#[derive(Deserialize, ToSchema)]
pub struct AddCopiesRequest {
    /// Number of copies to add (defaults to 1)
    pub count: Option<u32>,
}

/// List catalog items
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    responses(
        (status = 200, description = "Catalog items with copy counts", body = Vec<ItemSummary>)
    )
)]
pub async fn list_items(State(state): State<AppState>) -> Json<Vec<ItemSummary>> {
    Json(state.services.catalog.list_items().await)
}

/// Get an item by title (case-insensitive)
#[utoipa::path(
    get,
    path = "/items/{title}",
    tag = "items",
    params(
        ("title" = String, Path, description = "Item title")
    ),
    responses(
        (status = 200, description = "Item details", body = ItemSummary),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> AppResult<Json<ItemSummary>> {
    let item = state.services.catalog.get_item(&title).await?;
    Ok(Json(item))
}

/// Add a book or media item to the catalog
#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created", body = ItemSummary),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Title already in catalog", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    Json(item): Json<CreateItem>,
) -> AppResult<(StatusCode, Json<ItemSummary>)> {
    let created = state.services.catalog.create_item(item).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List copies of an item
#[utoipa::path(
    get,
    path = "/items/{title}/copies",
    tag = "items",
    params(
        ("title" = String, Path, description = "Item title")
    ),
    responses(
        (status = 200, description = "Copies of the item", body = Vec<CopyDetails>),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_item_copies(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> AppResult<Json<Vec<CopyDetails>>> {
    let copies = state.services.catalog.copies_of(&title).await?;
    Ok(Json(copies))
}

/// Add copies of an existing item
#[utoipa::path(
    post,
    path = "/items/{title}/copies",
    tag = "items",
    params(
        ("title" = String, Path, description = "Item title")
    ),
    request_body = AddCopiesRequest,
    responses(
        (status = 201, description = "Copies created", body = Vec<CopyDetails>),
        (status = 400, description = "Invalid count", body = crate::error::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_copies(
    State(state): State<AppState>,
    Path(title): Path<String>,
    Json(request): Json<AddCopiesRequest>,
) -> AppResult<(StatusCode, Json<Vec<CopyDetails>>)> {
    let copies = state
        .services
        .catalog
        .add_copies(&title, request.count.unwrap_or(1))
        .await?;
    Ok((StatusCode::CREATED, Json(copies)))
}

/// List all copies
#[utoipa::path(
    get,
    path = "/copies",
    tag = "items",
    params(CopiesQuery),
    responses(
        (status = 200, description = "Copies", body = Vec<CopyDetails>)
    )
)]
pub async fn list_copies(
    State(state): State<AppState>,
    Query(query): Query<CopiesQuery>,
) -> AppResult<Json<Vec<CopyDetails>>> {
    let copies = state
        .services
        .catalog
        .list_copies(query.available.unwrap_or(false))
        .await?;
    Ok(Json(copies))
}

/// Get a copy by id
#[utoipa::path(
    get,
    path = "/copies/{id}",
    tag = "items",
    params(
        ("id" = u32, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy details", body = CopyDetails),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_copy(
    State(state): State<AppState>,
    Path(copy_id): Path<u32>,
) -> AppResult<Json<CopyDetails>> {
    let copy = state.services.catalog.get_copy(copy_id).await?;
    Ok(Json(copy))
}
