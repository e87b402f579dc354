//! Catalog management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        copy::CopyDetails,
        item::{CreateItem, Item, ItemSummary, MediaType},
    },
    repository::Repository,
};

/// Most copies added in one request
pub const MAX_COPIES_PER_REQUEST: u32 = 1000;

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add an item to the catalog, with optional initial copies
    pub async fn create_item(&self, request: CreateItem) -> AppResult<ItemSummary> {
        request.validate()?;
        if request.media_type == MediaType::Media && !request.authors.is_empty() {
            return Err(AppError::Validation("Media items have no authors".to_string()));
        }

        let copies = request.copies;
        let mut item = Item::from(request);
        item.title = item.title.trim().to_string();
        if item.title.is_empty() {
            return Err(AppError::Validation("Title cannot be empty".to_string()));
        }
        item.check_values()?;

        let created = self.repository.items.create(item, copies).await?;
        tracing::info!(
            "Catalog: added {} '{}' with {} copies",
            created.item.media_type(),
            created.item.title,
            created.nb_copies
        );
        Ok(created)
    }

    pub async fn list_items(&self) -> Vec<ItemSummary> {
        self.repository.items.list().await
    }

    /// Item, copy and available copy counts
    pub async fn counts(&self) -> (usize, usize, usize) {
        self.repository.items.count().await
    }

    pub async fn get_item(&self, title: &str) -> AppResult<ItemSummary> {
        self.repository.items.get(title).await
    }

    /// Add `count` copies of an existing item
    pub async fn add_copies(&self, title: &str, count: u32) -> AppResult<Vec<CopyDetails>> {
        if count == 0 || count > MAX_COPIES_PER_REQUEST {
            return Err(AppError::Validation(format!(
                "Copy count must be between 1 and {}",
                MAX_COPIES_PER_REQUEST
            )));
        }
        let copies = self.repository.items.add_copies(title, count).await?;
        tracing::info!("Catalog: added {} copies of '{}'", copies.len(), title);
        Ok(copies)
    }

    pub async fn copies_of(&self, title: &str) -> AppResult<Vec<CopyDetails>> {
        self.repository.items.copies_of(title).await
    }

    pub async fn list_copies(&self, available_only: bool) -> AppResult<Vec<CopyDetails>> {
        self.repository.items.list_copies(available_only).await
    }

    pub async fn get_copy(&self, copy_id: u32) -> AppResult<CopyDetails> {
        self.repository.items.get_copy(copy_id).await
    }

    /// Text listing of items, copies and members
    pub async fn report(&self) -> String {
        self.repository.report().await
    }
}
