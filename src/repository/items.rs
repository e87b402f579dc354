//! Items and copies repository

use crate::{
    error::{AppError, AppResult},
    models::{
        copy::CopyDetails,
        item::{Item, ItemSummary},
    },
};

use super::{Library, Store};

fn summarize(library: &Library, item: &Item) -> ItemSummary {
    let copies = library.copies_of(&item.title);
    ItemSummary {
        item: item.clone(),
        nb_copies: copies.len(),
        nb_available: copies.iter().filter(|c| c.available()).count(),
    }
}

fn details(library: &Library, copy_id: u32) -> AppResult<CopyDetails> {
    let copy = library
        .search_copy(copy_id)
        .ok_or(AppError::CopyNotFound(copy_id))?;
    Ok(CopyDetails::new(copy, library.item_of(copy)?))
}

#[derive(Clone)]
pub struct ItemsRepository {
    store: Store,
}

impl ItemsRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Add an item and `copies` copies of it
    pub async fn create(&self, item: Item, copies: u32) -> AppResult<ItemSummary> {
        let mut library = self.store.write().await;
        let title = item.title.clone();
        if !library.add_item(item) {
            return Err(AppError::Conflict(format!("Item '{}' already exists", title)));
        }
        for _ in 0..copies {
            library.add_copy(&title)?;
        }
        let item = library
            .search_item(&title)
            .ok_or_else(|| AppError::Internal(format!("Item '{}' vanished", title)))?;
        Ok(summarize(&library, item))
    }

    pub async fn list(&self) -> Vec<ItemSummary> {
        let library = self.store.read().await;
        library.items().map(|item| summarize(&library, item)).collect()
    }

    pub async fn get(&self, title: &str) -> AppResult<ItemSummary> {
        let library = self.store.read().await;
        let item = library
            .search_item(title)
            .ok_or_else(|| AppError::NotFound(format!("Item '{}' not found", title)))?;
        Ok(summarize(&library, item))
    }

    /// Create `count` new copies of `title`
    pub async fn add_copies(&self, title: &str, count: u32) -> AppResult<Vec<CopyDetails>> {
        let mut library = self.store.write().await;
        let mut ids = Vec::with_capacity(count as usize);
        for _ in 0..count {
            ids.push(library.add_copy(title)?.copy_id);
        }
        ids.into_iter().map(|id| details(&library, id)).collect()
    }

    pub async fn copies_of(&self, title: &str) -> AppResult<Vec<CopyDetails>> {
        let library = self.store.read().await;
        let item = library
            .search_item(title)
            .ok_or_else(|| AppError::NotFound(format!("Item '{}' not found", title)))?;
        Ok(library
            .copies_of(title)
            .into_iter()
            .map(|copy| CopyDetails::new(copy, item))
            .collect())
    }

    pub async fn list_copies(&self, available_only: bool) -> AppResult<Vec<CopyDetails>> {
        let library = self.store.read().await;
        library
            .copies()
            .iter()
            .filter(|c| !available_only || c.available())
            .map(|c| details(&library, c.copy_id))
            .collect()
    }

    pub async fn get_copy(&self, copy_id: u32) -> AppResult<CopyDetails> {
        let library = self.store.read().await;
        details(&library, copy_id)
    }

    pub async fn count(&self) -> (usize, usize, usize) {
        let library = self.store.read().await;
        (
            library.items().count(),
            library.copies().len(),
            library.available_copies().len(),
        )
    }
}
