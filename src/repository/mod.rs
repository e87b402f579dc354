//! Repository layer over the in-memory library registry

pub mod items;
pub mod library;
pub mod loans;
pub mod members;

use std::sync::Arc;

use tokio::sync::RwLock;

pub use library::Library;

/// Shared handle to the registry
pub type Store = Arc<RwLock<Library>>;

/// Main repository struct holding the shared registry
#[derive(Clone)]
pub struct Repository {
    pub store: Store,
    pub items: items::ItemsRepository,
    pub members: members::MembersRepository,
    pub loans: loans::LoansRepository,
}

impl Repository {
    /// Create a new repository around `library`
    pub fn new(library: Library) -> Self {
        let store: Store = Arc::new(RwLock::new(library));
        Self {
            items: items::ItemsRepository::new(store.clone()),
            members: members::MembersRepository::new(store.clone()),
            loans: loans::LoansRepository::new(store.clone()),
            store,
        }
    }

    /// Plain-text dump of items, copies and members
    pub async fn report(&self) -> String {
        self.store.read().await.to_string()
    }
}
