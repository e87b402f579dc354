//! Item (catalog entry) model and related types

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::policy::{self, LoanPolicy};
use crate::error::{AppError, AppResult};

/// Highest accepted item cost
pub const MAX_COST: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Media type tag of a catalog item, drives durations and fines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Book,
    Media,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Book => "book",
            MediaType::Media => "media",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind-specific item data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "media_type", rename_all = "lowercase")]
pub enum ItemKind {
    Book { authors: Vec<String> },
    Media,
}

/// Catalog item, keyed by its title in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Item {
    pub title: String,
    pub year_published: i32,
    pub cost: Decimal,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl Item {
    pub fn book(title: impl Into<String>, year_published: i32, cost: Decimal, authors: Vec<String>) -> Self {
        Self {
            title: title.into(),
            year_published,
            cost,
            kind: ItemKind::Book { authors },
        }
    }

    pub fn media(title: impl Into<String>, year_published: i32, cost: Decimal) -> Self {
        Self {
            title: title.into(),
            year_published,
            cost,
            kind: ItemKind::Media,
        }
    }

    pub fn media_type(&self) -> MediaType {
        match self.kind {
            ItemKind::Book { .. } => MediaType::Book,
            ItemKind::Media => MediaType::Media,
        }
    }

    pub fn loan_duration(&self, policy: &LoanPolicy) -> i64 {
        policy.loan_duration(self.media_type())
    }

    pub fn fine_per_day(&self, policy: &LoanPolicy) -> Decimal {
        policy.fine_per_day(self.media_type())
    }

    pub fn admin_charge(&self, policy: &LoanPolicy, current_year: i32) -> AppResult<Decimal> {
        policy.admin_charge(self, current_year)
    }

    /// Amount charged when a borrowed copy is lost: admin charge plus cost
    pub fn lost_charges(&self, policy: &LoanPolicy, current_year: i32) -> AppResult<Decimal> {
        policy::amount(self.admin_charge(policy, current_year)?.checked_add(self.cost))
    }

    /// Cost within `0..=MAX_COST` and publication year within `0..=9999`
    pub fn check_values(&self) -> AppResult<()> {
        if self.cost.is_sign_negative() || self.cost > MAX_COST {
            return Err(AppError::Validation(format!(
                "Cost must be between 0 and {}",
                MAX_COST
            )));
        }
        if !(0..=9999).contains(&self.year_published) {
            return Err(AppError::Validation("Invalid publication year".to_string()));
        }
        Ok(())
    }

    /// Case-insensitive title comparison, as used for loan lookups
    pub fn title_matches(&self, title: &str) -> bool {
        self.title.to_lowercase() == title.to_lowercase()
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} Cost: ${:.2}", self.title, self.year_published, self.cost)?;
        if let ItemKind::Book { authors } = &self.kind {
            write!(f, " By {}", authors.join(", "))?;
        }
        Ok(())
    }
}

/// Catalog item with copy counts
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemSummary {
    #[serde(flatten)]
    pub item: Item,
    pub nb_copies: usize,
    pub nb_available: usize,
}

/// Create item request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateItem {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    #[validate(range(min = 0, max = 9999, message = "Invalid publication year"))]
    pub year_published: i32,
    pub cost: Decimal,
    pub media_type: MediaType,
    /// Authors, books only
    #[serde(default)]
    pub authors: Vec<String>,
    /// Number of copies to create along with the item
    #[serde(default)]
    #[validate(range(max = 1000, message = "Too many copies"))]
    pub copies: u32,
}

impl From<CreateItem> for Item {
    fn from(req: CreateItem) -> Self {
        match req.media_type {
            MediaType::Book => Item::book(req.title, req.year_published, req.cost, req.authors),
            MediaType::Media => Item::media(req.title, req.year_published, req.cost),
        }
    }
}
