//! Item copy (physical, borrowable instance) model

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::item::Item;

/// Circulation status of a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CopyStatus {
    Available,
    OnLoan,
    Lost,
}

impl Default for CopyStatus {
    fn default() -> Self {
        CopyStatus::Available
    }
}

/// One borrowable copy of a catalog item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ItemCopy {
    pub copy_id: u32,
    pub title: String,
    #[serde(default)]
    pub status: CopyStatus,
}

impl ItemCopy {
    pub fn new(copy_id: u32, title: impl Into<String>) -> Self {
        Self {
            copy_id,
            title: title.into(),
            status: CopyStatus::Available,
        }
    }

    pub fn available(&self) -> bool {
        self.status == CopyStatus::Available
    }

    /// Pair the copy with its item for display
    pub fn with_item<'a>(&'a self, item: &'a Item) -> CopyDisplay<'a> {
        CopyDisplay { copy: self, item }
    }
}

/// `CopyId: 3 Asia Food and Culture 2019 Cost: $30.00 Available: True`
pub struct CopyDisplay<'a> {
    copy: &'a ItemCopy,
    item: &'a Item,
}

impl fmt::Display for CopyDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CopyId: {} {} Available: {}",
            self.copy.copy_id,
            self.item,
            if self.copy.available() { "True" } else { "False" }
        )
    }
}

/// Copy with its catalog item, as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CopyDetails {
    pub copy_id: u32,
    pub status: CopyStatus,
    pub available: bool,
    pub item: Item,
}

impl CopyDetails {
    pub fn new(copy: &ItemCopy, item: &Item) -> Self {
        Self {
            copy_id: copy.copy_id,
            status: copy.status,
            available: copy.available(),
            item: item.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_display() {
        let item = Item::media("Asia Food and Culture", 2019, Decimal::from(30));
        let mut copy = ItemCopy::new(3, &item.title);
        assert_eq!(
            copy.with_item(&item).to_string(),
            "CopyId: 3 Asia Food and Culture 2019 Cost: $30.00 Available: True"
        );

        copy.status = CopyStatus::OnLoan;
        assert!(!copy.available());
        assert!(copy.with_item(&item).to_string().ends_with("Available: False"));
    }
}
