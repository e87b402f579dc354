//! Startup data for the in-memory library

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::{
    config::LibraryConfig,
    error::{AppError, AppResult},
    models::{
        item::Item,
        member::{CreateMember, Member, MemberKind},
    },
    repository::Library,
};

/// Catalog item plus how many copies to create
#[derive(Debug, Deserialize)]
pub struct SeedItem {
    #[serde(flatten)]
    pub item: Item,
    #[serde(default)]
    pub copies: u32,
}

/// Members and catalog to load at startup
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub members: Vec<CreateMember>,
    #[serde(default)]
    pub items: Vec<SeedItem>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub members: usize,
    pub items: usize,
    pub copies: usize,
}

impl SeedData {
    /// Two members and four items, nine copies in total
    pub fn demo() -> Self {
        let member = |id: &str, name: &str, kind: MemberKind| CreateMember {
            member_id: id.to_string(),
            name: name.to_string(),
            kind,
        };
        let book = |title: &str, year: i32, cost: i64, authors: &[&str], copies: u32| SeedItem {
            item: Item::book(
                title,
                year,
                Decimal::from(cost),
                authors.iter().map(|a| a.to_string()).collect(),
            ),
            copies,
        };
        let media = |title: &str, year: i32, cost: i64, copies: u32| SeedItem {
            item: Item::media(title, year, Decimal::from(cost)),
            copies,
        };

        Self {
            members: vec![
                member("S123", "John", MemberKind::Standard),
                member("J111", "Mary", MemberKind::Junior),
            ],
            items: vec![
                book("The Road to Forget", 2020, 35, &["Justin Grave", "Tom Aplesson"], 2),
                media("Asia Food and Culture", 2019, 30, 3),
                book("Dark Knight", 2010, 29, &["Allyson Day"], 2),
                media("Powerpoint Presentation Tips", 2020, 15, 2),
            ],
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Internal(format!("Cannot read seed file {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            AppError::Validation(format!("Invalid seed file {}: {}", path.display(), e))
        })
    }

    /// Load into `library`; entries that already exist are skipped
    pub fn apply(self, library: &mut Library) -> AppResult<SeedSummary> {
        let mut summary = SeedSummary::default();

        for request in self.members {
            request.validate()?;
            let member = Member::from(request);
            let member_id = member.member_id.clone();
            if library.register_member(member) {
                summary.members += 1;
            } else {
                tracing::warn!("Seed: member {} already registered, skipped", member_id);
            }
        }

        for SeedItem { item, copies } in self.items {
            item.check_values()?;
            let title = item.title.clone();
            if library.add_item(item) {
                summary.items += 1;
            } else {
                tracing::warn!("Seed: item '{}' already in catalog, skipped", title);
                continue;
            }
            for _ in 0..copies {
                library.add_copy(&title)?;
                summary.copies += 1;
            }
        }

        Ok(summary)
    }
}

/// Apply the seeds selected by `config`
pub fn load(config: &LibraryConfig, library: &mut Library) -> AppResult<SeedSummary> {
    let mut total = SeedSummary::default();
    let mut add = |s: SeedSummary| {
        total.members += s.members;
        total.items += s.items;
        total.copies += s.copies;
    };

    if config.seed_demo {
        add(SeedData::demo().apply(library)?);
    }
    if let Some(path) = &config.seed_file {
        add(SeedData::from_file(path)?.apply(library)?);
    }
    Ok(total)
}
