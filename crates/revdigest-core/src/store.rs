//! Collaborator seams: content store, user directory, taxonomy and clock

use crate::revision::{ContentItem, Revision};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Content item {0} not found")]
    ItemNotFound(u64),
    #[error("Failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid snapshot: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Source of content items and their revision history
pub trait ContentStore {
    /// Published pages modified at or after `since`
    fn list_modified_items(&self, since: DateTime<Utc>) -> Result<Vec<ContentItem>, StoreError>;

    /// All revisions of an item, newest first
    fn list_revisions(&self, item_id: u64) -> Result<Vec<Revision>, StoreError>;
}

/// Resolves author ids to display names
pub trait UserDirectory {
    fn resolve_author(&self, id: u64) -> Option<String>;
}

/// Resolves the first taxonomy term attached to an item
pub trait TaxonomyStore {
    fn resolve_primary_taxonomy(&self, item_id: u64) -> Option<String>;
}

/// Resolves presentation metadata (title, permalink) for an item
pub trait ItemDirectory {
    fn resolve_item(&self, item_id: u64) -> Option<ContentItem>;
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// In-memory store backing every lookup trait.
///
/// Deserializes from a JSON snapshot of the form
/// `{"items": [...], "revisions": [...], "users": {"1": "Ann"}, "taxonomies": {"10": ["News"]}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    pub items: Vec<ContentItem>,
    #[serde(default)]
    pub revisions: Vec<Revision>,
    #[serde(default)]
    pub users: BTreeMap<u64, String>,
    #[serde(default)]
    pub taxonomies: BTreeMap<u64, Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn with_item(mut self, item: ContentItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_revision(mut self, revision: Revision) -> Self {
        self.revisions.push(revision);
        self
    }

    pub fn with_user(mut self, id: u64, name: impl Into<String>) -> Self {
        self.users.insert(id, name.into());
        self
    }

    pub fn with_term(mut self, item_id: u64, term: impl Into<String>) -> Self {
        self.taxonomies.entry(item_id).or_default().push(term.into());
        self
    }

    pub fn item(&self, id: u64) -> Option<&ContentItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

impl ContentStore for MemoryStore {
    fn list_modified_items(&self, since: DateTime<Utc>) -> Result<Vec<ContentItem>, StoreError> {
        Ok(self
            .items
            .iter()
            .filter(|item| item.kind == "page" && item.status == "publish")
            .filter(|item| item.modified >= since)
            .cloned()
            .collect())
    }

    fn list_revisions(&self, item_id: u64) -> Result<Vec<Revision>, StoreError> {
        if self.item(item_id).is_none() {
            return Err(StoreError::ItemNotFound(item_id));
        }

        let mut revisions: Vec<Revision> = self
            .revisions
            .iter()
            .filter(|revision| revision.item_id == item_id)
            .cloned()
            .collect();
        revisions.sort_by(|a, b| b.modified.cmp(&a.modified).then(b.id.cmp(&a.id)));
        Ok(revisions)
    }
}

impl ItemDirectory for MemoryStore {
    fn resolve_item(&self, item_id: u64) -> Option<ContentItem> {
        self.item(item_id).cloned()
    }
}

impl UserDirectory for MemoryStore {
    fn resolve_author(&self, id: u64) -> Option<String> {
        self.users.get(&id).cloned()
    }
}

impl TaxonomyStore for MemoryStore {
    fn resolve_primary_taxonomy(&self, item_id: u64) -> Option<String> {
        self.taxonomies
            .get(&item_id)
            .and_then(|terms| terms.first())
            .cloned()
    }
}
