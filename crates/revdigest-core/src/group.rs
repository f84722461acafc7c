//! Partitioning change records by a grouping dimension

use crate::collect::Change;
use crate::store::TaxonomyStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Key used when an item has no taxonomy term
pub const UNCATEGORIZED: &str = "uncategorized";

/// Key used when a change has no recorded author
pub const UNKNOWN_AUTHOR: &str = "unknown";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("group_by must be one of: item, date, user, taxonomy (got {0:?})")]
pub struct UnknownGroupBy(pub String);

/// The dimension changes are grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// One group per content item
    #[default]
    #[serde(alias = "post")]
    Item,
    /// Calendar day of the latest revision
    Date,
    /// Primary (first) author
    User,
    /// First taxonomy term of the item
    Taxonomy,
}

impl GroupBy {
    pub const ALL: [GroupBy; 4] = [GroupBy::Item, GroupBy::Date, GroupBy::User, GroupBy::Taxonomy];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Item => "item",
            GroupBy::Date => "date",
            GroupBy::User => "user",
            GroupBy::Taxonomy => "taxonomy",
        }
    }

    /// Parse a dimension, falling back to `Item` for anything unrecognized.
    ///
    /// Adapters receiving free-form input use this; the fallback is the
    /// documented default grouping, not an error.
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for GroupBy {
    type Err = UnknownGroupBy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "item" | "post" => Ok(GroupBy::Item),
            "date" => Ok(GroupBy::Date),
            "user" => Ok(GroupBy::User),
            "taxonomy" => Ok(GroupBy::Taxonomy),
            _ => Err(UnknownGroupBy(s.to_string())),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the grouping key of one change
pub fn grouping_key(change: &Change, by: GroupBy, taxonomy: &dyn TaxonomyStore) -> String {
    match by {
        GroupBy::Item => change.item_id.to_string(),
        GroupBy::Date => change.latest.modified.format("%Y-%m-%d").to_string(),
        GroupBy::User => change
            .primary_author()
            .map(|id| id.to_string())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        GroupBy::Taxonomy => taxonomy
            .resolve_primary_taxonomy(change.item_id)
            .unwrap_or_else(|| UNCATEGORIZED.to_string()),
    }
}

/// Partition changes by `by`, keeping keys in first-seen order and changes in
/// input order within each key.
pub fn group(
    changes: Vec<Change>,
    by: GroupBy,
    taxonomy: &dyn TaxonomyStore,
) -> Vec<(String, Vec<Change>)> {
    let mut groups: Vec<(String, Vec<Change>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for change in changes {
        let key = grouping_key(&change, by, taxonomy);
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(change),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![change]));
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revision::Revision;
    use crate::store::MemoryStore;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn change(item_id: u64, latest: DateTime<Utc>, authors: Vec<u64>) -> Change {
        Change {
            item_id,
            earliest: Revision::new(1, item_id, latest - Duration::days(3), 1, "a"),
            latest: Revision::new(2, item_id, latest, 1, "b"),
            edits: Vec::new(),
            rendered: String::new(),
            authors,
        }
    }

    fn sample() -> Vec<Change> {
        vec![
            change(1, at(18, 9), vec![2, 1]),
            change(2, at(19, 23), vec![1]),
            change(3, at(18, 1), vec![2]),
            change(4, at(20, 8), vec![]),
        ]
    }

    fn taxonomy() -> MemoryStore {
        MemoryStore::new()
            .with_term(1, "News")
            .with_term(1, "Events")
            .with_term(3, "News")
            .with_term(2, "Events")
    }

    fn keys(groups: &[(String, Vec<Change>)]) -> Vec<&str> {
        groups.iter().map(|(k, _)| k.as_str()).collect()
    }

    #[test]
    fn test_group_by_item_is_pass_through() {
        let groups = group(sample(), GroupBy::Item, &taxonomy());
        assert_eq!(keys(&groups), vec!["1", "2", "3", "4"]);
        assert!(groups.iter().all(|(_, changes)| changes.len() == 1));
    }

    #[test]
    fn test_group_by_date() {
        let groups = group(sample(), GroupBy::Date, &taxonomy());
        assert_eq!(keys(&groups), vec!["2024-03-18", "2024-03-19", "2024-03-20"]);
        let ids: Vec<u64> = groups[0].1.iter().map(|c| c.item_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_group_by_user_uses_first_author() {
        let groups = group(sample(), GroupBy::User, &taxonomy());
        assert_eq!(keys(&groups), vec!["2", "1", UNKNOWN_AUTHOR]);
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn test_group_by_taxonomy() {
        let groups = group(sample(), GroupBy::Taxonomy, &taxonomy());
        assert_eq!(keys(&groups), vec!["News", "Events", UNCATEGORIZED]);
    }

    #[test]
    fn test_grouping_is_a_partition() {
        for by in GroupBy::ALL {
            let groups = group(sample(), by, &taxonomy());
            let total: usize = groups.iter().map(|(_, changes)| changes.len()).sum();
            assert_eq!(total, sample().len(), "{by}");

            let mut ids: Vec<u64> = groups
                .iter()
                .flat_map(|(_, changes)| changes.iter().map(|c| c.item_id))
                .collect();
            ids.sort_unstable();
            assert_eq!(ids, vec![1, 2, 3, 4], "{by}");
        }
    }

    #[test]
    fn test_parse_group_by() {
        assert_eq!("post".parse::<GroupBy>(), Ok(GroupBy::Item));
        assert_eq!("User".parse::<GroupBy>(), Ok(GroupBy::User));
        assert!("author".parse::<GroupBy>().is_err());
        assert_eq!(GroupBy::parse_or_default("author"), GroupBy::Item);
        assert_eq!(GroupBy::parse_or_default("taxonomy"), GroupBy::Taxonomy);
    }
}
