//! Revdigest Core - change collation engine for content revision digests
//!
//! Selects the revisions bounding each item's change window, diffs them line
//! by line, groups the resulting change records and describes each group in
//! plain English. Storage, users, taxonomy and time are injected through the
//! traits in [`store`].

pub mod collect;
pub mod describe;
pub mod diff;
pub mod digest;
pub mod edit;
pub mod group;
pub mod render;
pub mod revision;
pub mod store;
pub mod subscription;

pub use collect::{collect_changes, Change, CollectOptions};
pub use describe::{describe, describe_change, natural_list};
pub use diff::{compute_diff, normalize, render_diff, split_lines, DiffEngine, TextComparison};
pub use digest::{Digest, DigestError, DigestRequest, Group, InvalidPeriod, Period};
pub use edit::{apply_edits, DiffEdit, EditKind};
pub use group::{group, grouping_key, GroupBy, UnknownGroupBy, UNCATEGORIZED};
pub use render::{digest_response, grouped_response, widget_html, DigestResponse, GroupedResponse};
pub use revision::{select_revision_pair, ContentItem, Revision, RevisionWindow};
pub use store::{
    Clock, ContentStore, FixedClock, ItemDirectory, MemoryStore, StoreError, SystemClock,
    TaxonomyStore, UserDirectory,
};
pub use subscription::{
    subscriptions_due, Frequency, MemorySubscriptions, Subscription, SubscriptionError,
    SubscriptionRepository,
};
