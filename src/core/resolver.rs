use crate::domain::model::{FeedDocument, FeedItem};
use chrono::{DateTime, Utc};

/// The item a feed lists first. Publishers conventionally serve newest-first
/// and that order is trusted as-is; the items are never re-sorted.
pub fn most_recent_item(feed: &FeedDocument) -> Option<&FeedItem> {
    feed.items.first()
}

/// Effective publish time of an item: the publish timestamp when present,
/// otherwise the last-updated timestamp. This is a fallback, not a maximum.
pub fn effective_timestamp(item: &FeedItem) -> Option<DateTime<Utc>> {
    item.published.or(item.updated)
}

/// Resolves the publish time of the feed's most recent item, if it has one.
pub fn resolve_last_published(feed: &FeedDocument) -> Option<DateTime<Utc>> {
    most_recent_item(feed).and_then(effective_timestamp)
}
