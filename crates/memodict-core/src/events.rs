use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every applied mutation of a collection produces an Event.
/// Front ends subscribe via [`crate::store::Collection::subscribe`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    WordAdded {
        id: String,
        word: String,
        at: DateTime<Utc>,
    },
    WordRemoved {
        id: String,
        at: DateTime<Utc>,
    },
    WordReviewed {
        id: String,
        grade: u8,
        interval: u32,
        next_review: i64,
        at: DateTime<Utc>,
    },
    /// An import merged an envelope into the collection.
    WordsImported {
        added: usize,
        enriched: usize,
        at: DateTime<Utc>,
    },
    /// A reconciliation cycle changed the collection.
    SyncApplied {
        upserts: usize,
        deletes: usize,
        version: u64,
        at: DateTime<Utc>,
    },
}
