//! Core types for remote reconciliation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sync error types.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// No remote base URL configured; sync is disabled.
    #[error("Remote backend not configured")]
    NotConfigured,

    /// Timeout or connection failure. Fail closed: this is "remote
    /// unavailable", never "remote is empty".
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid remote endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// The snapshot did not parse as a keyed word set; the whole cycle is
    /// abandoned, nothing is partially applied.
    #[error("Malformed remote snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local durable-store failure while applying a merge.
    #[error("Local store error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Current sync bookkeeping, queryable from the front end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Last successful pull.
    pub last_pull_at: Option<DateTime<Utc>>,
    /// Last successful push.
    pub last_push_at: Option<DateTime<Utc>>,
    /// Collection version captured by the last successful push. A pulled
    /// snapshot arriving while the collection still sits at this version is
    /// our own echo and merges to nothing.
    pub last_pushed_version: Option<u64>,
}

/// Outcome of one reconciliation pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The merge plan was applied.
    Applied { upserts: usize, deletes: usize },
    /// Remote and local already agree (or the remote is uninitialized).
    NoChange,
    /// Local mutations landed between fetch and apply; plan dropped.
    Stale,
}
