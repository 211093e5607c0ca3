//! Word entity and its wire representation.
//!
//! A [`Word`] is one memorized vocabulary unit together with its spaced
//! repetition state. Field names are camelCase on the wire so the same
//! struct serves the export envelope, the remote snapshot, and the SQLite
//! row payloads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Milliseconds in one day; the unit behind `interval`.
pub const DAY_MS: i64 = 86_400_000;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// One graded review recorded in a word's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    /// Review timestamp, ms since epoch.
    pub date: i64,
    /// Grade as recorded, 0..=3.
    pub grade: u8,
}

/// A word lookup result handed in by the UI/lookup layer.
///
/// Everything except `word` is the opaque meaning payload: the core stores
/// and transports it but never interprets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    pub word: String,
    #[serde(default)]
    pub translation: Vec<String>,
    #[serde(default)]
    pub meanings: serde_json::Value,
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
}

/// A memorized vocabulary unit with its scheduling state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    /// Opaque unique id, assigned at creation, immutable.
    #[serde(default)]
    pub id: String,
    /// Display text. Uniqueness is enforced on the normalized form.
    pub word: String,
    #[serde(default)]
    pub translation: Vec<String>,
    /// Dictionary-API shaped payload, passed through unchanged.
    #[serde(default)]
    pub meanings: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Creation time, ms since epoch. Merge tie-breaker of last resort.
    #[serde(default)]
    pub created_at: i64,
    /// Last mutation time. Absent in exports from the legacy web app.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    /// The word is due when `now >= next_review`.
    #[serde(default)]
    pub next_review: i64,
    /// Days until the next review. 0 only for a never-reviewed word.
    #[serde(default)]
    pub interval: u32,
    #[serde(default = "default_ease")]
    pub ease: f64,
    /// Consecutive successful reviews since the last failure.
    #[serde(default)]
    pub repetitions: u32,
    #[serde(default)]
    pub history: Vec<ReviewEntry>,
}

pub(crate) fn default_ease() -> f64 {
    2.5
}

/// Normalized form used for uniqueness checks: trimmed and casefolded.
pub fn normalize_term(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl Word {
    /// Create a brand-new word from a lookup result, with fresh SRS state.
    pub fn new(entry: LookupResult, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            word: entry.word.trim().to_string(),
            translation: entry.translation,
            meanings: entry.meanings,
            phonetic: entry.phonetic.filter(|p| !p.is_empty()),
            audio_url: entry.audio_url.filter(|u| !u.is_empty()),
            created_at: now_ms,
            updated_at: Some(now_ms),
            next_review: now_ms,
            interval: 0,
            ease: default_ease(),
            repetitions: 0,
            history: Vec::new(),
        }
    }

    pub fn normalized_term(&self) -> String {
        normalize_term(&self.word)
    }

    /// Timestamp compared during reconciliation. Falls back to the creation
    /// time for records that predate the `updatedAt` field.
    pub fn merge_stamp(&self) -> i64 {
        self.updated_at.unwrap_or(self.created_at)
    }

    pub fn is_due(&self, now_ms: i64) -> bool {
        self.next_review <= now_ms
    }
}
