//! Portable import/export envelope.
//!
//! `{ "schemaVersion": 1, "exportedAt": <ms>, "words": [...] }` -- the
//! same format backs file export/import and the backup blob. Export is a
//! pure function of the word set; import parses and validates the whole
//! payload before a single write happens.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::word::{default_ease, Word};

/// Envelope schema emitted by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Import/export errors.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Not JSON, or not shaped like an envelope with a `words` array.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Envelope written by a newer build.
    #[error("Unsupported schema version {found} (this build supports <= {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },
}

/// The portable collection envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// 0 marks a legacy export from the original web app (no version
    /// field); defaults keep those importable.
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub exported_at: i64,
    pub words: Vec<Word>,
}

/// Snapshot the word set into an envelope. Pure; no I/O.
pub fn export_envelope(words: &[Word], now_ms: i64) -> Envelope {
    Envelope {
        schema_version: SCHEMA_VERSION,
        exported_at: now_ms,
        words: words.to_vec(),
    }
}

/// Serialize an envelope to pretty JSON.
///
/// # Errors
/// Only on JSON serialization failure.
pub fn to_json(envelope: &Envelope) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(envelope)
}

/// Parse and validate an envelope.
///
/// # Errors
/// `MalformedPayload` for anything that is not an envelope with a `words`
/// array; `UnsupportedSchema` for an envelope from a newer build. Either
/// way the import performs zero writes.
pub fn parse(payload: &str) -> Result<Envelope, TransferError> {
    let envelope: Envelope =
        serde_json::from_str(payload).map_err(|e| TransferError::MalformedPayload(e.to_string()))?;
    if envelope.schema_version > SCHEMA_VERSION {
        return Err(TransferError::UnsupportedSchema {
            found: envelope.schema_version,
            supported: SCHEMA_VERSION,
        });
    }
    Ok(envelope)
}

/// Fill in whatever an imported record omitted: id, creation time, and SRS
/// state default exactly as a brand-new word would.
pub fn normalize_imported(mut word: Word, now_ms: i64) -> Word {
    word.word = word.word.trim().to_string();
    if word.id.is_empty() {
        word.id = Uuid::new_v4().to_string();
    }
    if word.created_at == 0 {
        word.created_at = now_ms;
    }
    if word.next_review == 0 {
        word.next_review = now_ms;
    }
    if word.ease <= 0.0 {
        word.ease = default_ease();
    }
    word
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word::LookupResult;

    fn sample(term: &str) -> Word {
        Word::new(
            LookupResult {
                word: term.to_string(),
                translation: vec!["слово".to_string()],
                ..Default::default()
            },
            1_000,
        )
    }

    #[test]
    fn export_parse_roundtrip() {
        let words = vec![sample("alpha"), sample("beta")];
        let json = to_json(&export_envelope(&words, 5_000)).unwrap();
        let envelope = parse(&json).unwrap();
        assert_eq!(envelope.schema_version, SCHEMA_VERSION);
        assert_eq!(envelope.exported_at, 5_000);
        assert_eq!(envelope.words, words);
    }

    #[test]
    fn envelope_uses_wire_field_names() {
        let json = to_json(&export_envelope(&[sample("alpha")], 5_000)).unwrap();
        assert!(json.contains("\"schemaVersion\""));
        assert!(json.contains("\"exportedAt\""));
        assert!(json.contains("\"words\""));
    }

    #[test]
    fn legacy_payload_without_version_parses() {
        // The original app exported only { "words": [...] }.
        let payload = r#"{"words":[{"id":"w1","word":"cat","createdAt":9,
            "nextReview":9,"interval":0,"ease":2.5,"repetitions":0}]}"#;
        let envelope = parse(payload).unwrap();
        assert_eq!(envelope.schema_version, 0);
        assert_eq!(envelope.words.len(), 1);
    }

    #[test]
    fn not_json_is_malformed() {
        assert!(matches!(
            parse("definitely not json"),
            Err(TransferError::MalformedPayload(_))
        ));
    }

    #[test]
    fn missing_words_array_is_malformed() {
        assert!(matches!(
            parse(r#"{"schemaVersion":1}"#),
            Err(TransferError::MalformedPayload(_))
        ));
        assert!(matches!(
            parse(r#"{"words":"nope"}"#),
            Err(TransferError::MalformedPayload(_))
        ));
    }

    #[test]
    fn newer_schema_is_rejected() {
        let payload = format!(
            r#"{{"schemaVersion":{},"exportedAt":0,"words":[]}}"#,
            SCHEMA_VERSION + 1
        );
        assert!(matches!(
            parse(&payload),
            Err(TransferError::UnsupportedSchema { .. })
        ));
    }

    #[test]
    fn normalize_fills_missing_srs_fields() {
        let record: Word = serde_json::from_str(r#"{"word":"bare"}"#).unwrap();
        let word = normalize_imported(record, 7_000);
        assert!(!word.id.is_empty());
        assert_eq!(word.created_at, 7_000);
        assert_eq!(word.next_review, 7_000);
        assert_eq!(word.ease, 2.5);
        assert_eq!(word.interval, 0);
        assert_eq!(word.repetitions, 0);
    }

    #[test]
    fn normalize_keeps_present_srs_fields() {
        let mut incoming = sample("kept");
        incoming.interval = 12;
        incoming.repetitions = 4;
        incoming.ease = 2.9;
        let word = normalize_imported(incoming.clone(), 7_000);
        assert_eq!(word.interval, 12);
        assert_eq!(word.repetitions, 4);
        assert_eq!(word.ease, 2.9);
        assert_eq!(word.created_at, incoming.created_at);
    }
}
