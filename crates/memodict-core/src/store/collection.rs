//! The authoritative in-memory word set for one session.
//!
//! A [`Collection`] owns the word list, enforces normalized-term
//! uniqueness, write-throughs every mutation to SQLite before reporting
//! success, and fans out [`Event`]s over a broadcast channel. It is
//! constructed explicitly and passed by reference; there is no ambient
//! global instance.
//!
//! Mutations take `&mut self`, so within one collection they apply in
//! invocation order and never interleave. Remote sync is layered on top
//! (see [`crate::sync`]) and is never a prerequisite for a local mutation
//! to succeed.

use std::cmp::Ordering;

use chrono::Utc;
use tokio::sync::broadcast;

use crate::error::{CoreError, StoreError, ValidationError};
use crate::events::Event;
use crate::srs::{self, Grade, ReviewPolicy};
use crate::sync::{MergePlan, SyncOutcome};
use crate::transfer::{self, Envelope};
use crate::word::{normalize_term, LookupResult, Word};

use super::word_db::WordDb;

/// Bounded retries for a failing durable write before it is surfaced.
const WRITE_RETRIES: u32 = 3;

const EVENT_CAPACITY: usize = 64;

/// Sort orders for [`Collection::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedDesc,
    TermAsc,
    EaseAsc,
    IntervalAsc,
}

impl SortKey {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "created" => Some(SortKey::CreatedDesc),
            "term" => Some(SortKey::TermAsc),
            "ease" => Some(SortKey::EaseAsc),
            "interval" => Some(SortKey::IntervalAsc),
            _ => None,
        }
    }
}

/// Result of [`Collection::add`]. A duplicate is a defined outcome, not an
/// error, and never touches the existing word's scheduling state.
#[derive(Debug, Clone)]
pub enum AddOutcome {
    Added(Word),
    Duplicate(Word),
}

impl AddOutcome {
    pub fn word(&self) -> &Word {
        match self {
            AddOutcome::Added(w) | AddOutcome::Duplicate(w) => w,
        }
    }

    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added(_))
    }
}

/// Counters returned by [`Collection::import_json`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub enriched: usize,
    pub skipped: usize,
}

/// The in-memory word set backed by one durable store.
pub struct Collection {
    db: WordDb,
    words: Vec<Word>,
    policy: ReviewPolicy,
    version: u64,
    events: broadcast::Sender<Event>,
}

impl Collection {
    /// Open the default on-disk collection.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or read.
    pub fn open(policy: ReviewPolicy) -> Result<Self, CoreError> {
        Self::with_db(WordDb::open()?, policy)
    }

    /// Build a collection over an already-opened database.
    pub fn with_db(db: WordDb, policy: ReviewPolicy) -> Result<Self, CoreError> {
        let mut words = db.list_all().map_err(StoreError::from)?;
        sort_by_term(&mut words);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            db,
            words,
            policy,
            version: 0,
            events,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Monotonic change counter, bumped once per applied mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Word> {
        self.words.iter().find(|w| w.id == id)
    }

    pub fn find_by_term(&self, term: &str) -> Option<&Word> {
        let normalized = normalize_term(term);
        self.words.iter().find(|w| w.normalized_term() == normalized)
    }

    pub(crate) fn words_slice(&self) -> &[Word] {
        &self.words
    }

    /// Snapshot copy of every word, unsorted.
    pub fn words(&self) -> Vec<Word> {
        self.words.clone()
    }

    /// Snapshot copy ordered by the given key.
    pub fn list(&self, sort: SortKey) -> Vec<Word> {
        let mut out = self.words.clone();
        match sort {
            SortKey::CreatedDesc => out.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortKey::TermAsc => sort_by_term(&mut out),
            SortKey::EaseAsc => {
                out.sort_by(|a, b| a.ease.partial_cmp(&b.ease).unwrap_or(Ordering::Equal))
            }
            SortKey::IntervalAsc => out.sort_by_key(|w| w.interval),
        }
        out
    }

    /// Every word with `next_review <= now`, in no particular order.
    pub fn due(&self, now_ms: i64) -> Vec<Word> {
        self.words
            .iter()
            .filter(|w| w.is_due(now_ms))
            .cloned()
            .collect()
    }

    /// Subscribe to change events. Unsubscribe by dropping the receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Add a word from a lookup result.
    ///
    /// The term is trimmed and checked case-insensitively against the
    /// collection; a duplicate returns the existing word untouched.
    ///
    /// # Errors
    /// Rejects an empty term; surfaces a store failure after retries (in
    /// which case nothing was added).
    pub fn add(&mut self, entry: LookupResult, now_ms: i64) -> Result<AddOutcome, CoreError> {
        if entry.word.trim().is_empty() {
            return Err(ValidationError::EmptyTerm.into());
        }
        if let Some(existing) = self.find_by_term(&entry.word) {
            tracing::debug!(term = %entry.word, "add skipped, term already present");
            return Ok(AddOutcome::Duplicate(existing.clone()));
        }

        let word = Word::new(entry, now_ms);
        self.persist_with_retry(&word)?;
        self.words.push(word.clone());
        sort_by_term(&mut self.words);
        self.bump();
        self.emit(Event::WordAdded {
            id: word.id.clone(),
            word: word.word.clone(),
            at: Utc::now(),
        });
        Ok(AddOutcome::Added(word))
    }

    /// Remove a word by id. Removing an unknown id is a no-op (`Ok(false)`).
    ///
    /// # Errors
    /// Surfaces a store failure after retries; the in-memory set is left
    /// matching the last persisted state.
    pub fn remove(&mut self, id: &str) -> Result<bool, CoreError> {
        let Some(pos) = self.words.iter().position(|w| w.id == id) else {
            return Ok(false);
        };
        self.delete_with_retry(id)?;
        self.words.remove(pos);
        self.bump();
        self.emit(Event::WordRemoved {
            id: id.to_string(),
            at: Utc::now(),
        });
        Ok(true)
    }

    /// Grade one review: delegate to the scheduler, persist, notify.
    /// Unknown ids are a no-op (`Ok(None)`).
    ///
    /// # Errors
    /// Surfaces a store failure after retries; the in-memory word keeps its
    /// pre-review state in that case.
    pub fn review(
        &mut self,
        id: &str,
        grade: Grade,
        now_ms: i64,
    ) -> Result<Option<Word>, CoreError> {
        let Some(pos) = self.words.iter().position(|w| w.id == id) else {
            return Ok(None);
        };
        let updated = srs::review(&self.words[pos], grade, now_ms, &self.policy);
        self.persist_with_retry(&updated)?;
        self.words[pos] = updated.clone();
        self.bump();
        self.emit(Event::WordReviewed {
            id: updated.id.clone(),
            grade: grade.as_u8(),
            interval: updated.interval,
            next_review: updated.next_review,
            at: Utc::now(),
        });
        Ok(Some(updated))
    }

    // ── Transfer ─────────────────────────────────────────────────────

    /// Serialize the collection into the portable JSON envelope.
    ///
    /// # Errors
    /// Only on JSON serialization failure.
    pub fn export_json(&self, now_ms: i64) -> Result<String, CoreError> {
        let envelope = transfer::export_envelope(&self.words, now_ms);
        Ok(transfer::to_json(&envelope)?)
    }

    /// Merge a portable envelope into the collection, atomically.
    ///
    /// Duplicate policy follows [`Collection::add`], except that non-empty
    /// incoming payload fields enrich the existing word (absent incoming
    /// fields never erase existing data) and SRS state of existing words is
    /// never overwritten. Unknown words are inserted, defaulting any
    /// missing SRS fields.
    ///
    /// # Errors
    /// A malformed payload fails the whole import with zero writes.
    pub fn import_json(&mut self, payload: &str, now_ms: i64) -> Result<ImportSummary, CoreError> {
        let envelope: Envelope = transfer::parse(payload)?;

        let mut summary = ImportSummary::default();
        let mut upserts: Vec<Word> = Vec::new();
        for incoming in envelope.words {
            let normalized = normalize_term(&incoming.word);
            if let Some(pos) = self
                .words
                .iter()
                .position(|w| w.normalized_term() == normalized)
            {
                let mut existing = self.words[pos].clone();
                if enrich_payload(&mut existing, &incoming) {
                    existing.updated_at = Some(now_ms);
                    summary.enriched += 1;
                    upserts.push(existing);
                } else {
                    summary.skipped += 1;
                }
            } else if let Some(w) = upserts
                .iter_mut()
                .find(|w| w.normalized_term() == normalized)
            {
                // duplicate within the payload itself
                enrich_payload(w, &incoming);
                summary.skipped += 1;
            } else {
                upserts.push(transfer::normalize_imported(incoming, now_ms));
                summary.added += 1;
            }
        }

        if !upserts.is_empty() {
            self.db
                .apply_merge(&upserts, &[])
                .map_err(StoreError::from)?;
            self.reload()?;
            self.bump();
            self.emit(Event::WordsImported {
                added: summary.added,
                enriched: summary.enriched,
                at: Utc::now(),
            });
        }
        Ok(summary)
    }

    // ── Reconciliation support ───────────────────────────────────────

    /// Apply a merge plan computed against `observed_version`.
    ///
    /// The whole plan lands in one transaction, the in-memory view reloads,
    /// and a single [`Event::SyncApplied`] fires. If local mutations
    /// advanced the version since the plan's snapshot was taken, the plan
    /// is stale and nothing is applied.
    ///
    /// # Errors
    /// Surfaces a store failure; the transaction rolls back and local state
    /// is unaffected.
    pub fn apply_merge(
        &mut self,
        plan: MergePlan,
        observed_version: u64,
    ) -> Result<SyncOutcome, CoreError> {
        if self.version != observed_version {
            tracing::warn!(
                observed = observed_version,
                current = self.version,
                "stale merge plan dropped"
            );
            return Ok(SyncOutcome::Stale);
        }
        if plan.is_empty() {
            return Ok(SyncOutcome::NoChange);
        }

        let upserts = plan.upserts.len();
        let deletes = plan.deletes.len();
        self.db
            .apply_merge(&plan.upserts, &plan.deletes)
            .map_err(StoreError::from)?;
        self.reload()?;
        self.bump();
        self.emit(Event::SyncApplied {
            upserts,
            deletes,
            version: self.version,
            at: Utc::now(),
        });
        Ok(SyncOutcome::Applied { upserts, deletes })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reload(&mut self) -> Result<(), CoreError> {
        let mut words = self.db.list_all().map_err(StoreError::from)?;
        sort_by_term(&mut words);
        self.words = words;
        Ok(())
    }

    fn bump(&mut self) {
        self.version += 1;
    }

    fn emit(&self, event: Event) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }

    fn persist_with_retry(&self, word: &Word) -> Result<(), StoreError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.db.upsert(word) {
                Ok(()) => return Ok(()),
                Err(e) if attempt < WRITE_RETRIES => {
                    tracing::warn!(id = %word.id, attempt, error = %e, "word write failed, retrying");
                }
                Err(e) => {
                    return Err(StoreError::WriteFailed {
                        attempts: attempt,
                        message: e.to_string(),
                    })
                }
            }
        }
    }

    fn delete_with_retry(&self, id: &str) -> Result<(), StoreError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.db.delete(id) {
                Ok(_) => return Ok(()),
                Err(e) if attempt < WRITE_RETRIES => {
                    tracing::warn!(id, attempt, error = %e, "word delete failed, retrying");
                }
                Err(e) => {
                    return Err(StoreError::WriteFailed {
                        attempts: attempt,
                        message: e.to_string(),
                    })
                }
            }
        }
    }
}

fn sort_by_term(words: &mut [Word]) {
    words.sort_by(|a, b| a.normalized_term().cmp(&b.normalized_term()));
}

/// Copy non-empty payload fields from `incoming` onto `existing`.
/// Returns whether anything changed. SRS fields are never touched.
fn enrich_payload(existing: &mut Word, incoming: &Word) -> bool {
    let mut changed = false;
    if !incoming.translation.is_empty() && incoming.translation != existing.translation {
        existing.translation = incoming.translation.clone();
        changed = true;
    }
    if !incoming.meanings.is_null() && incoming.meanings != existing.meanings {
        existing.meanings = incoming.meanings.clone();
        changed = true;
    }
    if let Some(phonetic) = incoming.phonetic.as_deref().filter(|p| !p.is_empty()) {
        if existing.phonetic.as_deref() != Some(phonetic) {
            existing.phonetic = Some(phonetic.to_string());
            changed = true;
        }
    }
    if let Some(audio_url) = incoming.audio_url.as_deref().filter(|u| !u.is_empty()) {
        if existing.audio_url.as_deref() != Some(audio_url) {
            existing.audio_url = Some(audio_url.to_string());
            changed = true;
        }
    }
    changed
}
