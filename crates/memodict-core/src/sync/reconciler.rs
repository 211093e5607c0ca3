//! Snapshot reconciliation between the local collection and a remote
//! backend.
//!
//! Pull: fetch the full remote snapshot, plan a last-write-wins merge, and
//! apply it all-or-nothing. Push: re-upload the full local collection.
//! Neither path ever gates a local mutation; a failed cycle is logged and
//! retried on the next trigger.
//!
//! Feedback loops are broken without timers: a pull that started before a
//! local mutation is dropped at apply time by the collection's version
//! counter, and our own pushed snapshot merges to an empty plan, which
//! emits nothing and triggers nothing.

use std::collections::HashMap;

use chrono::Utc;

use crate::store::Collection;
use crate::word::Word;

use super::remote::RemoteStore;
use super::types::{SyncError, SyncOutcome, SyncStatus};

/// Change set computed by [`plan_merge`], applied atomically by
/// [`Collection::apply_merge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergePlan {
    pub upserts: Vec<Word>,
    pub deletes: Vec<String>,
}

impl MergePlan {
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletes.is_empty()
    }
}

/// Plan a last-write-wins merge of `remote` into `local`.
///
/// A remote word wins when it is unknown locally or strictly newer by
/// merge stamp (`updatedAt`, falling back to `createdAt` for records from
/// the legacy app). Local words absent from the snapshot are deleted:
/// remote is authoritative for membership.
pub fn plan_merge(local: &[Word], remote: &HashMap<String, Word>) -> MergePlan {
    let local_by_id: HashMap<&str, &Word> = local.iter().map(|w| (w.id.as_str(), w)).collect();

    let mut upserts: Vec<Word> = remote
        .values()
        .filter(|rw| match local_by_id.get(rw.id.as_str()) {
            None => true,
            Some(lw) => rw.merge_stamp() > lw.merge_stamp(),
        })
        .cloned()
        .collect();
    let mut deletes: Vec<String> = local
        .iter()
        .filter(|lw| !remote.contains_key(&lw.id))
        .map(|lw| lw.id.clone())
        .collect();

    // deterministic order, snapshot maps iterate randomly
    upserts.sort_by(|a, b| a.id.cmp(&b.id));
    deletes.sort();
    MergePlan { upserts, deletes }
}

/// Drives pull/push cycles for one collection against one remote backend.
pub struct Reconciler<R: RemoteStore> {
    remote: R,
    status: SyncStatus,
}

impl<R: RemoteStore> Reconciler<R> {
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            status: SyncStatus::default(),
        }
    }

    pub fn status(&self) -> &SyncStatus {
        &self.status
    }

    /// Pull the remote snapshot and merge it into the collection.
    ///
    /// # Errors
    /// Network, snapshot-parse, and local-store failures abandon the cycle;
    /// the collection is untouched (a half-received snapshot is never
    /// partially applied).
    pub async fn pull(&mut self, collection: &mut Collection) -> Result<SyncOutcome, SyncError> {
        let observed_version = collection.version();
        let Some(snapshot) = self.remote.fetch_snapshot().await? else {
            tracing::debug!("remote uninitialized, nothing to merge");
            self.status.last_pull_at = Some(Utc::now());
            return Ok(SyncOutcome::NoChange);
        };

        let plan = plan_merge(collection.words_slice(), &snapshot);
        let outcome = collection
            .apply_merge(plan, observed_version)
            .map_err(|e| SyncError::Storage(e.to_string()))?;

        match outcome {
            SyncOutcome::Applied { upserts, deletes } => {
                tracing::info!(upserts, deletes, "remote snapshot merged");
            }
            SyncOutcome::NoChange => {
                tracing::debug!("remote snapshot already converged");
            }
            SyncOutcome::Stale => {
                tracing::warn!("local mutations raced the pull, cycle abandoned");
            }
        }
        self.status.last_pull_at = Some(Utc::now());
        Ok(outcome)
    }

    /// Upload the full local collection to the remote backend.
    ///
    /// # Errors
    /// Network failures abandon the cycle; local state is unaffected.
    pub async fn push(&mut self, collection: &Collection) -> Result<(), SyncError> {
        let words = collection.words();
        let version = collection.version();
        self.remote.push_snapshot(&words).await?;
        self.status.last_push_at = Some(Utc::now());
        self.status.last_pushed_version = Some(version);
        tracing::info!(words = words.len(), version, "local snapshot pushed");
        Ok(())
    }

    /// One full cycle: merge the remote in, then push the converged set.
    ///
    /// # Errors
    /// Fails on the first failing leg; a stale pull skips the push so the
    /// next cycle can start from fresh state.
    pub async fn cycle(&mut self, collection: &mut Collection) -> Result<SyncOutcome, SyncError> {
        let outcome = self.pull(collection).await?;
        if outcome == SyncOutcome::Stale {
            return Ok(outcome);
        }
        self.push(collection).await?;
        Ok(outcome)
    }
}
