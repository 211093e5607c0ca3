//! Remote synchronization layer.
//!
//! Converges the local collection with a remote document store: pull
//! merges the remote snapshot in under a last-write-wins rule, push
//! re-uploads the full local set. Sync is always decoupled from local
//! mutations -- triggered explicitly or by a front-end timer, never in the
//! write path.

pub mod reconciler;
pub mod remote;
pub mod types;

pub use reconciler::{plan_merge, MergePlan, Reconciler};
pub use remote::{snapshot_from_value, BackupStore, FileBackup, RemoteStore, RestRemote};
pub use types::{SyncError, SyncOutcome, SyncStatus};
