//! # Memodict Core Library
//!
//! Core business logic for Memodict, a spaced-repetition vocabulary
//! trainer. The library follows a CLI-first philosophy: every operation is
//! available through the standalone CLI binary, and any GUI front end is a
//! thin layer over this same crate.
//!
//! ## Architecture
//!
//! - **SRS scheduler**: a pure transition function deciding when a word is
//!   re-tested; the caller owns the clock
//! - **Collection store**: the authoritative in-memory word set, backed by
//!   SQLite with write-through persistence and TOML configuration
//! - **Sync**: last-write-wins reconciliation against a remote document
//!   store, plus an optional backup blob
//! - **Transfer**: portable JSON envelope for export/import
//!
//! ## Key Components
//!
//! - [`Collection`]: word set with CRUD, due-query and review operations
//! - [`srs::review`]: the scheduling transition
//! - [`Reconciler`]: pull/push engine over a [`RemoteStore`]
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod srs;
pub mod store;
pub mod sync;
pub mod transfer;
pub mod word;

pub use error::{ConfigError, CoreError, Result, StoreError, ValidationError};
pub use events::Event;
pub use srs::{Grade, Maturity, ReviewPolicy};
pub use store::{AddOutcome, Collection, Config, ImportSummary, SortKey, WordDb};
pub use sync::{
    plan_merge, BackupStore, FileBackup, MergePlan, Reconciler, RemoteStore, RestRemote,
    SyncError, SyncOutcome, SyncStatus,
};
pub use transfer::{Envelope, TransferError, SCHEMA_VERSION};
pub use word::{normalize_term, now_ms, LookupResult, ReviewEntry, Word, DAY_MS};
