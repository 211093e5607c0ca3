//! Remote backend clients.
//!
//! [`RemoteStore`] is the document-store contract the reconciler speaks: a
//! keyed word set readable as a full snapshot and writable as a
//! full-collection batch. [`RestRemote`] implements it against the
//! Firebase-style REST dialect of the original deployment
//! (`GET`/`PUT <base>/users/<uid>/words.json`). [`BackupStore`] is the
//! optional external backup blob.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::store::RemoteConfig;
use crate::word::Word;

use super::types::SyncError;

/// A keyed remote word set, full-snapshot read and batch write.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// Fetch the full remote snapshot, keyed by word id.
    ///
    /// `Ok(None)` means the remote exists but holds no data yet (an
    /// uninitialized account); network failure or a timeout is an error,
    /// never an empty snapshot.
    async fn fetch_snapshot(&self) -> Result<Option<HashMap<String, Word>>, SyncError>;

    /// Replace the remote word set with a full local snapshot.
    async fn push_snapshot(&self, words: &[Word]) -> Result<(), SyncError>;
}

/// REST client for the remote document store.
#[derive(Debug)]
pub struct RestRemote {
    client: reqwest::Client,
    endpoint: Url,
}

impl RestRemote {
    /// Build a client for one user's word set.
    ///
    /// # Errors
    /// Returns an error if the base URL does not parse or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, user_id: &str, timeout: Duration) -> Result<Self, SyncError> {
        let base = Url::parse(base_url)?;
        let endpoint = base.join(&format!("users/{user_id}/words.json"))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    /// Build a client from the `[remote]` config section.
    ///
    /// # Errors
    /// `SyncError::NotConfigured` while no base URL is set.
    pub fn from_config(remote: &RemoteConfig) -> Result<Self, SyncError> {
        let base_url = remote.base_url.as_deref().ok_or(SyncError::NotConfigured)?;
        Self::new(
            base_url,
            &remote.user_id,
            Duration::from_secs(remote.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl RemoteStore for RestRemote {
    async fn fetch_snapshot(&self) -> Result<Option<HashMap<String, Word>>, SyncError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(classify)?
            .error_for_status()
            .map_err(classify)?;
        let value: serde_json::Value = response.json().await.map_err(classify)?;
        snapshot_from_value(value)
    }

    async fn push_snapshot(&self, words: &[Word]) -> Result<(), SyncError> {
        // The document store keys children by id; a map upload keeps ids
        // stable across devices.
        let body: HashMap<&str, &Word> = words.iter().map(|w| (w.id.as_str(), w)).collect();
        self.client
            .put(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(classify)?
            .error_for_status()
            .map_err(classify)?;
        Ok(())
    }
}

/// Map transport-level failures to `RemoteUnavailable` and body-decode
/// failures to `MalformedSnapshot`; everything else stays an HTTP error.
fn classify(err: reqwest::Error) -> SyncError {
    if err.is_timeout() || err.is_connect() {
        SyncError::RemoteUnavailable(err.to_string())
    } else if err.is_decode() {
        SyncError::MalformedSnapshot(err.to_string())
    } else {
        SyncError::Http(err)
    }
}

/// Parse a raw snapshot body into a word map.
///
/// The document store may return an object keyed by id, an array, or
/// `null` for an empty path; anything else, or any record that fails to
/// parse, rejects the whole snapshot.
pub fn snapshot_from_value(
    value: serde_json::Value,
) -> Result<Option<HashMap<String, Word>>, SyncError> {
    let records: Vec<serde_json::Value> = match value {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::Object(map) => map.into_values().collect(),
        // Array snapshots can contain null holes for deleted integer keys.
        serde_json::Value::Array(items) => items.into_iter().filter(|v| !v.is_null()).collect(),
        other => {
            return Err(SyncError::MalformedSnapshot(format!(
                "expected object or array, got {other}"
            )))
        }
    };

    let mut snapshot = HashMap::with_capacity(records.len());
    for record in records {
        let word: Word = serde_json::from_value(record)
            .map_err(|e| SyncError::MalformedSnapshot(e.to_string()))?;
        if word.id.is_empty() {
            return Err(SyncError::MalformedSnapshot(
                "record without an id".to_string(),
            ));
        }
        snapshot.insert(word.id.clone(), word);
    }
    Ok(Some(snapshot))
}

/// Optional external backup blob: one opaque string in, one out.
pub trait BackupStore {
    /// Read the whole blob.
    fn read(&self) -> Result<String, SyncError>;
    /// Overwrite the whole blob.
    fn write(&self, payload: &str) -> Result<(), SyncError>;
}

/// Backup blob stored as a local file (the transfer envelope).
pub struct FileBackup {
    path: PathBuf,
}

impl FileBackup {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl BackupStore for FileBackup {
    fn read(&self) -> Result<String, SyncError> {
        Ok(std::fs::read_to_string(&self.path)?)
    }

    fn write(&self, payload: &str) -> Result<(), SyncError> {
        Ok(std::fs::write(&self.path, payload)?)
    }
}
