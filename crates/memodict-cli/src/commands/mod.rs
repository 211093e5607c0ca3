pub mod config;
pub mod quiz;
pub mod review;
pub mod sync;
pub mod transfer;
pub mod word;

use memodict_core::{Collection, Config, Reconciler, RestRemote, SyncError};

/// Load configuration and open the session collection.
pub(crate) fn open_collection() -> Result<(Collection, Config), Box<dyn std::error::Error>> {
    let config = Config::load();
    let collection = Collection::open(config.review.clone())?;
    Ok((collection, config))
}

/// Best-effort snapshot push after a mutating command.
///
/// Sync never gates a local mutation: the change is already persisted, so
/// a failed push only prints a passive notice.
pub(crate) fn maybe_auto_push(collection: &Collection, config: &Config) {
    if !config.sync.auto_push {
        return;
    }
    let remote = match RestRemote::from_config(&config.remote) {
        Ok(remote) => remote,
        Err(SyncError::NotConfigured) => return,
        Err(e) => {
            eprintln!("note: sync unavailable: {e}");
            return;
        }
    };

    let mut reconciler = Reconciler::new(remote);
    let pushed = tokio::runtime::Runtime::new()
        .map_err(|e| e.to_string())
        .and_then(|rt| {
            rt.block_on(reconciler.push(collection))
                .map_err(|e| e.to_string())
        });
    if let Err(e) = pushed {
        eprintln!("note: sync push failed, local change saved: {e}");
    }
}
