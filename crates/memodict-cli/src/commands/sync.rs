//! Remote synchronization commands.
//!
//! Pull merges the remote snapshot into the local collection, push uploads
//! the full local set, cycle does both. Backup reads/writes the envelope
//! blob.

use std::path::PathBuf;

use clap::Subcommand;
use memodict_core::{
    now_ms, BackupStore, Collection, Config, FileBackup, Reconciler, RestRemote, SyncError,
    SyncOutcome,
};

#[derive(Subcommand)]
pub enum SyncAction {
    /// Merge the remote snapshot into the local collection
    Pull,
    /// Upload the local collection to the remote
    Push,
    /// Pull, then push the converged set
    Cycle,
    /// Show sync configuration and collection state
    Status,
    /// Backup blob operations
    Backup {
        #[command(subcommand)]
        action: BackupAction,
    },
}

#[derive(Subcommand)]
pub enum BackupAction {
    /// Write the collection envelope to the backup blob
    Write {
        /// Blob path (defaults to sync.backup_file)
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Import the backup blob into the collection
    Read {
        /// Blob path (defaults to sync.backup_file)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

pub fn run(action: SyncAction) -> Result<(), Box<dyn std::error::Error>> {
    let (mut collection, config) = super::open_collection()?;

    match action {
        SyncAction::Pull => {
            let mut reconciler = reconciler(&config)?;
            let rt = tokio::runtime::Runtime::new()?;
            let outcome = rt.block_on(reconciler.pull(&mut collection))?;
            report(outcome);
        }
        SyncAction::Push => {
            let mut reconciler = reconciler(&config)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(reconciler.push(&collection))?;
            println!("Pushed {} words.", collection.len());
        }
        SyncAction::Cycle => {
            let mut reconciler = reconciler(&config)?;
            let rt = tokio::runtime::Runtime::new()?;
            let outcome = rt.block_on(reconciler.cycle(&mut collection))?;
            report(outcome);
            if outcome != SyncOutcome::Stale {
                println!("Pushed {} words.", collection.len());
            }
        }
        SyncAction::Status => {
            match &config.remote.base_url {
                Some(url) => println!("Remote: {url} (user {})", config.remote.user_id),
                None => println!("Remote: not configured"),
            }
            println!("Auto push: {}", config.sync.auto_push);
            println!(
                "Collection: {} words, version {}",
                collection.len(),
                collection.version()
            );
        }
        SyncAction::Backup { action } => run_backup(action, &mut collection, &config)?,
    }
    Ok(())
}

fn run_backup(
    action: BackupAction,
    collection: &mut Collection,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        BackupAction::Write { file } => {
            let backup = FileBackup::new(backup_path(file, config)?);
            backup.write(&collection.export_json(now_ms())?)?;
            println!("Backup written ({} words).", collection.len());
        }
        BackupAction::Read { file } => {
            let backup = FileBackup::new(backup_path(file, config)?);
            let summary = collection.import_json(&backup.read()?, now_ms())?;
            println!(
                "Backup merged: {} added, {} enriched, {} skipped",
                summary.added, summary.enriched, summary.skipped
            );
        }
    }
    Ok(())
}

fn backup_path(
    file: Option<PathBuf>,
    config: &Config,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    file.or_else(|| config.sync.backup_file.clone()).ok_or_else(|| {
        "no backup file given; pass --file or set sync.backup_file"
            .to_string()
            .into()
    })
}

fn reconciler(config: &Config) -> Result<Reconciler<RestRemote>, Box<dyn std::error::Error>> {
    match RestRemote::from_config(&config.remote) {
        Ok(remote) => Ok(Reconciler::new(remote)),
        Err(SyncError::NotConfigured) => Err(
            "remote not configured; run 'memodict-cli config set remote.base_url <url>'".into(),
        ),
        Err(e) => Err(e.into()),
    }
}

fn report(outcome: SyncOutcome) {
    match outcome {
        SyncOutcome::Applied { upserts, deletes } => {
            println!("Merged remote snapshot: {upserts} updated, {deletes} removed");
        }
        SyncOutcome::NoChange => println!("Already up to date."),
        SyncOutcome::Stale => println!("Local changes raced the sync; run again."),
    }
}
