//! Export/import commands for the portable JSON envelope.

use std::path::{Path, PathBuf};

use memodict_core::now_ms;

pub fn run_export(out: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let (collection, _config) = super::open_collection()?;
    let json = collection.export_json(now_ms())?;
    match out {
        Some(path) => {
            std::fs::write(&path, &json)?;
            println!("Exported {} words to {}", collection.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn run_import(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut collection, config) = super::open_collection()?;
    let payload = std::fs::read_to_string(file)?;
    let summary = collection.import_json(&payload, now_ms())?;
    println!(
        "Imported: {} added, {} enriched, {} skipped",
        summary.added, summary.enriched, summary.skipped
    );
    if summary.added + summary.enriched > 0 {
        super::maybe_auto_push(&collection, &config);
    }
    Ok(())
}
