//! Dump-log command implementation.

use epilog_core::{EventStore, StoreConfig};
use std::path::Path;

/// Runs the dump-log command.
pub fn run(path: &Path, limit: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let store = EventStore::open(path, StoreConfig::default())?;
    let stored = store.stored();
    // list_all applies the sync-mark overlay; same order as stored()
    let overlayed = store.list_all();
    let shown = limit.unwrap_or(stored.len()).min(stored.len());

    for (entry, event) in stored.iter().zip(&overlayed).take(shown) {
        println!(
            "#{:<6} {:?}  id={}  parent={}  date={}  synced={}",
            entry.sequence,
            event.kind,
            event.id,
            event
                .parent_id
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            event.payload.date,
            event.synced_at.is_some(),
        );
    }

    if shown < stored.len() {
        println!("... {} more", stored.len() - shown);
    }

    Ok(())
}
