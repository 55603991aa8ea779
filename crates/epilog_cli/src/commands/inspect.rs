//! Inspect command implementation.

use epilog_core::{EventStore, Projection, StoreConfig};
use std::path::Path;

/// Runs the inspect command.
pub fn run(path: &Path, list_records: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = EventStore::open(path, StoreConfig::default())?;
    let projection = Projection::project(&store.list_all());

    println!("Store: {}", path.display());
    println!();
    let incomplete = projection
        .active()
        .iter()
        .filter(|r| r.is_incomplete)
        .count();

    println!("Events:           {}", store.len());
    println!("Unsynced events:  {}", store.unsynced_count());
    println!("Active records:   {}", projection.active().len());
    println!("Incomplete:       {incomplete}");
    println!("Deleted records:  {}", projection.deleted().len());
    println!(
        "Hash chain:       {}",
        if store.hash_chain_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    );

    if list_records {
        println!();
        for record in projection.active() {
            let flavor = if record.is_no_nosebleed {
                "no-nosebleed"
            } else if record.is_unknown {
                "unknown"
            } else if record.is_incomplete {
                "incomplete"
            } else {
                "complete"
            };
            println!("  {}  {}  {}", record.date, flavor, record.id);
        }
    }

    Ok(())
}
