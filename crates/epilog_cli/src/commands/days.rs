//! Days command implementation.

use chrono::NaiveDate;
use epilog_core::{DayStatus, EventStore, QueryEngine, StoreConfig};
use std::path::Path;
use std::sync::Arc;

/// Runs the days command.
pub fn run(path: &Path, from: NaiveDate, to: NaiveDate) -> Result<(), Box<dyn std::error::Error>> {
    if from > to {
        return Err("--from must not be after --to".into());
    }

    let store = Arc::new(EventStore::open(path, StoreConfig::default())?);
    let queries = QueryEngine::new(store);

    for (date, status) in queries.day_status_range(from, to) {
        println!("{date}  {}", label(status));
    }

    Ok(())
}

fn label(status: DayStatus) -> &'static str {
    match status {
        DayStatus::NotRecorded => "not recorded",
        DayStatus::Nosebleed => "nosebleed",
        DayStatus::NoNosebleed => "no nosebleed",
        DayStatus::Unknown => "unknown",
        DayStatus::Incomplete => "incomplete",
    }
}
