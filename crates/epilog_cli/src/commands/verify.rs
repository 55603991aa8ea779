//! Verify command implementation.

use epilog_core::{EventStore, IntegrityVerifier, StoreConfig, ViolationKind};
use std::path::Path;

/// Runs the verify command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying store at {}", path.display());
    println!();

    let store = EventStore::open(path, StoreConfig::default())?;
    let report = IntegrityVerifier::verify(&store);

    match report.violation {
        None => {
            println!("OK: {} events checked, no violations", report.checked);
            Ok(())
        }
        Some(violation) => {
            println!(
                "FAILED after {} events at sequence {} (event {}):",
                report.checked, violation.sequence, violation.event_id
            );
            println!("  {}", describe(&violation.kind));
            Err("integrity check failed".into())
        }
    }
}

fn describe(kind: &ViolationKind) -> String {
    match kind {
        ViolationKind::NonMonotonicSequence { previous } => {
            format!("sequence did not increase (previous was {previous})")
        }
        ViolationKind::DuplicateEventId => "duplicate event id".to_string(),
        ViolationKind::OrphanParent { parent_id } => {
            format!("parent {parent_id} not found in store")
        }
        ViolationKind::MissingChainHash => "missing chain hash in hashed log".to_string(),
        ViolationKind::BrokenHashChain { .. } => "hash chain mismatch".to_string(),
    }
}
