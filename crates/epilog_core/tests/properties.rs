//! Property tests for the fold and day-status semantics.

use chrono::NaiveDate;
use epilog_core::{
    DayStatus, EntryPayload, Event, EventStore, Projection, StoreConfig,
};
use epilog_core::{DeviceId, EventId};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Action {
    Create { day_offset: u8 },
    NoNosebleed { day_offset: u8 },
    Unknown { day_offset: u8 },
    CorrectLatest,
    DeleteLatest,
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0u8..14).prop_map(|day_offset| Action::Create { day_offset }),
        (0u8..14).prop_map(|day_offset| Action::NoNosebleed { day_offset }),
        (0u8..14).prop_map(|day_offset| Action::Unknown { day_offset }),
        Just(Action::CorrectLatest),
        Just(Action::DeleteLatest),
    ]
}

fn day(offset: u8) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + chrono::Days::new(u64::from(offset))
}

/// Replays a random action script into a fresh store.
fn run_script(actions: &[Action]) -> Vec<Event> {
    let store = EventStore::in_memory(StoreConfig::default());
    let device = DeviceId::new();
    let mut last_real: Option<(EventId, NaiveDate)> = None;

    for action in actions {
        match action {
            Action::Create { day_offset } => {
                let date = day(*day_offset);
                let event = Event::create(device, EntryPayload::for_date(date));
                let id = store.append(event).unwrap();
                last_real = Some((id, date));
            }
            Action::NoNosebleed { day_offset } => {
                store
                    .append(Event::no_nosebleed_marker(device, day(*day_offset)))
                    .unwrap();
            }
            Action::Unknown { day_offset } => {
                store
                    .append(Event::unknown_marker(device, day(*day_offset)))
                    .unwrap();
            }
            Action::CorrectLatest => {
                if let Some((parent, date)) = last_real {
                    let event = Event::update(
                        parent,
                        device,
                        EntryPayload::for_date(date).with_notes("corrected"),
                        "property script correction",
                    );
                    let id = store.append(event).unwrap();
                    last_real = Some((id, date));
                }
            }
            Action::DeleteLatest => {
                if let Some((parent, date)) = last_real.take() {
                    store
                        .append(Event::delete(parent, device, date, "property script deletion"))
                        .unwrap();
                }
            }
        }
    }

    store.list_all()
}

proptest! {
    /// The same event sequence always folds to the same projection.
    #[test]
    fn projection_is_deterministic(actions in prop::collection::vec(action_strategy(), 0..40)) {
        let events = run_script(&actions);

        let first = Projection::project(&events);
        let second = Projection::project(&events);

        prop_assert_eq!(first.active(), second.active());
        prop_assert_eq!(first.deleted(), second.deleted());
    }

    /// Soft deletion hides records but never shrinks the log.
    #[test]
    fn log_only_grows(actions in prop::collection::vec(action_strategy(), 0..40)) {
        let events = run_script(&actions);
        let projection = Projection::project(&events);

        // Every chain surfaces exactly once, active or deleted
        let roots = events.iter().filter(|e| e.parent_id.is_none()).count();
        prop_assert_eq!(projection.active().len() + projection.deleted().len(), roots);
        prop_assert!(events.len() >= roots);
    }

    /// Day-status merge is commutative and idempotent.
    #[test]
    fn day_status_merge_laws(
        a in prop::sample::select(vec![
            DayStatus::NotRecorded,
            DayStatus::Nosebleed,
            DayStatus::NoNosebleed,
            DayStatus::Unknown,
            DayStatus::Incomplete,
        ]),
        b in prop::sample::select(vec![
            DayStatus::NotRecorded,
            DayStatus::Nosebleed,
            DayStatus::NoNosebleed,
            DayStatus::Unknown,
            DayStatus::Incomplete,
        ]),
    ) {
        prop_assert_eq!(a.merge(b), b.merge(a));
        prop_assert_eq!(a.merge(a), a);
        prop_assert_eq!(a.merge(DayStatus::NotRecorded), a);
    }
}
