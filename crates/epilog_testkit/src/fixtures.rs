//! Store fixtures and diary scenario helpers.

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use epilog_core::{
    DeviceId, EntryPayload, Event, EventId, EventStore, Intensity, Projection, QueryEngine,
    StoreConfig,
};
use epilog_sync_engine::{MockTransport, StaticToken, SyncConfig, SyncEngine};
use std::sync::Arc;

/// Base date every scenario builds on.
pub const BASE_DATE: (i32, u32, u32) = (2024, 1, 15);

/// The scenario date `offset` days after the base date.
pub fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(BASE_DATE.0, BASE_DATE.1, BASE_DATE.2)
        .unwrap()
        .checked_add_days(Days::new(offset))
        .unwrap()
}

/// A UTC timestamp on the base date.
pub fn hm(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(BASE_DATE.0, BASE_DATE.1, BASE_DATE.2, hour, min, 0)
        .unwrap()
}

/// A diary wrapper owning a store and a single recording device.
///
/// Methods mirror how the recording UI drives the store: every action
/// appends a well-formed event and returns its id for chaining.
pub struct Diary {
    store: Arc<EventStore>,
    device: DeviceId,
}

impl Diary {
    /// Creates an ephemeral diary.
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(EventStore::in_memory(StoreConfig::default())),
            device: DeviceId::new(),
        }
    }

    /// Creates a diary over an existing store.
    pub fn over(store: Arc<EventStore>) -> Self {
        Self {
            store,
            device: DeviceId::new(),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<EventStore> {
        &self.store
    }

    /// The recording device.
    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// Records an open (still bleeding) entry.
    pub fn record_open(&self, date: NaiveDate, start: DateTime<Utc>) -> EventId {
        let event = Event::create(
            self.device,
            EntryPayload::for_date(date).with_start(start),
        );
        self.store.append(event).expect("append open entry")
    }

    /// Records a fully described entry.
    pub fn record_complete(
        &self,
        date: NaiveDate,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        intensity: Intensity,
    ) -> EventId {
        let event = Event::create(
            self.device,
            EntryPayload::for_date(date)
                .with_start(start)
                .with_end(end)
                .with_intensity(intensity),
        );
        self.store.append(event).expect("append complete entry")
    }

    /// Completes an open entry, returning the completion's id.
    pub fn complete(
        &self,
        parent: EventId,
        date: NaiveDate,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        intensity: Intensity,
    ) -> EventId {
        let event = Event::complete(
            parent,
            self.device,
            EntryPayload::for_date(date)
                .with_start(start)
                .with_end(end)
                .with_intensity(intensity),
        );
        self.store.append(event).expect("append completion")
    }

    /// Corrects an entry with new payload fields and a reason.
    pub fn correct(
        &self,
        parent: EventId,
        payload: EntryPayload,
        reason: &str,
    ) -> EventId {
        let event = Event::update(parent, self.device, payload, reason);
        self.store.append(event).expect("append correction")
    }

    /// Soft-deletes an entry with a reason.
    pub fn delete(&self, parent: EventId, date: NaiveDate, reason: &str) -> EventId {
        let event = Event::delete(parent, self.device, date, reason);
        self.store.append(event).expect("append deletion")
    }

    /// Marks a date as nosebleed-free.
    pub fn mark_no_nosebleed(&self, date: NaiveDate) -> EventId {
        self.store
            .append(Event::no_nosebleed_marker(self.device, date))
            .expect("append marker")
    }

    /// Marks a date as unknown.
    pub fn mark_unknown(&self, date: NaiveDate) -> EventId {
        self.store
            .append(Event::unknown_marker(self.device, date))
            .expect("append marker")
    }

    /// Folds the current log into a projection.
    pub fn projection(&self) -> Projection {
        Projection::project(&self.store.list_all())
    }

    /// A query engine over this diary's store.
    pub fn queries(&self) -> QueryEngine {
        QueryEngine::new(Arc::clone(&self.store))
    }

    /// A sync engine over this diary's store, signed in against the
    /// given mock transport.
    pub fn sync_engine(&self, transport: MockTransport) -> SyncEngine<MockTransport> {
        SyncEngine::new(
            Arc::clone(&self.store),
            self.device,
            StaticToken::new("testkit-token"),
            transport,
            SyncConfig::new("https://sync.test"),
        )
    }
}

impl Default for Diary {
    fn default() -> Self {
        Self::in_memory()
    }
}
