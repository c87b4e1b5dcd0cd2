//! Mirrors the in-memory roster to a `KeyValueStore`.
//!
//! Each collection lives under its own key as a JSON array. Loading fails
//! open: an absent, unreadable or malformed value becomes an empty
//! collection. Writes go through a background task so callers never wait on
//! storage; failures are logged and kept until the next `flush`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use strum_macros::{Display, IntoStaticStr};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument, warn};

use crate::error::StoreError;
use crate::model::{employee::Employee, shift::Shift};
use crate::storage::KeyValueStore;
use crate::store::ShiftStore;

/// The persisted collections. The lowercase name is the storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Collection {
    Employees,
    Shifts,
}

impl Collection {
    pub fn key(self) -> &'static str {
        self.into()
    }
}

/// A write that did not reach storage. `collection` is `None` for a failed
/// clear of the whole store.
#[derive(Debug)]
pub struct WriteFailure {
    pub collection: Option<Collection>,
    pub error: StoreError,
}

enum Snapshot {
    Employees(Arc<Vec<Employee>>),
    Shifts(Arc<Vec<Shift>>),
}

impl Snapshot {
    fn collection(&self) -> Collection {
        match self {
            Snapshot::Employees(_) => Collection::Employees,
            Snapshot::Shifts(_) => Collection::Shifts,
        }
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        match self {
            Snapshot::Employees(records) => serde_json::to_string(records.as_ref()),
            Snapshot::Shifts(records) => serde_json::to_string(records.as_ref()),
        }
    }
}

enum Command {
    Save(Snapshot),
    Clear,
    Flush(oneshot::Sender<Vec<WriteFailure>>),
}

/// Reads both collections. Never fails.
#[instrument(skip_all)]
pub async fn load<S: KeyValueStore>(backend: &S) -> ShiftStore {
    let (employees, shifts) = futures::join!(
        read_collection::<Employee, S>(backend, Collection::Employees),
        read_collection::<Shift, S>(backend, Collection::Shifts),
    );

    info!(
        employees = employees.len(),
        shifts = shifts.len(),
        "Roster loaded from storage"
    );
    ShiftStore::from_parts(employees, shifts)
}

async fn read_collection<T, S>(backend: &S, collection: Collection) -> Vec<T>
where
    T: DeserializeOwned,
    S: KeyValueStore,
{
    let raw = match backend.get_item(collection.key()).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            error!(error = %e, %collection, "Failed to read collection, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, %collection, "Stored collection is malformed, starting empty");
            Vec::new()
        }
    }
}

/// Handle to the background writer.
///
/// Only created once the initial load has finished, so nothing is written
/// before durable state has been read.
pub struct Persistence {
    tx: mpsc::UnboundedSender<Command>,
}

impl Persistence {
    /// Starts the writer on the current tokio runtime. Fails with
    /// `StoreError::NoRuntime` when called outside one.
    pub fn spawn<S: KeyValueStore>(backend: Arc<S>) -> Result<Self, StoreError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| StoreError::NoRuntime)?;
        let (tx, rx) = mpsc::unbounded_channel();
        handle.spawn(run_writer(backend, rx));
        Ok(Self { tx })
    }

    pub fn save_employees(&self, records: Arc<Vec<Employee>>) {
        self.send(Command::Save(Snapshot::Employees(records)));
    }

    pub fn save_shifts(&self, records: Arc<Vec<Shift>>) {
        self.send(Command::Save(Snapshot::Shifts(records)));
    }

    pub fn clear(&self) {
        self.send(Command::Clear);
    }

    /// Waits for every write queued so far and returns the failures seen
    /// since the previous flush.
    pub async fn flush(&self) -> Vec<WriteFailure> {
        let (reply, done) = oneshot::channel();
        if self.tx.send(Command::Flush(reply)).is_err() {
            return vec![WriteFailure {
                collection: None,
                error: StoreError::WriterClosed,
            }];
        }
        done.await.unwrap_or_else(|_| {
            vec![WriteFailure {
                collection: None,
                error: StoreError::WriterClosed,
            }]
        })
    }

    fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            error!(error = %StoreError::WriterClosed, "Dropping persistence write");
        }
    }
}

async fn run_writer<S: KeyValueStore>(backend: Arc<S>, mut rx: mpsc::UnboundedReceiver<Command>) {
    let mut failures = Vec::new();

    while let Some(command) = rx.recv().await {
        match command {
            Command::Save(snapshot) => {
                let collection = snapshot.collection();
                if let Err(e) = write_snapshot(backend.as_ref(), &snapshot).await {
                    error!(error = %e, %collection, "Failed to save collection");
                    failures.push(WriteFailure {
                        collection: Some(collection),
                        error: e,
                    });
                } else {
                    debug!(%collection, "Collection saved");
                }
            }
            Command::Clear => {
                if let Err(e) = backend.clear().await {
                    error!(error = %e, "Failed to clear storage");
                    failures.push(WriteFailure {
                        collection: None,
                        error: e,
                    });
                } else {
                    info!("Storage cleared");
                }
            }
            Command::Flush(reply) => {
                let _ = reply.send(std::mem::take(&mut failures));
            }
        }
    }

    debug!("Persistence writer stopped");
}

async fn write_snapshot<S: KeyValueStore>(backend: &S, snapshot: &Snapshot) -> Result<(), StoreError> {
    let json = snapshot.to_json()?;
    backend.set_item(snapshot.collection().key(), json).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewEmployee, NewShift};
    use crate::storage::MemoryStore;
    use chrono::{NaiveDate, NaiveTime};

    struct BrokenShiftStore {
        inner: MemoryStore,
    }

    impl KeyValueStore for BrokenShiftStore {
        async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get_item(key).await
        }

        async fn set_item(&self, key: &str, value: String) -> Result<(), StoreError> {
            if key == Collection::Shifts.key() {
                return Err(StoreError::Backend(sqlx::Error::PoolClosed));
            }
            self.inner.set_item(key, value).await
        }

        async fn clear(&self) -> Result<(), StoreError> {
            self.inner.clear().await
        }
    }

    fn sample_store() -> ShiftStore {
        let mut store = ShiftStore::new();
        let alice = store.add_employee(NewEmployee::named("Alice"));
        store.add_shift(NewShift {
            assigned_employees: [alice.id].into_iter().collect(),
            location: Some("Tampere".into()),
            ..NewShift::new(
                NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            )
        });
        store
    }

    #[test]
    fn storage_keys_match_collection_names() {
        assert_eq!(Collection::Employees.key(), "employees");
        assert_eq!(Collection::Shifts.key(), "shifts");
        assert_eq!(Collection::Shifts.to_string(), Collection::Shifts.key());
    }

    #[tokio::test]
    async fn empty_storage_loads_empty_roster() {
        let store = load(&MemoryStore::new()).await;
        assert!(store.employees().is_empty());
        assert!(store.shifts().is_empty());
    }

    #[tokio::test]
    async fn malformed_collection_is_treated_as_absent() {
        let backend = MemoryStore::new();
        backend.set_item("shifts", "{not json".into()).await.unwrap();
        backend
            .set_item("employees", r#"[{"id":"e1","name":"Alice"}]"#.into())
            .await
            .unwrap();

        let store = load(&backend).await;
        assert!(store.shifts().is_empty());
        assert_eq!(store.employees().len(), 1);
    }

    #[tokio::test]
    async fn saved_collections_round_trip() {
        let backend = Arc::new(MemoryStore::new());
        let original = sample_store();

        let persistence = Persistence::spawn(Arc::clone(&backend)).unwrap();
        persistence.save_employees(original.employees());
        persistence.save_shifts(original.shifts());
        assert!(persistence.flush().await.is_empty());

        let reloaded = load(backend.as_ref()).await;
        assert_eq!(reloaded.employees(), original.employees());
        assert_eq!(reloaded.shifts(), original.shifts());
    }

    #[test]
    fn spawning_without_a_runtime_is_an_error() {
        let result = Persistence::spawn(Arc::new(MemoryStore::new()));
        assert!(matches!(result, Err(StoreError::NoRuntime)));
    }

    #[tokio::test]
    async fn shift_times_reload_as_stored() {
        let backend = Arc::new(MemoryStore::new());
        let mut original = ShiftStore::new();
        let alice = original.add_employee(NewEmployee::named("Alice"));
        let shift = original.add_shift(NewShift {
            assigned_employees: [alice.id.clone()].into_iter().collect(),
            ..NewShift::new(
                NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
                NaiveTime::from_hms_opt(9, 0, 30).unwrap(),
                NaiveTime::from_hms_opt(12, 0, 15).unwrap(),
            )
        });
        assert_eq!(shift.start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());

        let persistence = Persistence::spawn(Arc::clone(&backend)).unwrap();
        persistence.save_employees(original.employees());
        persistence.save_shifts(original.shifts());
        assert!(persistence.flush().await.is_empty());

        let reloaded = load(backend.as_ref()).await;
        assert_eq!(reloaded.shifts(), original.shifts());
        assert_eq!(
            crate::schedule::booking_status(reloaded.shift_records(), &shift, &alice.id),
            crate::schedule::booking_status(original.shift_records(), &shift, &alice.id),
        );
    }

    #[tokio::test]
    async fn failed_shift_write_does_not_block_employee_write() {
        let inner = MemoryStore::new();
        let backend = Arc::new(BrokenShiftStore {
            inner: inner.clone(),
        });
        let original = sample_store();

        let persistence = Persistence::spawn(backend).unwrap();
        persistence.save_shifts(original.shifts());
        persistence.save_employees(original.employees());

        let failures = persistence.flush().await;
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].collection, Some(Collection::Shifts));

        assert!(inner.get_item("employees").await.unwrap().is_some());
        assert!(inner.get_item("shifts").await.unwrap().is_none());

        assert!(persistence.flush().await.is_empty());
    }
}
