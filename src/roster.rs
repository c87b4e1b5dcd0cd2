use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::StoreError;
use crate::model::{booking_status::BookingStatus, employee::Employee, shift::Shift};
use crate::models::{EmployeePatch, NewEmployee, NewShift, ShiftPatch};
use crate::persistence::{self, Persistence, WriteFailure};
use crate::schedule::{self, DEFAULT_UPCOMING_DAYS, ShiftView, WeekGrid};
use crate::storage::{KeyValueStore, SqliteStore};
use crate::store::{Changed, ShiftStore};

/// The application's shift and employee state.
///
/// Built once by loading from storage and then handed to whatever needs it.
/// Mutations apply in memory immediately and queue a background save of each
/// touched collection; reads always see the in-memory state.
pub struct Roster {
    store: ShiftStore,
    persistence: Persistence,
    upcoming_days: u64,
}

impl Roster {
    /// Loads both collections from `backend`, then starts saving to it.
    ///
    /// Must be awaited on a tokio runtime; otherwise the writer cannot start
    /// and `StoreError::NoRuntime` is returned.
    #[instrument(skip_all)]
    pub async fn load<S: KeyValueStore>(backend: S) -> Result<Self, StoreError> {
        let backend = Arc::new(backend);
        let store = persistence::load(backend.as_ref()).await;

        Ok(Self {
            store,
            persistence: Persistence::spawn(backend)?,
            upcoming_days: DEFAULT_UPCOMING_DAYS,
        })
    }

    /// Opens the SQLite store named by the configuration.
    pub async fn open(config: &Config) -> Result<Self, StoreError> {
        let backend = SqliteStore::connect(&config.database_url).await?;
        let mut roster = Self::load(backend).await?;
        roster.upcoming_days = config.upcoming_days;
        info!(database_url = %config.database_url, "Roster opened");
        Ok(roster)
    }

    // -------------------- Mutations --------------------

    pub fn add_employee(&mut self, fields: NewEmployee) -> Employee {
        let employee = self.store.add_employee(fields);
        self.persist(Changed::EMPLOYEES);
        employee
    }

    /// `None` when no employee has this id; nothing changes in that case.
    pub fn update_employee(&mut self, id: &str, patch: EmployeePatch) -> Option<Employee> {
        let updated = self.store.update_employee(id, patch)?;
        self.persist(Changed::EMPLOYEES);
        Some(updated)
    }

    /// Removes the employee and every assignment that referenced it.
    pub fn delete_employee(&mut self, id: &str) -> Option<Employee> {
        let removed = self.store.delete_employee(id)?;
        self.persist(Changed::BOTH);
        Some(removed)
    }

    pub fn add_shift(&mut self, fields: NewShift) -> Shift {
        let shift = self.store.add_shift(fields);
        self.persist(Changed::SHIFTS);
        shift
    }

    pub fn update_shift(&mut self, id: &str, patch: ShiftPatch) -> Option<Shift> {
        let updated = self.store.update_shift(id, patch)?;
        self.persist(Changed::SHIFTS);
        Some(updated)
    }

    pub fn delete_shift(&mut self, id: &str) -> Option<Shift> {
        let removed = self.store.delete_shift(id)?;
        self.persist(Changed::SHIFTS);
        Some(removed)
    }

    /// Books an available shift or cancels a booked one for `employee_id`.
    ///
    /// Overlapping shifts are left untouched. Returns the shift's status
    /// afterwards, or `None` if either id is unknown.
    pub fn toggle_booking(&mut self, shift_id: &str, employee_id: &str) -> Option<BookingStatus> {
        self.store.employee(employee_id)?;
        let shifts = self.store.shifts();
        let shift = shifts.iter().find(|s| s.id == shift_id)?;

        let mut assigned = shift.assigned_employees.clone();
        let next = match schedule::booking_status(&shifts, shift, employee_id) {
            BookingStatus::Overlapping => return Some(BookingStatus::Overlapping),
            BookingStatus::Booked => {
                assigned.remove(employee_id);
                BookingStatus::Available
            }
            BookingStatus::Available => {
                assigned.insert(employee_id.to_string());
                BookingStatus::Booked
            }
        };

        self.update_shift(
            shift_id,
            ShiftPatch {
                assigned_employees: Some(assigned),
                ..ShiftPatch::default()
            },
        )?;
        Some(next)
    }

    /// Forgets every employee and shift, in memory and in storage.
    pub fn clear_all(&mut self) {
        self.store.clear();
        self.persistence.clear();
        info!("Roster cleared");
    }

    /// Waits for queued saves; returns the ones that failed since the last call.
    pub async fn flush(&self) -> Vec<WriteFailure> {
        self.persistence.flush().await
    }

    fn persist(&self, changed: Changed) {
        if changed.employees {
            self.persistence.save_employees(self.store.employees());
        }
        if changed.shifts {
            self.persistence.save_shifts(self.store.shifts());
        }
    }

    // -------------------- Queries --------------------

    pub fn list_employees(&self) -> Arc<Vec<Employee>> {
        self.store.employees()
    }

    pub fn list_shifts(&self) -> Arc<Vec<Shift>> {
        self.store.shifts()
    }

    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.store.employee(id)
    }

    pub fn shift(&self, id: &str) -> Option<&Shift> {
        self.store.shift(id)
    }

    pub fn shifts_on_date(&self, date: NaiveDate) -> Vec<&Shift> {
        schedule::shifts_on_date(self.store.shift_records(), date)
    }

    pub fn upcoming_shifts(&self, from: NaiveDate, days: u64) -> Vec<&Shift> {
        schedule::upcoming_shifts(self.store.shift_records(), from, days)
    }

    /// Upcoming shifts over the configured horizon.
    pub fn upcoming(&self, from: NaiveDate) -> Vec<&Shift> {
        self.upcoming_shifts(from, self.upcoming_days)
    }

    pub fn shifts_for_employee(&self, employee_id: &str) -> Vec<&Shift> {
        schedule::shifts_for_employee(self.store.shift_records(), employee_id)
    }

    pub fn week_grid(&self, anchor: NaiveDate) -> WeekGrid {
        schedule::week_grid(anchor)
    }

    pub fn employee_name(&self, id: &str) -> &str {
        schedule::employee_name(self.store.employee_records(), id)
    }

    pub fn booking_status(&self, shift: &Shift, employee_id: &str) -> BookingStatus {
        schedule::booking_status(self.store.shift_records(), shift, employee_id)
    }

    /// The "My shifts" tab: shifts on `date` with their status for the viewer.
    pub fn day_view(&self, date: NaiveDate, employee_id: &str) -> Vec<ShiftView<'_>> {
        schedule::annotate(
            self.store.shift_records(),
            self.shifts_on_date(date),
            employee_id,
        )
    }

    /// The "Available shifts" tab over the configured horizon.
    pub fn upcoming_view(&self, from: NaiveDate, employee_id: &str) -> Vec<ShiftView<'_>> {
        schedule::annotate(self.store.shift_records(), self.upcoming(from), employee_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::NaiveTime;

    fn new_shift(day: &str, start: (u32, u32), end: (u32, u32)) -> NewShift {
        NewShift::new(
            day.parse().unwrap(),
            NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn booking_and_cancelling() {
        let mut roster = Roster::load(MemoryStore::new()).await.unwrap();
        let alice = roster.add_employee(NewEmployee::named("Alice"));
        let morning = roster.add_shift(new_shift("2024-06-10", (9, 0), (12, 0)));
        let clash = roster.add_shift(new_shift("2024-06-10", (11, 0), (13, 0)));

        assert_eq!(
            roster.toggle_booking(&morning.id, &alice.id),
            Some(BookingStatus::Booked)
        );
        assert!(roster.shift(&morning.id).unwrap().is_assigned(&alice.id));

        assert_eq!(
            roster.toggle_booking(&clash.id, &alice.id),
            Some(BookingStatus::Overlapping)
        );
        assert!(!roster.shift(&clash.id).unwrap().is_assigned(&alice.id));

        assert_eq!(
            roster.toggle_booking(&morning.id, &alice.id),
            Some(BookingStatus::Available)
        );
        assert!(roster.shift(&morning.id).unwrap().assigned_employees.is_empty());

        assert_eq!(roster.toggle_booking("nope", &alice.id), None);
        assert_eq!(roster.toggle_booking(&morning.id, "nobody"), None);
    }

    #[tokio::test]
    async fn day_view_marks_conflicts_disabled() {
        let mut roster = Roster::load(MemoryStore::new()).await.unwrap();
        let alice = roster.add_employee(NewEmployee::named("Alice"));
        let mut held = new_shift("2024-06-10", (9, 0), (12, 0));
        held.assigned_employees.insert(alice.id.clone());
        roster.add_shift(held);
        roster.add_shift(new_shift("2024-06-10", (10, 0), (11, 0)));
        roster.add_shift(new_shift("2024-06-10", (12, 0), (13, 0)));

        let view = roster.day_view("2024-06-10".parse().unwrap(), &alice.id);
        let flags: Vec<(BookingStatus, bool)> =
            view.iter().map(|v| (v.status, v.disabled)).collect();
        assert_eq!(
            flags,
            [
                (BookingStatus::Booked, false),
                (BookingStatus::Overlapping, true),
                (BookingStatus::Available, false),
            ]
        );
    }

    #[test]
    fn load_outside_a_runtime_fails_instead_of_panicking() {
        let result = futures::executor::block_on(Roster::load(MemoryStore::new()));
        assert!(matches!(result, Err(StoreError::NoRuntime)));
    }

    #[tokio::test]
    async fn clear_all_empties_memory_and_storage() {
        let backend = MemoryStore::new();
        let mut roster = Roster::load(backend.clone()).await.unwrap();
        roster.add_employee(NewEmployee::named("Alice"));
        roster.add_shift(new_shift("2024-06-10", (9, 0), (12, 0)));
        assert!(roster.flush().await.is_empty());

        roster.clear_all();
        assert!(roster.flush().await.is_empty());

        assert!(roster.list_employees().is_empty());
        assert!(roster.list_shifts().is_empty());
        assert_eq!(backend.get_item("employees").await.unwrap(), None);
        assert_eq!(backend.get_item("shifts").await.unwrap(), None);
    }
}
