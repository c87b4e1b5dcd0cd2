//! Employee and shift scheduling core.
//!
//! A [`Roster`] owns the employee and shift collections, mirrors them to a
//! key-value store, and answers the day, week and booking views the
//! presentation layer renders.

pub mod assignment;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod models;
pub mod persistence;
pub mod roster;
pub mod schedule;
pub mod storage;
pub mod store;
pub mod telemetry;

pub use assignment::AssignmentDraft;
pub use config::Config;
pub use error::StoreError;
pub use model::{booking_status::BookingStatus, employee::Employee, shift::Shift};
pub use models::{EmployeePatch, NewEmployee, NewShift, ShiftPatch};
pub use roster::Roster;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
