//! Read-only views over the roster: day and range filters, the weekly grid,
//! name lookup and per-employee booking status.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::model::{booking_status::BookingStatus, employee::Employee, shift::Shift};

/// Shown in place of an employee id that no longer resolves.
pub const UNASSIGNED: &str = "Unassigned";

pub const DEFAULT_UPCOMING_DAYS: u64 = 7;

pub fn shifts_on_date(shifts: &[Shift], date: NaiveDate) -> Vec<&Shift> {
    shifts.iter().filter(|s| s.date == date).collect()
}

/// Shifts strictly after `from` and on or before `from + days`.
pub fn upcoming_shifts(shifts: &[Shift], from: NaiveDate, days: u64) -> Vec<&Shift> {
    let until = from.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX);
    shifts
        .iter()
        .filter(|s| s.date > from && s.date <= until)
        .collect()
}

pub fn shifts_for_employee<'a>(shifts: &'a [Shift], employee_id: &str) -> Vec<&'a Shift> {
    shifts.iter().filter(|s| s.is_assigned(employee_id)).collect()
}

pub fn employee_name<'a>(employees: &'a [Employee], id: &str) -> &'a str {
    employees
        .iter()
        .find(|e| e.id == id)
        .map(|e| e.name.as_str())
        .unwrap_or(UNASSIGNED)
}

/// Classifies `shift` for `employee_id` against every shift in `shifts`.
///
/// A shift that intersects another shift the employee already holds is
/// `Overlapping`, even when the employee holds both.
pub fn booking_status(shifts: &[Shift], shift: &Shift, employee_id: &str) -> BookingStatus {
    let conflicts = shifts
        .iter()
        .filter(|other| other.id != shift.id && other.is_assigned(employee_id))
        .any(|other| other.overlaps(shift));

    if conflicts {
        BookingStatus::Overlapping
    } else if shift.is_assigned(employee_id) {
        BookingStatus::Booked
    } else {
        BookingStatus::Available
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShiftView<'a> {
    pub shift: &'a Shift,
    pub status: BookingStatus,
    pub disabled: bool,
}

/// Pairs each shift in `list` with its status for `employee_id`.
pub fn annotate<'a>(
    shifts: &[Shift],
    list: impl IntoIterator<Item = &'a Shift>,
    employee_id: &str,
) -> Vec<ShiftView<'a>> {
    list.into_iter()
        .map(|shift| {
            let status = booking_status(shifts, shift, employee_id);
            ShiftView {
                shift,
                status,
                disabled: !status.is_actionable(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekDay {
    pub date: NaiveDate,
    /// Short weekday name, e.g. `Sun`.
    pub label: String,
    pub day_of_month: u32,
}

impl WeekDay {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            label: date.format("%a").to_string(),
            day_of_month: date.day(),
        }
    }
}

/// Seven consecutive days, Sunday first, containing the anchor date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekGrid {
    anchor: NaiveDate,
    days: Vec<WeekDay>,
}

pub fn week_grid(anchor: NaiveDate) -> WeekGrid {
    let offset = u64::from(anchor.weekday().num_days_from_sunday());
    let start = anchor.checked_sub_days(Days::new(offset)).unwrap_or(anchor);

    let days = start
        .iter_days()
        .take(7)
        .map(WeekDay::new)
        .collect();

    WeekGrid { anchor, days }
}

impl WeekGrid {
    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn start(&self) -> NaiveDate {
        self.days[0].date
    }

    pub fn end(&self) -> NaiveDate {
        self.days[self.days.len() - 1].date
    }

    pub fn days(&self) -> &[WeekDay] {
        &self.days
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start() <= date && date <= self.end()
    }

    pub fn previous(&self) -> WeekGrid {
        week_grid(
            self.anchor
                .checked_sub_days(Days::new(7))
                .unwrap_or(self.anchor),
        )
    }

    pub fn next(&self) -> WeekGrid {
        week_grid(
            self.anchor
                .checked_add_days(Days::new(7))
                .unwrap_or(self.anchor),
        )
    }
}
