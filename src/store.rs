use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::model::{employee::Employee, shift::Shift, shift::whole_minutes};
use crate::models::{EmployeePatch, NewEmployee, NewShift, ShiftPatch};

/// Which collection a mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Changed {
    pub employees: bool,
    pub shifts: bool,
}

impl Changed {
    pub const EMPLOYEES: Changed = Changed { employees: true, shifts: false };
    pub const SHIFTS: Changed = Changed { employees: false, shifts: true };
    pub const BOTH: Changed = Changed { employees: true, shifts: true };
}

/// Canonical employee and shift records.
///
/// Every mutation builds a new collection and swaps the `Arc` in one step, so
/// a snapshot handed out earlier is never modified underneath its holder.
/// Update and delete on an unknown id leave the collection untouched and
/// return `None`.
#[derive(Debug, Clone, Default)]
pub struct ShiftStore {
    employees: Arc<Vec<Employee>>,
    shifts: Arc<Vec<Shift>>,
}

fn next_id() -> String {
    Uuid::new_v4().to_string()
}

impl ShiftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from persisted collections, dropping assignments
    /// that point at employees which no longer exist.
    pub fn from_parts(employees: Vec<Employee>, mut shifts: Vec<Shift>) -> Self {
        for shift in &mut shifts {
            let before = shift.assigned_employees.len();
            shift
                .assigned_employees
                .retain(|id| employees.iter().any(|e| &e.id == id));
            if shift.assigned_employees.len() != before {
                warn!(shift_id = %shift.id, "Dropped dangling employee ids from stored shift");
            }
        }
        Self {
            employees: Arc::new(employees),
            shifts: Arc::new(shifts),
        }
    }

    pub fn employees(&self) -> Arc<Vec<Employee>> {
        Arc::clone(&self.employees)
    }

    pub fn shifts(&self) -> Arc<Vec<Shift>> {
        Arc::clone(&self.shifts)
    }

    pub fn employee_records(&self) -> &[Employee] {
        &self.employees
    }

    pub fn shift_records(&self) -> &[Shift] {
        &self.shifts
    }

    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    pub fn shift(&self, id: &str) -> Option<&Shift> {
        self.shifts.iter().find(|s| s.id == id)
    }

    pub fn add_employee(&mut self, fields: NewEmployee) -> Employee {
        let employee = Employee {
            id: next_id(),
            name: fields.name,
            role: fields.role,
            email: fields.email,
            phone: fields.phone,
            notes: fields.notes,
        };

        let mut next = Vec::with_capacity(self.employees.len() + 1);
        next.extend(self.employees.iter().cloned());
        next.push(employee.clone());
        self.employees = Arc::new(next);

        debug!(employee_id = %employee.id, "Employee added");
        employee
    }

    pub fn update_employee(&mut self, id: &str, patch: EmployeePatch) -> Option<Employee> {
        let index = self.employees.iter().position(|e| e.id == id)?;

        let mut next = self.employees.as_ref().clone();
        patch.apply(&mut next[index]);
        let updated = next[index].clone();
        self.employees = Arc::new(next);

        debug!(employee_id = %id, "Employee updated");
        Some(updated)
    }

    /// Removes the employee and strips its id from every shift. Both
    /// collections are replaced together before this returns.
    pub fn delete_employee(&mut self, id: &str) -> Option<Employee> {
        let removed = self.employee(id)?.clone();

        let employees: Vec<Employee> = self
            .employees
            .iter()
            .filter(|e| e.id != id)
            .cloned()
            .collect();

        let shifts: Vec<Shift> = self
            .shifts
            .iter()
            .map(|s| {
                let mut s = s.clone();
                s.assigned_employees.remove(id);
                s
            })
            .collect();

        self.employees = Arc::new(employees);
        self.shifts = Arc::new(shifts);

        debug!(employee_id = %id, "Employee deleted and unassigned from all shifts");
        Some(removed)
    }

    pub fn add_shift(&mut self, fields: NewShift) -> Shift {
        let shift = Shift {
            id: next_id(),
            date: fields.date,
            start_time: whole_minutes(fields.start_time),
            end_time: whole_minutes(fields.end_time),
            location: fields.location,
            notes: fields.notes,
            assigned_employees: self.known_employees(fields.assigned_employees),
        };

        let mut next = Vec::with_capacity(self.shifts.len() + 1);
        next.extend(self.shifts.iter().cloned());
        next.push(shift.clone());
        self.shifts = Arc::new(next);

        debug!(shift_id = %shift.id, date = %shift.date, "Shift added");
        shift
    }

    pub fn update_shift(&mut self, id: &str, mut patch: ShiftPatch) -> Option<Shift> {
        let index = self.shifts.iter().position(|s| s.id == id)?;

        patch.assigned_employees = patch
            .assigned_employees
            .map(|ids| self.known_employees(ids));

        let mut next = self.shifts.as_ref().clone();
        patch.apply(&mut next[index]);
        let updated = next[index].clone();
        self.shifts = Arc::new(next);

        debug!(shift_id = %id, "Shift updated");
        Some(updated)
    }

    pub fn delete_shift(&mut self, id: &str) -> Option<Shift> {
        let removed = self.shift(id)?.clone();
        let shifts: Vec<Shift> = self.shifts.iter().filter(|s| s.id != id).cloned().collect();
        self.shifts = Arc::new(shifts);

        debug!(shift_id = %id, "Shift deleted");
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.employees = Arc::new(Vec::new());
        self.shifts = Arc::new(Vec::new());
    }

    fn known_employees(&self, ids: BTreeSet<String>) -> BTreeSet<String> {
        let (known, dangling): (BTreeSet<String>, BTreeSet<String>) = ids
            .into_iter()
            .partition(|id| self.employee(id).is_some());
        if !dangling.is_empty() {
            warn!(?dangling, "Ignoring assignment of unknown employees");
        }
        known
    }
}
