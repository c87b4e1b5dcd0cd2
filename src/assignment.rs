use std::collections::{BTreeMap, BTreeSet};

use crate::model::{employee::Employee, shift::Shift};
use crate::models::{NewShift, ShiftPatch};

/// Pending employee selection for a shift being created or edited.
///
/// Lives only in the form that owns it; nothing reaches the store until the
/// committed set is written through `add_shift` or `update_shift`, where it
/// replaces the previous assignments outright.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentDraft {
    selected: BTreeMap<String, bool>,
}

impl AssignmentDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// One entry per employee, on for those already assigned to `shift`.
    pub fn for_shift(shift: &Shift, employees: &[Employee]) -> Self {
        let selected = employees
            .iter()
            .map(|e| (e.id.clone(), shift.is_assigned(&e.id)))
            .collect();
        Self { selected }
    }

    /// Flips the employee's membership and returns the new state.
    pub fn toggle(&mut self, employee_id: &str) -> bool {
        let entry = self.selected.entry(employee_id.to_string()).or_insert(false);
        *entry = !*entry;
        *entry
    }

    pub fn is_selected(&self, employee_id: &str) -> bool {
        self.selected.get(employee_id).copied().unwrap_or(false)
    }

    /// Ids currently switched on.
    pub fn commit(&self) -> BTreeSet<String> {
        self.selected
            .iter()
            .filter(|(_, on)| **on)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn apply_to_new(&self, fields: &mut NewShift) {
        fields.assigned_employees = self.commit();
    }

    pub fn apply_to_patch(&self, patch: &mut ShiftPatch) {
        patch.assigned_employees = Some(self.commit());
    }
}
