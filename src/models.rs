use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::model::{employee::Employee, shift::Shift, shift::whole_minutes};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NewEmployee {
    pub name: String,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl NewEmployee {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Field-level merge over a stored employee. `None` leaves a field as is.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl EmployeePatch {
    pub(crate) fn apply(self, employee: &mut Employee) {
        if let Some(name) = self.name {
            employee.name = name;
        }
        if let Some(role) = self.role {
            employee.role = Some(role);
        }
        if let Some(email) = self.email {
            employee.email = Some(email);
        }
        if let Some(phone) = self.phone {
            employee.phone = Some(phone);
        }
        if let Some(notes) = self.notes {
            employee.notes = Some(notes);
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShift {
    pub date: NaiveDate,
    #[serde(with = "crate::model::shift::hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "crate::model::shift::hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub assigned_employees: BTreeSet<String>,
}

impl NewShift {
    pub fn new(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            date,
            start_time,
            end_time,
            location: None,
            notes: None,
            assigned_employees: BTreeSet::new(),
        }
    }
}

/// Field-level merge over a stored shift. A supplied `assigned_employees`
/// replaces the stored set wholesale.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftPatch {
    pub date: Option<NaiveDate>,
    #[serde(default, with = "optional_hhmm")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "optional_hhmm")]
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub assigned_employees: Option<BTreeSet<String>>,
}

impl ShiftPatch {
    pub(crate) fn apply(self, shift: &mut Shift) {
        if let Some(date) = self.date {
            shift.date = date;
        }
        if let Some(start_time) = self.start_time {
            shift.start_time = whole_minutes(start_time);
        }
        if let Some(end_time) = self.end_time {
            shift.end_time = whole_minutes(end_time);
        }
        if let Some(location) = self.location {
            shift.location = Some(location);
        }
        if let Some(notes) = self.notes {
            shift.notes = Some(notes);
        }
        if let Some(assigned) = self.assigned_employees {
            shift.assigned_employees = assigned;
        }
    }
}

mod optional_hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use crate::model::shift::hhmm;

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => hhmm::serialize(t, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| hhmm::parse(&raw).map_err(D::Error::custom))
            .transpose()
    }
}
