use std::collections::BTreeSet;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// A scheduled work interval on one calendar day.
///
/// Times are local wall-clock values. An `end_time` earlier than `start_time`
/// means the shift runs past midnight into the next day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: String,

    pub date: NaiveDate,

    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,

    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub assigned_employees: BTreeSet<String>,
}

impl Shift {
    pub fn is_assigned(&self, employee_id: &str) -> bool {
        self.assigned_employees.contains(employee_id)
    }

    pub fn is_overnight(&self) -> bool {
        self.end_time < self.start_time
    }

    /// Half-open `[start, end)` interval in local date-time.
    pub fn span(&self) -> (NaiveDateTime, NaiveDateTime) {
        let start = self.date.and_time(self.start_time);
        let end_date = if self.is_overnight() {
            self.date
                .checked_add_days(Days::new(1))
                .unwrap_or(self.date)
        } else {
            self.date
        };
        (start, end_date.and_time(self.end_time))
    }

    /// True when both intervals are non-empty and intersect. Touching
    /// boundaries (one ends exactly when the other starts) do not overlap.
    pub fn overlaps(&self, other: &Shift) -> bool {
        let (a_start, a_end) = self.span();
        let (b_start, b_end) = other.span();
        if a_start >= a_end || b_start >= b_end {
            return false;
        }
        a_start < b_end && b_start < a_end
    }
}

/// Drops seconds and sub-second parts; shifts are kept to whole minutes.
pub fn whole_minutes(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// `HH:mm` on the wire; `HH:mm:ss` is accepted when reading.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%H:%M";
    const FORMAT_WITH_SECONDS: &str = "%H:%M:%S";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(D::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw, FORMAT_WITH_SECONDS))
            .map(super::whole_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shift(id: &str, date: &str, start: &str, end: &str) -> Shift {
        Shift {
            id: id.into(),
            date: date.parse().unwrap(),
            start_time: hhmm::parse(start).unwrap(),
            end_time: hhmm::parse(end).unwrap(),
            location: None,
            notes: None,
            assigned_employees: BTreeSet::new(),
        }
    }

    #[test]
    fn overlapping_morning_shifts() {
        let a = shift("a", "2024-06-10", "09:00", "12:00");
        let b = shift("b", "2024-06-10", "11:00", "14:00");
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn boundary_touch_is_not_an_overlap() {
        let a = shift("a", "2024-06-10", "09:00", "12:00");
        let c = shift("c", "2024-06-10", "12:00", "13:00");
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn different_days_do_not_overlap() {
        let a = shift("a", "2024-06-10", "09:00", "12:00");
        let b = shift("b", "2024-06-11", "09:00", "12:00");
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn overnight_shift_spills_into_next_morning() {
        let night = shift("n", "2024-06-10", "22:00", "06:00");
        let early = shift("e", "2024-06-11", "05:00", "08:00");
        let later = shift("l", "2024-06-11", "06:00", "08:00");

        assert!(night.is_overnight());
        assert!(night.overlaps(&early));
        assert!(!night.overlaps(&later));
    }

    #[test]
    fn zero_length_shift_overlaps_nothing() {
        let empty = shift("z", "2024-06-10", "10:00", "10:00");
        let wide = shift("w", "2024-06-10", "08:00", "18:00");
        assert!(!empty.overlaps(&wide));
        assert!(!wide.overlaps(&empty));
    }

    #[test]
    fn wire_format_uses_camel_case_and_hh_mm() {
        let mut s = shift("s1", "2024-06-10", "09:00", "17:00");
        s.assigned_employees.insert("e1".into());

        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "s1",
                "date": "2024-06-10",
                "startTime": "09:00",
                "endTime": "17:00",
                "assignedEmployees": ["e1"]
            })
        );
    }

    #[test]
    fn missing_assignments_read_as_empty() {
        let s: Shift = serde_json::from_str(
            r#"{"id":"s2","date":"2024-06-10","startTime":"09:00:00","endTime":"10:30"}"#,
        )
        .unwrap();
        assert!(s.assigned_employees.is_empty());
        assert_eq!(s.start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    }

    #[test]
    fn seconds_are_dropped_on_read() {
        assert_eq!(
            hhmm::parse("09:00:45").unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        );
        assert_eq!(
            whole_minutes(NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap()),
            NaiveTime::from_hms_opt(23, 59, 0).unwrap()
        );
    }

    #[test]
    fn malformed_time_is_rejected() {
        let result: Result<Shift, _> = serde_json::from_str(
            r#"{"id":"s3","date":"2024-06-10","startTime":"9am","endTime":"10:30"}"#,
        );
        assert!(result.is_err());
    }
}
