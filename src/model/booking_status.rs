use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// A shift's standing from one employee's point of view.
///
/// Never stored: it is recomputed from the current shifts on every read.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BookingStatus {
    Booked,
    Available,
    Overlapping,
}

impl BookingStatus {
    /// Overlapping shifts can be neither booked nor cancelled.
    pub fn is_actionable(self) -> bool {
        !matches!(self, BookingStatus::Overlapping)
    }
}
