//! End-of-day notifications.

use eco_core::{MapKind, Position};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What one call to `advance_day` changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayReport {
    /// Day counter after the tick
    pub day: u64,
    pub kind: MapKind,
    /// Cells whose displayable content may differ from the previous day
    pub changed: BTreeSet<Position>,
}

/// Receives the changed cells once per completed day.
///
/// Called synchronously at the end of `advance_day`; implementations that
/// feed a UI should hand the data off rather than render inline.
pub trait DayChangeObserver: Send {
    fn on_day_changed(&mut self, changed: &BTreeSet<Position>, kind: MapKind);
}

impl<F> DayChangeObserver for F
where
    F: FnMut(&BTreeSet<Position>, MapKind) + Send,
{
    fn on_day_changed(&mut self, changed: &BTreeSet<Position>, kind: MapKind) {
        self(changed, kind)
    }
}
