//! Per-tick input from the upstream metering stage

use serde::{Deserialize, Serialize};

use crate::BandSet;

/// Raw readings for one tick.
///
/// Band values are non-negative reduction magnitudes; `None` means the meter
/// had nothing for that band this tick.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct MeterReadings {
    /// Monotonic time in milliseconds
    pub t_ms: f64,
    pub bands: BandSet<Option<f32>>,
}

impl MeterReadings {
    /// Readings with a value for every band
    pub fn new(t_ms: f64, low: f32, mid: f32, high: f32, all: f32) -> Self {
        Self {
            t_ms,
            bands: BandSet::new(Some(low), Some(mid), Some(high), Some(all)),
        }
    }

    /// True when no band has a reading (the tick should be skipped)
    pub fn is_empty(&self) -> bool {
        self.bands.iter().all(|(_, v)| v.is_none())
    }
}
