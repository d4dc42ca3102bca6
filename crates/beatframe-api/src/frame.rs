//! Per-tick analysis output

use serde::{Deserialize, Serialize};

use crate::{Band, BandSet};

/// Analysis result for one band on one tick
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct BandReading {
    /// Normalized level (0..gain)
    pub val: f32,
    /// Mean of `val` over the averaging window
    pub avg: f32,
    /// `val` minus the reference frame's `val` (~delta window old)
    pub delta: f32,
    /// `avg` minus the `avg` of the oldest frame in the averaging window
    pub trend: f32,
    /// True only on the tick an onset is first detected
    pub hit: bool,
}

impl BandReading {
    pub fn with_val(val: f32) -> Self {
        Self {
            val,
            ..Self::default()
        }
    }
}

/// One tick of analysis output.
///
/// A band is `None` when the upstream meter supplied no reading for it on
/// this tick. `spectrum` is empty unless spectrum bucketing is enabled.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Frame {
    /// Monotonic timestamp in milliseconds
    pub t: f64,
    pub bands: BandSet<Option<BandReading>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spectrum: Vec<f32>,
}

impl Default for Frame {
    /// An all-zero frame, returned to consumers before the first tick
    fn default() -> Self {
        Self {
            t: 0.0,
            bands: BandSet::from_fn(|_| Some(BandReading::default())),
            spectrum: Vec::new(),
        }
    }
}

impl Frame {
    pub fn reading(&self, band: Band) -> Option<&BandReading> {
        self.bands[band].as_ref()
    }

    /// Normalized level for `band`, 0 if the band had no reading
    pub fn val(&self, band: Band) -> f32 {
        self.reading(band).map_or(0.0, |r| r.val)
    }

    pub fn hit(&self, band: Band) -> bool {
        self.reading(band).is_some_and(|r| r.hit)
    }

    /// True if any band registered an onset this tick
    pub fn any_hit(&self) -> bool {
        Band::ALL.into_iter().any(|band| self.hit(band))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_frame_is_zeroed() {
        let frame = Frame::default();
        for band in Band::ALL {
            assert_eq!(frame.reading(band), Some(&BandReading::default()));
        }
        assert!(frame.spectrum.is_empty());
        assert!(!frame.any_hit());
    }

    #[test]
    fn test_missing_band_reads_as_zero() {
        let mut frame = Frame::default();
        frame.bands.mid = None;
        assert_eq!(frame.val(Band::Mid), 0.0);
        assert!(!frame.hit(Band::Mid));
    }
}
