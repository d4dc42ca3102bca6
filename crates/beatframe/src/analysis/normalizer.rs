//! Self-calibrating level normalization.
//!
//! Metering readings have no fixed scale, so each channel keeps a scale
//! factor that is tightened whenever a scaled reading would exceed 1. The
//! factor is never loosened within a session, which keeps the relative
//! dynamics between ticks intact once the loudest passage has been seen.

use beatframe_api::Band;
use tracing::debug;

/// Scale factor used for the very first reading of a session
pub const INITIAL_ADJUSTMENT: f32 = 0.1;

/// A single channel's scale factor
#[derive(Clone, Debug, Default)]
pub struct Normalizer {
    /// `None` until the first reading seeds it
    adjustment: Option<f32>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scale `raw` into 0..1 and apply `gain`.
    ///
    /// Negative readings are taken by magnitude and non-finite readings count
    /// as silence, so the result is always finite and within `0..=gain`.
    pub fn normalize(&mut self, raw: f32, gain: f32) -> f32 {
        let raw = if raw.is_finite() { raw.abs() } else { 0.0 };
        let factor = self.adjustment.get_or_insert(INITIAL_ADJUSTMENT);

        let mut scaled = raw * *factor;
        if scaled > 1.0 {
            *factor /= scaled;
            debug!(raw, factor = *factor, "tightened normalization factor");
            scaled = 1.0;
        }

        scaled * gain
    }

    /// Current scale factor (the seed value before the first reading)
    pub fn adjustment(&self) -> f32 {
        self.adjustment.unwrap_or(INITIAL_ADJUSTMENT)
    }
}

/// Normalizers for all tracked bands.
///
/// The aggregate channel's range differs from the filtered bands', so it gets
/// its own factor while low/mid/high share one.
#[derive(Clone, Debug)]
pub struct BandNormalizer {
    aggregate: Normalizer,
    narrow: Normalizer,
    gain: f32,
}

impl BandNormalizer {
    pub fn new(gain: f32) -> Self {
        Self {
            aggregate: Normalizer::new(),
            narrow: Normalizer::new(),
            gain,
        }
    }

    pub fn normalize(&mut self, band: Band, raw: f32) -> f32 {
        let gain = self.gain;
        self.channel_mut(band).normalize(raw, gain)
    }

    pub fn adjustment(&self, band: Band) -> f32 {
        if band.is_narrow() {
            self.narrow.adjustment()
        } else {
            self.aggregate.adjustment()
        }
    }

    fn channel_mut(&mut self, band: Band) -> &mut Normalizer {
        if band.is_narrow() {
            &mut self.narrow
        } else {
            &mut self.aggregate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_first_reading_uses_seed_factor() {
        let mut normalizer = Normalizer::new();
        assert_abs_diff_eq!(normalizer.normalize(5.0, 1.0), 0.5);
        assert_abs_diff_eq!(normalizer.adjustment(), INITIAL_ADJUSTMENT);
    }

    #[test]
    fn test_factor_tightens_once_then_holds() {
        let mut normalizer = Normalizer::new();
        let gain = 1.5;

        let first = normalizer.normalize(20.0, gain);
        assert_abs_diff_eq!(first, gain);
        assert_abs_diff_eq!(normalizer.adjustment(), 0.05);

        for _ in 0..2 {
            let val = normalizer.normalize(20.0, gain);
            assert_abs_diff_eq!(val, gain);
            assert_abs_diff_eq!(normalizer.adjustment(), 0.05);
        }
    }

    #[test]
    fn test_factor_never_loosens() {
        let mut normalizer = Normalizer::new();
        normalizer.normalize(40.0, 1.0);
        let tightened = normalizer.adjustment();

        normalizer.normalize(0.0, 1.0);
        normalizer.normalize(1.0, 1.0);
        assert_eq!(normalizer.adjustment(), tightened);

        // Quieter input keeps its relative level
        assert_abs_diff_eq!(normalizer.normalize(20.0, 1.0), 0.5);
    }

    #[test]
    fn test_degenerate_input_stays_in_range() {
        let mut normalizer = Normalizer::new();
        for raw in [f32::NAN, f32::INFINITY, -3.0, f32::MAX, 0.0] {
            let val = normalizer.normalize(raw, 2.0);
            assert!(val.is_finite());
            assert!((0.0..=2.0).contains(&val), "{raw} -> {val}");
        }
        assert!(normalizer.adjustment() > 0.0);
    }

    #[test]
    fn test_aggregate_and_narrow_factors_are_independent() {
        let mut bands = BandNormalizer::new(1.0);
        bands.normalize(Band::All, 100.0);
        assert_abs_diff_eq!(bands.adjustment(Band::All), 0.01);
        assert_abs_diff_eq!(bands.adjustment(Band::Low), INITIAL_ADJUSTMENT);

        // Narrow bands share one factor
        bands.normalize(Band::Low, 20.0);
        assert_abs_diff_eq!(bands.adjustment(Band::High), 0.05);
        assert_abs_diff_eq!(bands.normalize(Band::Mid, 10.0), 0.5);
    }
}
