//! Per-band onset ("hit") detection.
//!
//! Each band follows its own level with a decaying threshold:
//! - when the level rises above the threshold, the threshold jumps up to it
//! - when the level is below, the threshold decays toward it by 15% per
//!   16ms reference tick
//! - the threshold never drops below 0.1
//!
//! A hit fires on the rising edge of `val^1.3 > threshold * 1.3` and is not
//! repeated until the level has fallen back under the threshold. Because the
//! threshold sits at the last peak, quiet passages make the detector more
//! sensitive and a fresh hit makes it less sensitive.

/// Threshold for a band that has not seen any signal yet
pub const INITIAL_THRESHOLD: f32 = 2.0;

/// Lowest value the threshold may decay to
pub const THRESHOLD_FLOOR: f32 = 0.1;

/// Tick period (ms) the decay rate is calibrated for
pub const REFERENCE_TICK_MS: f64 = 16.0;

/// Fraction of the threshold/level gap closed per reference tick
const DECAY_RATE: f32 = 0.15;

/// Power applied to the level before comparing (more selective at low levels)
const LEVEL_EXPONENT: f32 = 1.3;

/// Multiplier on the threshold in the hit test
const THRESHOLD_MARGIN: f32 = 1.3;

/// Where a band is in its onset cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OnsetState {
    /// Below threshold; the next crossing is a hit
    #[default]
    Quiet,
    /// Crossed the threshold on the latest tick
    HitEdge,
    /// Still above threshold after a hit
    SustainedAbove,
}

/// Decay multiplier for a tick `t` following a tick at `previous_t`.
///
/// 1.0 for a tick exactly one reference period later, proportionally more for
/// late or skipped ticks. Without a previous tick the period is assumed.
pub fn time_scale(t: f64, previous_t: Option<f64>) -> f32 {
    match previous_t {
        Some(previous) => ((t - previous) / REFERENCE_TICK_MS).max(0.0) as f32,
        None => 1.0,
    }
}

/// Adaptive threshold onset detector for a single band
#[derive(Clone, Debug)]
pub struct OnsetDetector {
    threshold: f32,
    state: OnsetState,
}

impl Default for OnsetDetector {
    fn default() -> Self {
        Self {
            threshold: INITIAL_THRESHOLD,
            state: OnsetState::Quiet,
        }
    }
}

impl OnsetDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the band's level for this tick; `m` is the decay multiplier from
    /// [`time_scale`].
    ///
    /// Returns `true` only on the tick an onset is first detected.
    pub fn process(&mut self, val: f32, m: f32) -> bool {
        let threshold = self.threshold;
        let above = val.powf(LEVEL_EXPONENT) > threshold * THRESHOLD_MARGIN;

        self.state = match (above, self.state) {
            (true, OnsetState::Quiet) => OnsetState::HitEdge,
            (true, _) => OnsetState::SustainedAbove,
            (false, _) => OnsetState::Quiet,
        };

        let decayed = threshold - (threshold - val) * DECAY_RATE * m;
        self.threshold = THRESHOLD_FLOOR.max(val).max(decayed);

        self.state == OnsetState::HitEdge
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn state(&self) -> OnsetState {
        self.state
    }

    /// Reset detector state (useful when switching audio sources)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
