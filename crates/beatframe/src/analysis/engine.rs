//! Tick-driven band analysis.
//!
//! Once per tick the engine normalizes the raw band readings, pushes a frame
//! into the history window, fills in the rolling statistics, runs onset
//! detection per band and optionally buckets the spectrum. All state is
//! created on the first tick and dropped by [`AnalysisEngine::reset`].

use beatframe_api::{Band, BandSet, Frame, MeterReadings};
use tracing::debug;

use super::history::HistoryWindow;
use super::normalizer::{BandNormalizer, INITIAL_ADJUSTMENT};
use super::onset::{self, OnsetDetector, OnsetState, INITIAL_THRESHOLD};
use super::spectrum::SpectrumBucketizer;
use crate::utils::AnalysisConfig;

/// State for one analysis session (one audio source)
struct Session {
    normalizer: BandNormalizer,
    history: HistoryWindow,
    onsets: BandSet<OnsetDetector>,
    spectrum: SpectrumBucketizer,
}

impl Session {
    fn new(config: &AnalysisConfig) -> Self {
        Self {
            normalizer: BandNormalizer::new(config.gain()),
            history: HistoryWindow::new(config.delta_window_ms(), config.avg_window_ms()),
            onsets: BandSet::default(),
            spectrum: SpectrumBucketizer::new(config.spectrum_bins(), config.spectrum_coverage()),
        }
    }
}

pub struct AnalysisEngine {
    config: AnalysisConfig,
    session: Option<Session>,
}

impl AnalysisEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Whether a session is running (at least one tick since creation/reset)
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Run one tick.
    ///
    /// `spectrum` is the raw magnitude array for this tick; it is ignored
    /// unless spectrum bucketing is enabled. Returns `None` without touching
    /// any state when `readings` has no band values.
    pub fn tick(&mut self, readings: &MeterReadings, spectrum: Option<&[u8]>) -> Option<Frame> {
        if readings.is_empty() {
            return None;
        }

        let config = &self.config;
        let session = self.session.get_or_insert_with(|| {
            debug!(
                delta_window_ms = config.delta_window_ms(),
                avg_window_ms = config.avg_window_ms(),
                spectrum_bins = config.spectrum_bins(),
                "analysis session started"
            );
            Session::new(config)
        });

        let t = readings.t_ms;
        let mut levels: BandSet<Option<f32>> = BandSet::default();
        for band in Band::ALL {
            levels[band] = readings.bands[band].map(|raw| session.normalizer.normalize(band, raw));
        }

        let m = onset::time_scale(t, session.history.newest().map(|f| f.t));
        let frame = session.history.push_frame(t, &levels);

        for band in Band::ALL {
            if let Some(reading) = frame.bands[band].as_mut() {
                reading.hit = session.onsets[band].process(reading.val, m);
            }
        }

        if session.spectrum.is_enabled() {
            if let Some(raw) = spectrum {
                session.spectrum.bucketize(raw, &mut frame.spectrum);
            }
        }

        Some(frame.clone())
    }

    /// The newest frame, or an all-zero frame before the first tick
    pub fn latest(&self) -> Frame {
        self.session
            .as_ref()
            .and_then(|s| s.history.newest())
            .cloned()
            .unwrap_or_default()
    }

    /// Retained frames, newest first
    pub fn history(&self) -> impl Iterator<Item = &Frame> {
        self.session.iter().flat_map(|s| s.history.iter())
    }

    /// Drop all session state (e.g. a new audio source was loaded).
    /// The next tick starts a fresh session.
    pub fn reset(&mut self) {
        if self.session.take().is_some() {
            debug!("analysis session reset");
        }
    }

    /// Current onset threshold for `band`
    pub fn threshold(&self, band: Band) -> f32 {
        self.session
            .as_ref()
            .map_or(INITIAL_THRESHOLD, |s| s.onsets[band].threshold())
    }

    pub fn onset_state(&self, band: Band) -> OnsetState {
        self.session
            .as_ref()
            .map_or(OnsetState::Quiet, |s| s.onsets[band].state())
    }

    /// Current normalization factor for `band`'s channel
    pub fn adjustment(&self, band: Band) -> f32 {
        self.session
            .as_ref()
            .map_or(INITIAL_ADJUSTMENT, |s| s.normalizer.adjustment(band))
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn readings(t: f64, raw: f32) -> MeterReadings {
        MeterReadings::new(t, raw, raw, raw, raw)
    }

    #[test]
    fn test_lazy_activation() {
        let mut engine = AnalysisEngine::default();
        assert!(!engine.is_active());
        assert_eq!(engine.latest(), Frame::default());

        engine.tick(&readings(0.0, 1.0), None);
        assert!(engine.is_active());
    }

    #[test]
    fn test_empty_readings_skip_tick() {
        let mut engine = AnalysisEngine::default();
        assert!(engine.tick(&MeterReadings::default(), None).is_none());
        assert!(!engine.is_active());

        engine.tick(&readings(0.0, 1.0), None);
        let before: Vec<Frame> = engine.history().cloned().collect();
        let threshold = engine.threshold(Band::Low);

        assert!(engine.tick(&MeterReadings { t_ms: 16.0, ..Default::default() }, None).is_none());
        let after: Vec<Frame> = engine.history().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(engine.threshold(Band::Low), threshold);
    }

    #[test]
    fn test_first_frame() {
        let mut engine = AnalysisEngine::default();
        let frame = engine.tick(&readings(0.0, 5.0), None).unwrap();
        let low = frame.reading(Band::Low).unwrap();
        assert_abs_diff_eq!(low.val, 0.5);
        assert_eq!(low.avg, 0.0);
        assert_eq!(low.delta, 0.0);
        assert_eq!(low.trend, 0.0);
        assert!(frame.spectrum.is_empty());
    }

    #[test]
    fn test_missing_band_is_skipped() {
        let mut engine = AnalysisEngine::default();
        let mut input = readings(0.0, 5.0);
        input.bands.mid = None;
        let frame = engine.tick(&input, None).unwrap();
        assert!(frame.reading(Band::Mid).is_none());
        assert_eq!(engine.threshold(Band::Mid), INITIAL_THRESHOLD);
        assert!(engine.threshold(Band::Low) < INITIAL_THRESHOLD);
    }

    #[test]
    fn test_gain_scales_levels() {
        let config = AnalysisConfig {
            gain: Some(2.0),
            ..Default::default()
        };
        let mut engine = AnalysisEngine::new(config);
        let frame = engine.tick(&readings(0.0, 50.0), None).unwrap();
        assert_abs_diff_eq!(frame.val(Band::All), 2.0);
    }

    #[test]
    fn test_spectrum_only_when_enabled() {
        let raw = [255u8; 32];

        let mut disabled = AnalysisEngine::default();
        let frame = disabled.tick(&readings(0.0, 1.0), Some(&raw)).unwrap();
        assert!(frame.spectrum.is_empty());

        let mut enabled = AnalysisEngine::new(AnalysisConfig {
            spectrum_bins: Some(4),
            spectrum_coverage: Some(1.0),
            ..Default::default()
        });
        let frame = enabled.tick(&readings(0.0, 1.0), Some(&raw)).unwrap();
        assert_eq!(frame.spectrum, vec![1.0; 4]);

        // No magnitude array this tick
        let frame = enabled.tick(&readings(16.0, 1.0), None).unwrap();
        assert!(frame.spectrum.is_empty());
    }

    #[test]
    fn test_reset_starts_new_session() {
        let mut engine = AnalysisEngine::default();
        engine.tick(&readings(0.0, 40.0), None);
        assert!(engine.adjustment(Band::All) < INITIAL_ADJUSTMENT);

        engine.reset();
        assert!(!engine.is_active());
        assert_eq!(engine.history().count(), 0);
        assert_eq!(engine.adjustment(Band::All), INITIAL_ADJUSTMENT);
        assert_eq!(engine.onset_state(Band::Low), OnsetState::Quiet);

        let frame = engine.tick(&readings(1000.0, 5.0), None).unwrap();
        assert_abs_diff_eq!(frame.val(Band::All), 0.5);
        assert_eq!(frame.reading(Band::All).unwrap().delta, 0.0);
    }

    #[test]
    fn test_latest_matches_last_tick() {
        let mut engine = AnalysisEngine::default();
        engine.tick(&readings(0.0, 1.0), None);
        let frame = engine.tick(&readings(16.0, 3.0), None).unwrap();
        assert_eq!(engine.latest(), frame);
    }
}
