//! Rolling per-band statistics over the history window.

use std::collections::VecDeque;

use beatframe_api::{Band, Frame};

/// Result of one pass over the window for the newest frame's time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowScan {
    /// Furthest index still inside the averaging window (0 if only the newest)
    pub avg_index: usize,
    /// Oldest frame still inside the delta window. Falls back to the previous
    /// frame when none qualifies; `None` on the first frame.
    pub reference: Option<usize>,
}

impl WindowScan {
    /// `frames[0]` must be the frame just pushed for time `t`.
    pub fn scan(frames: &VecDeque<Frame>, t: f64, delta_window: f64, avg_window: f64) -> Self {
        let avg_start = t - avg_window;
        let delta_start = t - delta_window;

        let mut avg_index = 0;
        let mut reference = if frames.len() > 1 { Some(1) } else { None };

        for (i, frame) in frames.iter().enumerate().skip(1) {
            if frame.t >= avg_start {
                avg_index = i;
            }
            if frame.t >= delta_start {
                reference = Some(i);
            }
        }

        Self {
            avg_index,
            reference,
        }
    }
}

/// Fill `avg`, `delta` and `trend` on `frames[0]` for every band it has a
/// reading for.
///
/// `avg` is the mean `val` of the `avg_index` newest frames and is defined as
/// 0 when `avg_index` is 0. Frames missing a band contribute 0 to the sum.
/// `delta` and `trend` are 0 without a reference frame, or when the frame
/// they compare against has no reading for the band.
pub fn fill_band_stats(frames: &mut VecDeque<Frame>, scan: &WindowScan) {
    for band in Band::ALL {
        let Some(val) = frames[0].reading(band).map(|r| r.val) else {
            continue;
        };

        let avg = average(frames, band, scan.avg_index);
        let (delta, trend) = match scan.reference {
            Some(reference) => (
                frames[reference].reading(band).map_or(0.0, |r| val - r.val),
                frames[scan.avg_index]
                    .reading(band)
                    .map_or(0.0, |r| avg - r.avg),
            ),
            None => (0.0, 0.0),
        };

        if let Some(reading) = frames[0].bands[band].as_mut() {
            reading.avg = avg;
            reading.delta = delta;
            reading.trend = trend;
        }
    }
}

fn average(frames: &VecDeque<Frame>, band: Band, count: usize) -> f32 {
    if count == 0 {
        return 0.0;
    }
    let sum: f32 = frames.iter().take(count).map(|f| f.val(band)).sum();
    sum / count as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use beatframe_api::{BandReading, BandSet};

    /// Build a newest-first window from `(t, val)` pairs given oldest first
    fn window(samples: &[(f64, f32)]) -> VecDeque<Frame> {
        let mut frames = VecDeque::new();
        for &(t, val) in samples {
            frames.push_front(Frame {
                t,
                bands: BandSet::from_fn(|_| Some(BandReading::with_val(val))),
                spectrum: Vec::new(),
            });
        }
        frames
    }

    #[test]
    fn test_scan_first_frame() {
        let frames = window(&[(0.0, 1.0)]);
        let scan = WindowScan::scan(&frames, 0.0, 50.0, 150.0);
        assert_eq!(scan.avg_index, 0);
        assert_eq!(scan.reference, None);
    }

    #[test]
    fn test_scan_finds_window_boundaries() {
        let samples: Vec<(f64, f32)> = (0..12).map(|i| (i as f64 * 16.0, 0.0)).collect();
        let frames = window(&samples);
        let t = 11.0 * 16.0;
        let scan = WindowScan::scan(&frames, t, 50.0, 150.0);

        // Ages 0,16,...,144 are inside 150ms
        assert_eq!(scan.avg_index, 9);
        // Ages 16,32,48 are inside 50ms; the oldest of them is index 3
        assert_eq!(scan.reference, Some(3));
    }

    #[test]
    fn test_scan_reference_defaults_to_previous() {
        let frames = window(&[(0.0, 0.0), (500.0, 0.0)]);
        let scan = WindowScan::scan(&frames, 500.0, 50.0, 150.0);
        assert_eq!(scan.avg_index, 0);
        assert_eq!(scan.reference, Some(1));
    }

    #[test]
    fn test_avg_is_zero_when_window_holds_only_newest() {
        let mut frames = window(&[(0.0, 0.3), (500.0, 0.8)]);
        let scan = WindowScan::scan(&frames, 500.0, 50.0, 150.0);
        fill_band_stats(&mut frames, &scan);

        let reading = frames[0].bands.low.unwrap();
        assert_eq!(reading.avg, 0.0);
        assert_abs_diff_eq!(reading.delta, 0.5);
        assert_eq!(reading.trend, 0.0);
    }

    #[test]
    fn test_avg_delta_trend() {
        let mut frames = window(&[(0.0, 0.2), (16.0, 0.4), (32.0, 0.6)]);
        let scan = WindowScan::scan(&frames, 32.0, 20.0, 40.0);
        assert_eq!(scan.avg_index, 2);
        assert_eq!(scan.reference, Some(1));

        fill_band_stats(&mut frames, &scan);
        let reading = frames[0].bands.mid.unwrap();
        // mean of the two newest frames
        assert_abs_diff_eq!(reading.avg, 0.5);
        assert_abs_diff_eq!(reading.delta, 0.2);
        // oldest in-window frame has avg 0 (never filled)
        assert_abs_diff_eq!(reading.trend, 0.5);
    }

    #[test]
    fn test_skips_band_without_reading() {
        let mut frames = window(&[(0.0, 0.2), (16.0, 0.4)]);
        frames[0].bands.high = None;
        let scan = WindowScan::scan(&frames, 16.0, 50.0, 150.0);
        fill_band_stats(&mut frames, &scan);

        assert!(frames[0].bands.high.is_none());
        assert_abs_diff_eq!(frames[0].bands.low.unwrap().delta, 0.2);
    }

    #[test]
    fn test_missing_reference_band_gives_zero_delta() {
        let mut frames = window(&[(0.0, 0.2), (16.0, 0.4)]);
        frames[1].bands.all = None;
        let scan = WindowScan::scan(&frames, 16.0, 50.0, 150.0);
        fill_band_stats(&mut frames, &scan);

        let reading = frames[0].bands.all.unwrap();
        assert_eq!(reading.delta, 0.0);
        // avg_index is 1, so only the newest frame is averaged
        assert_abs_diff_eq!(reading.avg, 0.4);
    }
}
