//! Bounded-duration frame history.
//!
//! Frames are kept newest first. After each push, any frame older than
//! `max(delta_window, avg_window)` is evicted, and the most recently evicted
//! frame is kept aside so the next push can reuse its allocation.

use std::collections::VecDeque;

use beatframe_api::{BandReading, BandSet, Frame};
use tracing::trace;

use super::stats::{self, WindowScan};

/// Hard cap on retained frames, independent of timing.
/// At the 16ms reference tick this is over a minute of history.
pub const MAX_FRAMES: usize = 4096;

pub struct HistoryWindow {
    frames: VecDeque<Frame>,
    /// Evicted frame waiting to be reused by the next push
    spare: Option<Frame>,
    delta_window: f64,
    avg_window: f64,
}

impl HistoryWindow {
    pub fn new(delta_window_ms: f64, avg_window_ms: f64) -> Self {
        Self {
            frames: VecDeque::new(),
            spare: None,
            delta_window: delta_window_ms,
            avg_window: avg_window_ms,
        }
    }

    /// The longest age a retained frame may have
    pub fn max_window(&self) -> f64 {
        self.delta_window.max(self.avg_window)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn newest(&self) -> Option<&Frame> {
        self.frames.front()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Frames newest first
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    /// Push the normalized levels for time `t` and compute the new frame's
    /// rolling statistics. Bands without a value are left as `None`.
    pub fn push_frame(&mut self, t: f64, values: &BandSet<Option<f32>>) -> &mut Frame {
        let mut frame = self.spare.take().unwrap_or_default();
        frame.t = t;
        frame.bands = values.map(|v| v.map(BandReading::with_val));
        frame.spectrum.clear();
        self.frames.push_front(frame);

        // Stats are computed before eviction: the reference frame may itself
        // be stale after a long gap between ticks.
        let scan = WindowScan::scan(&self.frames, t, self.delta_window, self.avg_window);
        stats::fill_band_stats(&mut self.frames, &scan);

        let evicted = self.evict_stale(t);
        if evicted > 0 {
            trace!(evicted, retained = self.frames.len(), "evicted stale frames");
        }

        &mut self.frames[0]
    }

    /// Remove every frame (other than the newest) older than the max window,
    /// then enforce `MAX_FRAMES`.
    fn evict_stale(&mut self, t: f64) -> usize {
        let oldest_allowed = t - self.max_window();
        let mut evicted = 0;

        let mut i = 1;
        while i < self.frames.len() {
            if self.frames[i].t < oldest_allowed {
                if let Some(frame) = self.frames.remove(i) {
                    self.spare = Some(frame);
                }
                evicted += 1;
            } else {
                i += 1;
            }
        }

        while self.frames.len() > MAX_FRAMES {
            if let Some(frame) = self.frames.pop_back() {
                self.spare = Some(frame);
            }
            evicted += 1;
        }

        evicted
    }
}
