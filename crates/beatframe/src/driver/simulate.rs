//! Synthetic meter readings for running the engine without an audio graph.
//!
//! Produces a four-on-the-floor pattern: a decaying kick on every beat in the
//! low band, an off-beat hat in the high band and a steady pad in the mid
//! band. Tick spacing jitters around the configured interval and the odd tick
//! is dropped, so the engine sees the irregular timing it gets from a real
//! timer.

use std::f32::consts::PI;

use beatframe::analysis::{waveform_level, LevelMode};
use beatframe::MeterReadings;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 120 BPM
const BEAT_MS: f64 = 500.0;
const KICK_DECAY_MS: f64 = 60.0;
const HAT_DECAY_MS: f64 = 25.0;
const WAVEFORM_LEN: usize = 256;
const SPECTRUM_LEN: usize = 512;
/// Chance that a tick is late by a full interval
const DROPPED_TICK_CHANCE: f64 = 0.02;

pub struct Simulator {
    rng: StdRng,
    t_ms: f64,
    tick_interval_ms: f64,
    level_mode: LevelMode,
    waveform: Vec<u8>,
    spectrum: Vec<u8>,
}

impl Simulator {
    pub fn new(seed: u64, tick_interval_ms: u64, level_mode: LevelMode) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            t_ms: 0.0,
            tick_interval_ms: tick_interval_ms as f64,
            level_mode,
            waveform: vec![128; WAVEFORM_LEN],
            spectrum: vec![0; SPECTRUM_LEN],
        }
    }

    /// Advance to the next tick, returning its readings and magnitude array
    pub fn next_tick(&mut self) -> (MeterReadings, &[u8]) {
        let jitter = self.tick_interval_ms * 0.25;
        let mut step = self.tick_interval_ms + self.rng.random_range(-jitter..=jitter);
        if self.rng.random_bool(DROPPED_TICK_CHANCE) {
            step += self.tick_interval_ms;
        }
        self.t_ms += step.max(1.0);

        let phase = self.t_ms % BEAT_MS;
        let kick = (-phase / KICK_DECAY_MS).exp() as f32;
        let hat_phase = (self.t_ms + BEAT_MS / 2.0) % BEAT_MS;
        let hat = (-hat_phase / HAT_DECAY_MS).exp() as f32;

        let low = 12.0 * kick + self.noise(0.3);
        let mid = 3.0 + self.noise(0.5);
        let high = 6.0 * hat + self.noise(0.2);

        self.fill_waveform(0.15 + 0.8 * kick.max(hat * 0.5));
        let all = 10.0 * waveform_level(&self.waveform, self.level_mode);

        self.fill_spectrum(kick, hat);

        let readings = MeterReadings::new(self.t_ms, low, mid, high, all);
        (readings, self.spectrum.as_slice())
    }

    fn noise(&mut self, amount: f32) -> f32 {
        self.rng.random_range(0.0..=amount)
    }

    fn fill_waveform(&mut self, amplitude: f32) {
        for i in 0..WAVEFORM_LEN {
            let wave = (2.0 * PI * 4.0 * i as f32 / WAVEFORM_LEN as f32).sin();
            let sample = amplitude * wave + self.rng.random_range(-0.02..=0.02);
            self.waveform[i] = (128.0 + sample.clamp(-1.0, 1.0) * 127.0) as u8;
        }
    }

    fn fill_spectrum(&mut self, kick: f32, hat: f32) {
        let len = SPECTRUM_LEN as f32;
        for k in 0..SPECTRUM_LEN {
            let pos = k as f32 / len;
            let energy = kick * (-pos * 40.0).exp()
                + 0.3 * (-pos * 6.0).exp()
                + hat * 0.6 * (-((pos - 0.5) * 12.0).powi(2)).exp();
            let jitter = self.rng.random_range(0.0..=0.03);
            self.spectrum[k] = ((energy + jitter).clamp(0.0, 1.0) * 255.0) as u8;
        }
    }
}
