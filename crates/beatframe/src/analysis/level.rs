//! Time-domain level metering helpers for feeding the engine.
//!
//! These sit on the upstream side of [`AnalysisEngine`](super::AnalysisEngine):
//! they turn a byte waveform or a compressor reduction reading into the
//! non-negative raw value the normalizer expects.

use serde::{Deserialize, Serialize};

/// Divisor applied to compressor reduction readings (dB)
pub const REDUCTION_SCALE_DB: f32 = 15.0;

/// How a waveform window is reduced to a single level
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LevelMode {
    #[default]
    Peak,
    Rms,
    Average,
}

impl std::str::FromStr for LevelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "peak" => Ok(LevelMode::Peak),
            "rms" => Ok(LevelMode::Rms),
            "average" | "avg" => Ok(LevelMode::Average),
            other => Err(format!("unknown level mode '{other}'")),
        }
    }
}

/// Level of an unsigned byte waveform (128 = silence) in 0..1
pub fn waveform_level(waveform: &[u8], mode: LevelMode) -> f32 {
    if waveform.is_empty() {
        return 0.0;
    }
    let samples = waveform.iter().map(|&b| (b as f32 / 128.0 - 1.0).abs());
    let count = waveform.len() as f32;

    let level = match mode {
        LevelMode::Peak => samples.fold(0.0f32, f32::max),
        LevelMode::Rms => (samples.map(|r| r * r).sum::<f32>() / count).sqrt(),
        LevelMode::Average => samples.sum::<f32>() / count,
    };
    level.min(1.0)
}

/// Perceptual gain curve: boosts quiet levels more than loud ones when
/// `gain > 1`, compresses them when `gain < 1`.
pub fn apply_gain_curve(level: f32, gain: f32) -> f32 {
    let level = level.clamp(0.0, 1.0);
    (1.0 - (1.0 - level).powf(gain)).min(1.0)
}

/// Convert a compressor reduction reading (dB, <= 0) to a raw band value
pub fn reduction_to_raw(reduction_db: f32) -> f32 {
    if reduction_db.is_finite() {
        reduction_db.abs() / REDUCTION_SCALE_DB
    } else {
        0.0
    }
}
