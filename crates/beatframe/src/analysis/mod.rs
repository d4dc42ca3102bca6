mod engine;
mod history;
pub mod level;
mod normalizer;
pub mod onset;
pub mod spectrum;
mod stats;

pub use engine::AnalysisEngine;
pub use history::{HistoryWindow, MAX_FRAMES};
pub use level::{apply_gain_curve, reduction_to_raw, waveform_level, LevelMode};
pub use normalizer::{BandNormalizer, Normalizer, INITIAL_ADJUSTMENT};
pub use onset::{OnsetDetector, OnsetState};
pub use spectrum::SpectrumBucketizer;
pub use stats::WindowScan;
