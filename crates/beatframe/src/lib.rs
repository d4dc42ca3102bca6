//! Real-time band loudness analysis.
//!
//! Turns per-band metering readings into smoothed, trend-aware levels with
//! onset detection, one [`Frame`] per tick. See [`AnalysisEngine`].

pub mod analysis;
pub mod utils;

pub use analysis::AnalysisEngine;
pub use beatframe_api::{Band, BandReading, BandSet, Frame, MeterReadings};
pub use utils::{AnalysisConfig, Config};
