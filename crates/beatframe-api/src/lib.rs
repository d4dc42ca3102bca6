//! Shared data types for beatframe consumers
//!
//! This crate holds the per-tick input and output types so that renderers and
//! other consumers can depend on them without pulling in the analysis engine.

pub mod band;
pub mod frame;
pub mod readings;

pub use band::{Band, BandSet, NUM_BANDS};
pub use frame::{BandReading, Frame};
pub use readings::MeterReadings;
