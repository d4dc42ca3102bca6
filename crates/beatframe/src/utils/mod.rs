mod config;

pub use config::{AnalysisConfig, Config, ConfigError};
