pub mod config;
pub mod detectors;
pub mod io;
pub mod metrics;
pub mod roi;
pub mod session;
pub mod signal;

pub use config::{AnalyzerConfig, BlinkConfig, ConfigError, PulseConfig};
pub use session::{AnalysisSession, Observation, Readout};
pub use signal::*;
