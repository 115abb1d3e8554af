//! Utility functions and types

pub mod data_loader;
pub mod io;
pub mod logging;

pub use data_loader::{load_csv, sample_rows, save_csv, split_features, train_test_split};
pub use io::{load_artifact, load_json, save_artifact, save_json};
pub use logging::init_logging;

use std::time::{Duration, Instant};

/// Simple wall-clock timer for logging stage durations
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}
