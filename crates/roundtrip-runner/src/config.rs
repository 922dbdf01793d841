//! Runner configuration.

use std::{path::PathBuf, time::Duration};

/// Symbol size every simulator run is configured with.
pub const SYMBOL_SIZE: u32 = 1500;

/// Environment key for [`SYMBOL_SIZE`].
pub const SYMBOL_SIZE_KEY: &str = "SYMBOL_SIZE";

/// Environment key for the simulator's RNG seed.
pub const SEED_KEY: &str = "SEED";

/// Default payload file, relative to the working directory.
pub const DEFAULT_PAYLOAD_PATH: &str = "block";

/// Default output file, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "out";

/// Configuration for launching the simulator.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Simulator executable.
    pub simulator: PathBuf,
    /// Reference payload fed to stdin.
    pub payload_path: PathBuf,
    /// File receiving stdout, truncated for every case.
    pub output_path: PathBuf,
    /// Kill the simulator after this long (default: wait forever).
    pub timeout: Option<Duration>,
    /// Exported as `SEED` to make simulated loss reproducible.
    pub seed: Option<u64>,
}

impl RunnerConfig {
    /// Configuration with default file paths for the given simulator.
    pub fn new(simulator: impl Into<PathBuf>) -> Self {
        Self {
            simulator: simulator.into(),
            payload_path: PathBuf::from(DEFAULT_PAYLOAD_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            timeout: None,
            seed: None,
        }
    }
}
