//! Simulator discovery.

use std::path::{Path, PathBuf};

use roundtrip_core::HarnessError;

/// Relative locations tried when no simulator path is given, in order.
///
/// The first matches a run from a `tests/` directory inside the build tree,
/// the second a run from the build root.
pub const SEARCH_PATHS: &[&str] = &["../bin/simulator", "bin/simulator"];

/// Resolve the simulator executable.
///
/// An explicit path must exist. Without one, [`SEARCH_PATHS`] are tried
/// relative to `base`.
///
/// # Errors
///
/// Returns `SimulatorNotFound` listing every path that was tried.
pub fn locate_simulator(explicit: Option<&Path>, base: &Path) -> Result<PathBuf, HarnessError> {
    let candidates: Vec<PathBuf> = match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => SEARCH_PATHS.iter().map(|p| base.join(p)).collect(),
    };

    if let Some(found) = candidates.iter().find(|p| p.is_file()) {
        tracing::debug!(simulator = %found.display(), "Located simulator");
        return Ok(found.clone());
    }

    Err(HarnessError::SimulatorNotFound { searched: candidates })
}
