//! Round-trip runner.
//!
//! Launches the external protocol simulator for every selected case and
//! checks that what comes out of its stdout is exactly what went into its
//! stdin.
//!
//! ## Architecture
//!
//! ```text
//! roundtrip-runner
//!   ├─ payload           (reference payload generation, reused across runs)
//!   ├─ locate            (simulator discovery)
//!   ├─ ProcessExecutor   (env synthesis, spawn, wait, watchdog)
//!   └─ verify            (byte-exact file comparison)
//! ```
//!
//! Orchestration and the case model come from `roundtrip-core`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
mod locate;
pub mod payload;
mod process;
mod verify;

pub use config::RunnerConfig;
pub use locate::{SEARCH_PATHS, locate_simulator};
pub use payload::{PayloadFormat, PayloadSpec, ensure_payload};
pub use process::ProcessExecutor;
pub use verify::compare_files;
