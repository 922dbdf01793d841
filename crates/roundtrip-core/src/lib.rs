//! Round-trip verification core.
//!
//! Describes what to run and decides what a run means, without doing any
//! I/O:
//!
//! ```text
//! roundtrip-core
//!   ├─ TestCase       (protocol + ordered parameters, env synthesis)
//!   ├─ TestMatrix     (topology -> cases, selection and planning)
//!   ├─ catalog        (built-in scenarios)
//!   ├─ CaseState      (per-case lifecycle)
//!   └─ Orchestrator   (policy over a CaseExecutor)
//! ```
//!
//! The process runner lives in `roundtrip-runner` and implements
//! [`CaseExecutor`] by launching the external simulator.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod case;
pub mod catalog;
mod error;
pub mod matrix;
mod orchestrator;
pub mod state;

pub use case::{CaseEnv, PROTOCOL_KEY, TestCase};
pub use error::HarnessError;
pub use matrix::{PlannedCase, Selection, TestMatrix};
pub use orchestrator::{CaseExecutor, CaseFailure, Orchestrator, RunPolicy, RunSummary};
pub use state::{CaseOutcome, CaseState, Mismatch, ProcessFailure, Verification};
