//! Harness error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a harness run.
///
/// Per-case failures (simulator exit status, output mismatch) are not errors:
/// they are reported as [`crate::CaseOutcome`] values so the orchestrator can
/// apply its failure policy.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Topology filter names a topology the matrix does not define.
    #[error("unknown topology: {name}")]
    UnknownTopology {
        /// The requested topology name.
        name: String,
    },

    /// A test case violates the catalog invariants.
    #[error("invalid test case: {reason}")]
    InvalidCase {
        /// Description of the violation.
        reason: String,
    },

    /// Payload parameters cannot describe a valid payload.
    #[error("invalid payload spec: {reason}")]
    InvalidPayload {
        /// Description of the problem.
        reason: String,
    },

    /// No simulator executable exists at any searched location.
    #[error("simulator binary not found (searched: {})", display_paths(.searched))]
    SimulatorNotFound {
        /// Every path that was tried, in search order.
        searched: Vec<PathBuf>,
    },

    /// Case state machine received an event its current state cannot accept.
    #[error("invalid case transition: {event} in state {state}")]
    InvalidTransition {
        /// Name of the state the case was in.
        state: &'static str,
        /// Name of the rejected event.
        event: &'static str,
    },

    /// I/O failure while preparing or executing the run.
    #[error("{context}: {source}")]
    Io {
        /// What the harness was doing.
        context: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl HarnessError {
    /// Wrap an I/O error with a description of the failed step.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    /// Returns true if this error happens before any case could run.
    ///
    /// Setup errors mean the environment is broken (missing payload, missing
    /// simulator), not that a protocol misbehaved.
    pub fn is_setup(&self) -> bool {
        match self {
            Self::InvalidPayload { .. }
            | Self::SimulatorNotFound { .. }
            | Self::InvalidCase { .. }
            | Self::UnknownTopology { .. } => true,

            Self::InvalidTransition { .. } | Self::Io { .. } => false,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}
