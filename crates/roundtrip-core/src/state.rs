//! Lifecycle of a single case.
//!
//! ```text
//! Pending ──launch──> Launched ──exit 0──> Completed ──equal──> Verified
//!                        │                     │
//!                        └─exit≠0/killed─>     └─differ─> MismatchError
//!                           ProcessError
//! ```
//!
//! The state machine is pure: the runner performs the I/O and reports each
//! step. Out-of-order events produce `InvalidTransition` instead of
//! silently corrupting the outcome.

use std::{fmt, time::Duration};

use crate::error::HarnessError;

/// Why the simulator did not signal success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessFailure {
    /// Process exited with a nonzero status code.
    ExitCode(i32),
    /// Process was terminated without an exit code (signal).
    Terminated,
    /// Watchdog expired and the process was killed.
    TimedOut(Duration),
}

impl fmt::Display for ProcessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExitCode(code) => write!(f, "simulator exited with status {code}"),
            Self::Terminated => write!(f, "simulator terminated by signal"),
            Self::TimedOut(limit) => write!(f, "simulator timed out after {limit:?}"),
        }
    }
}

/// How the output differed from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// Payload length in bytes.
    pub expected_len: u64,
    /// Output length in bytes.
    pub actual_len: u64,
    /// Offset of the first differing byte. When one file is a prefix of the
    /// other this is the shorter length.
    pub first_difference: u64,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "input and output differ at byte {} (expected {} bytes, got {})",
            self.first_difference, self.expected_len, self.actual_len
        )
    }
}

/// Result of comparing payload and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// Identical bytes and length.
    Identical,
    /// Any difference, truncation included.
    Differs(Mismatch),
}

/// Terminal result of one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseOutcome {
    /// Output matched the payload byte for byte.
    Verified,
    /// Simulator signalled failure.
    ProcessError(ProcessFailure),
    /// Simulator succeeded but the output differs.
    MismatchError(Mismatch),
}

impl CaseOutcome {
    /// Returns true for `Verified`.
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

impl fmt::Display for CaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verified => write!(f, "verified"),
            Self::ProcessError(failure) => write!(f, "{failure}"),
            Self::MismatchError(mismatch) => write!(f, "{mismatch}"),
        }
    }
}

/// Case lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseState {
    /// Not started yet.
    #[default]
    Pending,
    /// Simulator running.
    Launched,
    /// Simulator exited with status 0, output not yet compared.
    Completed,
    /// Terminal: simulator failed.
    ProcessError(ProcessFailure),
    /// Terminal: output differs.
    MismatchError(Mismatch),
    /// Terminal: round trip succeeded.
    Verified,
}

impl CaseState {
    /// Simulator process was started.
    pub fn launched(self) -> Result<Self, HarnessError> {
        match self {
            Self::Pending => Ok(Self::Launched),
            other => Err(other.reject("launched")),
        }
    }

    /// Simulator process exited. `None` means no exit code was available.
    pub fn exited(self, code: Option<i32>) -> Result<Self, HarnessError> {
        match (self, code) {
            (Self::Launched, Some(0)) => Ok(Self::Completed),
            (Self::Launched, Some(code)) => {
                Ok(Self::ProcessError(ProcessFailure::ExitCode(code)))
            },
            (Self::Launched, None) => Ok(Self::ProcessError(ProcessFailure::Terminated)),
            (other, _) => Err(other.reject("exited")),
        }
    }

    /// Watchdog expired while the simulator was running.
    pub fn timed_out(self, limit: Duration) -> Result<Self, HarnessError> {
        match self {
            Self::Launched => Ok(Self::ProcessError(ProcessFailure::TimedOut(limit))),
            other => Err(other.reject("timed_out")),
        }
    }

    /// Output was compared against the payload.
    pub fn verified(self, verification: Verification) -> Result<Self, HarnessError> {
        match (self, verification) {
            (Self::Completed, Verification::Identical) => Ok(Self::Verified),
            (Self::Completed, Verification::Differs(mismatch)) => {
                Ok(Self::MismatchError(mismatch))
            },
            (other, _) => Err(other.reject("verified")),
        }
    }

    /// Outcome if the state is terminal.
    pub fn outcome(self) -> Option<CaseOutcome> {
        match self {
            Self::Verified => Some(CaseOutcome::Verified),
            Self::ProcessError(failure) => Some(CaseOutcome::ProcessError(failure)),
            Self::MismatchError(mismatch) => Some(CaseOutcome::MismatchError(mismatch)),
            Self::Pending | Self::Launched | Self::Completed => None,
        }
    }

    /// State name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Launched => "Launched",
            Self::Completed => "Completed",
            Self::ProcessError(_) => "ProcessError",
            Self::MismatchError(_) => "MismatchError",
            Self::Verified => "Verified",
        }
    }

    fn reject(self, event: &'static str) -> HarnessError {
        HarnessError::InvalidTransition { state: self.name(), event }
    }
}
