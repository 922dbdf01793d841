//! Run orchestration.
//!
//! The orchestrator resolves a [`Selection`] against the matrix, hands each
//! planned case to a [`CaseExecutor`] in order and applies the failure
//! policy. It never touches files or processes itself, so it can be driven
//! by a scripted executor in tests and by the process runner in production.

use std::future::Future;

use crate::{
    case::TestCase,
    error::HarnessError,
    matrix::{Selection, TestMatrix},
    state::CaseOutcome,
};

/// Executes one case end to end.
pub trait CaseExecutor {
    /// Run `case` against `topology` and report its terminal outcome.
    ///
    /// `Err` means the harness itself failed (files, spawning) and aborts
    /// the whole run; protocol failures are reported through `CaseOutcome`.
    fn execute(
        &mut self,
        topology: &str,
        case: &TestCase,
    ) -> impl Future<Output = Result<CaseOutcome, HarnessError>> + Send;
}

/// What to do after a failed case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPolicy {
    /// Stop at the first failure.
    #[default]
    FailFast,
    /// Run every selected case and report all failures.
    KeepGoing,
}

/// A case that did not verify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseFailure {
    /// Topology the case ran under.
    pub topology: String,
    /// The failing case.
    pub case: TestCase,
    /// How it failed.
    pub outcome: CaseOutcome,
}

/// Aggregated run result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Cases handed to the executor.
    pub executed: usize,
    /// Cases that verified.
    pub passed: usize,
    /// Quarantined cases not run.
    pub skipped: usize,
    /// Failures in execution order.
    pub failures: Vec<CaseFailure>,
    /// Fail-fast policy ended the run at a failure.
    pub stopped_early: bool,
}

impl RunSummary {
    /// Returns true if no selected case failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Process exit status: 0 when every case passed, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.is_success())
    }
}

/// Drives a [`CaseExecutor`] over the matrix.
#[derive(Debug)]
pub struct Orchestrator<X> {
    executor: X,
    policy: RunPolicy,
}

impl<X: CaseExecutor> Orchestrator<X> {
    /// Create an orchestrator with the default fail-fast policy.
    pub fn new(executor: X) -> Self {
        Self { executor, policy: RunPolicy::default() }
    }

    /// Override the failure policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RunPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Access the executor.
    pub fn executor(&self) -> &X {
        &self.executor
    }

    /// Run the selected part of the matrix.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTopology` before running anything if the selection
    /// names a missing topology, and propagates executor errors immediately.
    pub async fn run(
        &mut self,
        matrix: &TestMatrix,
        selection: &Selection,
    ) -> Result<RunSummary, HarnessError> {
        let plan = matrix.plan(selection)?;
        let mut summary = RunSummary::default();

        for planned in plan {
            if summary.stopped_early {
                break;
            }

            if planned.skip {
                tracing::info!(
                    topology = planned.topology,
                    issue = planned.case.issue().unwrap_or_default(),
                    "Skipping quarantined case: {}",
                    planned.case
                );
                summary.skipped += 1;
                continue;
            }

            tracing::info!("Perform test: {} - {}", planned.topology, planned.case);
            let outcome = self.executor.execute(planned.topology, planned.case).await?;
            summary.executed += 1;

            if outcome.is_pass() {
                summary.passed += 1;
                continue;
            }

            tracing::error!(
                "Failed to perform test: {} - {}: {}",
                planned.topology,
                planned.case,
                outcome
            );
            summary.failures.push(CaseFailure {
                topology: planned.topology.to_string(),
                case: planned.case.clone(),
                outcome,
            });

            if self.policy == RunPolicy::FailFast {
                summary.stopped_early = true;
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::state::{Mismatch, ProcessFailure};

    /// Executor returning canned outcomes keyed by protocol.
    #[derive(Default)]
    struct ScriptedExecutor {
        outcomes: HashMap<String, CaseOutcome>,
        calls: Vec<(String, String)>,
    }

    impl ScriptedExecutor {
        fn failing(protocol: &str, outcome: CaseOutcome) -> Self {
            let mut outcomes = HashMap::new();
            outcomes.insert(protocol.to_string(), outcome);
            Self { outcomes, calls: Vec::new() }
        }
    }

    impl CaseExecutor for ScriptedExecutor {
        async fn execute(
            &mut self,
            topology: &str,
            case: &TestCase,
        ) -> Result<CaseOutcome, HarnessError> {
            self.calls.push((topology.to_string(), case.protocol().to_string()));
            Ok(self.outcomes.get(case.protocol()).copied().unwrap_or(CaseOutcome::Verified))
        }
    }

    fn matrix() -> TestMatrix {
        let cases = ["gack", "noack", "sliding_window"]
            .into_iter()
            .map(|p| TestCase::new(p).unwrap())
            .collect();
        TestMatrix::new()
            .with_topology("default", cases)
            .with_topology("double_rec", vec![TestCase::new("gack").unwrap()])
    }

    #[tokio::test]
    async fn all_pass_exits_zero() {
        let mut orchestrator = Orchestrator::new(ScriptedExecutor::default());
        let summary = orchestrator.run(&matrix(), &Selection::default()).await.unwrap();

        assert_eq!(summary.executed, 4);
        assert_eq!(summary.passed, 4);
        assert_eq!(summary.exit_code(), 0);
        let last = &orchestrator.executor().calls[3];
        assert_eq!((last.0.as_str(), last.1.as_str()), ("double_rec", "gack"));
    }

    #[tokio::test]
    async fn fail_fast_stops_after_first_failure() {
        let executor = ScriptedExecutor::failing(
            "noack",
            CaseOutcome::ProcessError(ProcessFailure::ExitCode(1)),
        );
        let mut orchestrator = Orchestrator::new(executor);
        let summary = orchestrator.run(&matrix(), &Selection::default()).await.unwrap();

        assert_eq!(summary.executed, 2);
        assert_eq!(orchestrator.executor().calls.len(), 2);
        assert!(summary.stopped_early);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].case.protocol(), "noack");
        assert_eq!(summary.exit_code(), 1);
    }

    #[tokio::test]
    async fn keep_going_runs_everything() {
        let mismatch = Mismatch { expected_len: 8, actual_len: 4, first_difference: 4 };
        let executor = ScriptedExecutor::failing("gack", CaseOutcome::MismatchError(mismatch));
        let mut orchestrator = Orchestrator::new(executor).with_policy(RunPolicy::KeepGoing);
        let summary = orchestrator.run(&matrix(), &Selection::default()).await.unwrap();

        assert_eq!(summary.executed, 4);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failures.len(), 2);
        assert!(!summary.stopped_early);
        assert_eq!(summary.exit_code(), 1);
    }

    #[tokio::test]
    async fn absent_protocol_filter_runs_nothing_and_succeeds() {
        let selection = Selection { protocol: Some("tetrys".to_string()), ..Default::default() };
        let mut orchestrator = Orchestrator::new(ScriptedExecutor::default());
        let summary = orchestrator.run(&matrix(), &selection).await.unwrap();

        assert_eq!(summary.executed, 0);
        assert!(summary.is_success());
        assert!(orchestrator.executor().calls.is_empty());
    }

    #[tokio::test]
    async fn unknown_topology_runs_nothing() {
        let selection = Selection { topology: Some("nowhere".to_string()), ..Default::default() };
        let mut orchestrator = Orchestrator::new(ScriptedExecutor::default());
        let result = orchestrator.run(&matrix(), &selection).await;

        assert!(matches!(result, Err(HarnessError::UnknownTopology { .. })));
        assert!(orchestrator.executor().calls.is_empty());
    }

    #[tokio::test]
    async fn quarantined_cases_are_counted_not_executed() {
        let quarantined = TestCase::new("tetrys").unwrap().known_issue("hangs");
        let matrix = TestMatrix::new()
            .with_topology("default", vec![TestCase::new("gack").unwrap(), quarantined]);
        let mut orchestrator = Orchestrator::new(ScriptedExecutor::default());
        let summary = orchestrator.run(&matrix, &Selection::default()).await.unwrap();

        assert_eq!(summary.executed, 1);
        assert_eq!(summary.skipped, 1);
        assert!(summary.is_success());
    }
}
