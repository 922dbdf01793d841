//! Simulator process execution.
//!
//! [`ProcessExecutor`] runs one case at a time:
//!
//! 1. Synthesize the environment (case variables + `SYMBOL_SIZE`, optional
//!    `SEED`) as an overlay on the inherited environment
//! 2. Spawn `<simulator> <topology>` with stdin from the payload and stdout
//!    into a truncated output file
//! 3. Wait for exit (bounded by the optional watchdog)
//! 4. Compare output against the payload
//!
//! Every case writes the same output file, so cases must not overlap. The
//! orchestrator awaits each case before starting the next.

use std::process::Stdio;

use roundtrip_core::{CaseEnv, CaseExecutor, CaseOutcome, CaseState, HarnessError, TestCase};
use tokio::process::{Child, Command};

use crate::{
    config::{RunnerConfig, SEED_KEY, SYMBOL_SIZE, SYMBOL_SIZE_KEY},
    verify::compare_files,
};

/// Runs cases by launching the external simulator.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    config: RunnerConfig,
}

impl ProcessExecutor {
    /// Create an executor for the given configuration.
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Runner configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Environment overlay for one case.
    ///
    /// Transport constants are layered last and win over case parameters of
    /// the same name.
    pub fn environment(&self, case: &TestCase) -> CaseEnv {
        let mut env = case.to_environment();
        env.set(SYMBOL_SIZE_KEY, SYMBOL_SIZE.to_string());
        if let Some(seed) = self.config.seed {
            env.set(SEED_KEY, seed.to_string());
        }
        env
    }

    /// Shell command line that reproduces a case by hand.
    pub fn reproduce_command(&self, topology: &str, env: &CaseEnv) -> String {
        format!(
            "{env} {} {topology} < {} > {}",
            self.config.simulator.display(),
            self.config.payload_path.display(),
            self.config.output_path.display()
        )
    }

    async fn launch(&self, topology: &str, env: &CaseEnv) -> Result<Child, HarnessError> {
        let payload = &self.config.payload_path;
        let output = &self.config.output_path;

        let stdin = tokio::fs::File::open(payload)
            .await
            .map_err(|e| HarnessError::io(format!("opening payload {}", payload.display()), e))?
            .into_std()
            .await;

        let stdout = tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(output)
            .await
            .map_err(|e| HarnessError::io(format!("creating output {}", output.display()), e))?
            .into_std()
            .await;

        Command::new(&self.config.simulator)
            .arg(topology)
            .envs(env.iter())
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                HarnessError::io(format!("spawning {}", self.config.simulator.display()), e)
            })
    }

    async fn wait(&self, child: &mut Child, state: CaseState) -> Result<CaseState, HarnessError> {
        let status = match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    tracing::warn!(?limit, "Simulator timed out, killing it");
                    if let Err(e) = child.kill().await {
                        tracing::error!("Failed to kill simulator: {}", e);
                    }
                    return state.timed_out(limit);
                },
            },
            None => child.wait().await,
        }
        .map_err(|e| HarnessError::io("waiting for simulator", e))?;

        tracing::debug!(code = ?status.code(), "Simulator exited");
        state.exited(status.code())
    }
}

impl CaseExecutor for ProcessExecutor {
    async fn execute(
        &mut self,
        topology: &str,
        case: &TestCase,
    ) -> Result<CaseOutcome, HarnessError> {
        let env = self.environment(case);
        tracing::info!("{}", self.reproduce_command(topology, &env));

        let mut child = self.launch(topology, &env).await?;
        let mut state = CaseState::Pending.launched()?;

        state = self.wait(&mut child, state).await?;

        if state == CaseState::Completed {
            let verification =
                compare_files(&self.config.payload_path, &self.config.output_path).await?;
            state = state.verified(verification)?;
        }

        state
            .outcome()
            .ok_or(HarnessError::InvalidTransition { state: state.name(), event: "finished" })
    }
}
