//! Round-trip harness binary.
//!
//! # Usage
//!
//! ```bash
//! # Run every known topology and protocol
//! roundtrip
//!
//! # Only sliding_window cases on the double_rec topology, ASCII payload
//! roundtrip --topology double_rec --protocol sliding_window --ascii
//!
//! # Show the catalog
//! roundtrip --list
//! ```
//!
//! Exit status is 0 when every selected case verified and 1 otherwise.

use std::{io::Write, path::PathBuf, process::ExitCode, time::Duration};

use clap::Parser;
use roundtrip_core::{
    HarnessError, Orchestrator, RunPolicy, RunSummary, Selection, TestMatrix, catalog,
};
use roundtrip_runner::{
    PayloadFormat, PayloadSpec, ProcessExecutor, RunnerConfig, ensure_payload, locate_simulator,
    payload,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Round-trip verification harness
#[derive(Parser, Debug)]
#[command(name = "roundtrip")]
#[command(about = "Run the protocol simulator with different parameters and protocols")]
#[command(version)]
struct Args {
    /// Only run cases for this protocol (default: all)
    #[arg(long)]
    protocol: Option<String>,

    /// Only run this topology (default: all)
    #[arg(long)]
    topology: Option<String>,

    /// Generate an ASCII payload instead of raw bytes
    #[arg(long)]
    ascii: bool,

    /// Print the catalog and exit
    #[arg(long)]
    list: bool,

    /// Keep running after a failed case and report all failures
    #[arg(long)]
    keep_going: bool,

    /// Also run cases quarantined as known issues
    #[arg(long)]
    include_known_issues: bool,

    /// Path to the simulator (default: ../bin/simulator, then bin/simulator)
    #[arg(long)]
    simulator: Option<PathBuf>,

    /// Kill a simulator run after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Seed passed to the simulator as SEED
    #[arg(long)]
    seed: Option<u64>,

    /// Seed for payload generation (default: OS entropy)
    #[arg(long)]
    data_seed: Option<u64>,

    /// Number of packets in the payload
    #[arg(long, default_value_t = payload::DEFAULT_PACKET_COUNT)]
    packets: u64,

    /// Bytes per packet
    #[arg(long, default_value_t = payload::DEFAULT_PACKET_SIZE)]
    packet_size: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let result = tokio::select! {
        result = run(args) => result,
        signal = shutdown_signal() => {
            // Dropping the run future drops the child, which kills it.
            tracing::error!("Received {}, stopping", signal);
            return ExitCode::FAILURE;
        },
    };

    ExitCode::from(exit_status(&result))
}

/// Resolves on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() -> &'static str {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            },
            Err(e) => {
                tracing::warn!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => "SIGINT",
        () = terminate => "SIGTERM",
    }
}

fn exit_status(result: &Result<RunSummary, HarnessError>) -> u8 {
    match result {
        Ok(summary) => summary.exit_code(),
        Err(e) if e.is_setup() => {
            tracing::error!("Setup failed, no case was run: {}", e);
            1
        },
        Err(e) => {
            tracing::error!("{}", e);
            1
        },
    }
}

async fn run(args: Args) -> Result<RunSummary, HarnessError> {
    let matrix = catalog::builtin()?;

    if args.list {
        list(&matrix, &mut std::io::stdout().lock())?;
        return Ok(RunSummary::default());
    }

    let selection = selection(&args);
    matrix.plan(&selection)?;

    let cwd = std::env::current_dir()
        .map_err(|e| HarnessError::io("reading working directory", e))?;
    let simulator = locate_simulator(args.simulator.as_deref(), &cwd)?;

    let mut config = RunnerConfig::new(simulator);
    config.timeout = args.timeout_secs.map(Duration::from_secs);
    config.seed = args.seed;

    let spec = payload_spec(&args);
    let payload_path = config.payload_path.clone();
    tokio::task::spawn_blocking(move || ensure_payload(&payload_path, &spec))
        .await
        .map_err(|e| HarnessError::io("generating payload", std::io::Error::other(e)))??;

    let mut orchestrator =
        Orchestrator::new(ProcessExecutor::new(config)).with_policy(policy(&args));
    let summary = orchestrator.run(&matrix, &selection).await?;

    report(&summary);
    Ok(summary)
}

fn selection(args: &Args) -> Selection {
    Selection {
        topology: args.topology.clone(),
        protocol: args.protocol.clone(),
        include_known_issues: args.include_known_issues,
    }
}

fn policy(args: &Args) -> RunPolicy {
    if args.keep_going { RunPolicy::KeepGoing } else { RunPolicy::FailFast }
}

fn payload_spec(args: &Args) -> PayloadSpec {
    PayloadSpec {
        packet_count: args.packets,
        packet_size: args.packet_size,
        format: if args.ascii { PayloadFormat::Ascii } else { PayloadFormat::Binary },
        seed: args.data_seed,
    }
}

fn list(matrix: &TestMatrix, out: &mut impl Write) -> Result<(), HarnessError> {
    let write_err = |e: std::io::Error| HarnessError::io("writing catalog", e);

    for topology in matrix.topologies() {
        writeln!(out, "{topology}").map_err(write_err)?;
        for case in matrix.cases(topology)? {
            let line = match case.issue() {
                Some(issue) => writeln!(out, "  {case}  [known issue: {issue}]"),
                None => writeln!(out, "  {case}"),
            };
            line.map_err(write_err)?;
        }
    }

    Ok(())
}

fn report(summary: &RunSummary) {
    tracing::info!(
        executed = summary.executed,
        passed = summary.passed,
        skipped = summary.skipped,
        failed = summary.failures.len(),
        "Run finished"
    );

    for failure in &summary.failures {
        tracing::error!("FAILED {} - {}: {}", failure.topology, failure.case, failure.outcome);
    }
}
