//! Built-in scenario catalog.
//!
//! Topology names must match the ones compiled into the simulator:
//! `default_noloss`, `default`, `single_rec` and `double_rec`.

use crate::{case::TestCase, error::HarnessError, matrix::TestMatrix};

const HANGS: &str = "hangs";

/// Build the catalog of every known scenario.
///
/// # Errors
///
/// Returns `InvalidCase` if a catalog entry breaks a case invariant.
pub fn builtin() -> Result<TestMatrix, HarnessError> {
    Ok(TestMatrix::new()
        .with_topology("default_noloss", default_noloss()?)
        .with_topology("default", default()?)
        .with_topology("single_rec", single_rec()?)
        .with_topology("double_rec", double_rec()?))
}

fn default_noloss() -> Result<Vec<TestCase>, HarnessError> {
    Ok(vec![
        TestCase::new("gack")?,
        TestCase::new("gsaw")?,
        TestCase::new("noack")?,
        TestCase::new("nocode")?,
        TestCase::new("pace")?,
        TestCase::new("pacemg")?,
        TestCase::new("sliding_window")?,
        TestCase::new("sliding_window")?.param("feedback", 0)?,
        TestCase::new("tetrys")?,
        TestCase::new("chain")?
            .param("stage0", "sliding_window")?
            .param("stage0_sequence", 1)?
            .param("stage1", "noack")?,
    ])
}

fn default() -> Result<Vec<TestCase>, HarnessError> {
    Ok(vec![
        TestCase::new("gack")?,
        TestCase::new("noack")?.param("redundancy", 20)?,
        TestCase::new("pace")?
            .param("pace_redundancy", 2)?
            .param("tail_redundancy", 20)?
            .known_issue(HANGS),
        TestCase::new("pacemg")?.known_issue(HANGS),
        TestCase::new("sliding_window")?
            .param("sequence", 1)?
            .param("feedback", 1)?
            .param("redundancy", 0)?,
        TestCase::new("sliding_window")?
            .param("sequence", 1)?
            .param("feedback", 0)?
            .param("redundancy", 10)?,
        TestCase::new("chain")?
            .param("stage0", "noack")?
            .param("stage0_redundancy", 10)?
            .param("stage1", "noack")?
            .param("stage1_redundancy", 10)?,
        TestCase::new("chain")?
            .param("stage0", "sliding_window")?
            .param("stage0_sequence", 1)?
            .param("stage0_redundancy", 0)?
            .param("stage1", "noack")?
            .param("stage1_redundancy", 5)?,
        TestCase::new("tetrys")?.known_issue(HANGS),
    ])
}

fn single_rec() -> Result<Vec<TestCase>, HarnessError> {
    Ok(vec![
        TestCase::new("gack")?,
        TestCase::new("noack")?.param("redundancy", 17)?.known_issue("simulator exits nonzero"),
        TestCase::new("nocode")?.known_issue("output differs from input"),
        TestCase::new("pace")?.known_issue(HANGS),
        TestCase::new("pacemg")?.known_issue(HANGS),
        TestCase::new("sliding_window")?.param("fb_timeout", "10ms")?.param("redundancy", 0)?,
        TestCase::new("sliding_window")?.param("feedback", 0)?.param("redundancy", 16)?,
    ])
}

fn double_rec() -> Result<Vec<TestCase>, HarnessError> {
    Ok(vec![
        TestCase::new("gack")?,
        TestCase::new("sliding_window")?.param("fb_timeout", "10ms")?.param("redundancy", 0)?,
        TestCase::new("sliding_window")?.param("feedback", 0)?.param("redundancy", 20)?,
    ])
}
