//! Test matrix: topology name to ordered case list.
//!
//! Topologies iterate in lexicographic order (`BTreeMap`), cases within a
//! topology in catalog order. Both orders are part of the run log contract.

use std::collections::BTreeMap;

use crate::{case::TestCase, error::HarnessError};

/// Catalog of every known scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestMatrix {
    topologies: BTreeMap<String, Vec<TestCase>>,
}

impl TestMatrix {
    /// Create an empty matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a topology with its cases, replacing any previous definition.
    #[must_use]
    pub fn with_topology(mut self, name: impl Into<String>, cases: Vec<TestCase>) -> Self {
        self.topologies.insert(name.into(), cases);
        self
    }

    /// Topology names in run order.
    pub fn topologies(&self) -> impl Iterator<Item = &str> {
        self.topologies.keys().map(String::as_str)
    }

    /// Cases for one topology.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTopology` if the name is not in the matrix.
    pub fn cases(&self, topology: &str) -> Result<&[TestCase], HarnessError> {
        self.topologies
            .get(topology)
            .map(Vec::as_slice)
            .ok_or_else(|| HarnessError::UnknownTopology { name: topology.to_string() })
    }

    /// Total number of cases across all topologies.
    pub fn len(&self) -> usize {
        self.topologies.values().map(Vec::len).sum()
    }

    /// Returns true if the matrix has no cases.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a selection into the ordered list of cases to execute.
    ///
    /// Cases filtered out by protocol are dropped silently; quarantined cases
    /// that match the filter are kept in the plan but marked as skipped.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTopology` if the selection names a missing topology.
    pub fn plan(&self, selection: &Selection) -> Result<Vec<PlannedCase<'_>>, HarnessError> {
        let topologies: Vec<(&str, &[TestCase])> = match &selection.topology {
            Some(name) => {
                let (key, cases) = self
                    .topologies
                    .get_key_value(name.as_str())
                    .ok_or_else(|| HarnessError::UnknownTopology { name: name.clone() })?;
                vec![(key.as_str(), cases.as_slice())]
            },
            None => self.topologies.iter().map(|(k, v)| (k.as_str(), v.as_slice())).collect(),
        };

        let mut plan = Vec::new();
        for (topology, cases) in topologies {
            for case in cases {
                if !selection.matches_protocol(case) {
                    continue;
                }

                let skip = case.issue().is_some() && !selection.include_known_issues;
                plan.push(PlannedCase { topology, case, skip });
            }
        }

        Ok(plan)
    }
}

/// Which part of the matrix to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Run only this topology (default: all).
    pub topology: Option<String>,
    /// Run only cases with exactly this protocol name (default: all).
    pub protocol: Option<String>,
    /// Also run quarantined cases.
    pub include_known_issues: bool,
}

impl Selection {
    fn matches_protocol(&self, case: &TestCase) -> bool {
        self.protocol.as_deref().is_none_or(|p| p == case.protocol())
    }
}

/// One entry of an execution plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedCase<'a> {
    /// Topology passed to the simulator.
    pub topology: &'a str,
    /// Case to run.
    pub case: &'a TestCase,
    /// Quarantined and not requested.
    pub skip: bool,
}
