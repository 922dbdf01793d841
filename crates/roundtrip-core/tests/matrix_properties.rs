//! Property-based tests for environment synthesis and case selection.
//!
//! These tests verify:
//! - Environment synthesis is total and adds no keys beyond the case's own
//! - Protocol filtering selects exactly the matching cases, in order
//! - The built-in catalog satisfies the case invariants

use std::collections::BTreeSet;

use proptest::prelude::*;
use roundtrip_core::{PROTOCOL_KEY, Selection, TestCase, TestMatrix, catalog};

const PROTOCOLS: &[&str] = &["gack", "noack", "sliding_window", "chain", "tetrys"];

fn arb_case() -> impl Strategy<Value = TestCase> {
    (
        prop::sample::select(PROTOCOLS),
        prop::collection::btree_map("x_[a-z0-9_]{0,8}", "[a-z0-9]{1,6}", 0..5),
    )
        .prop_map(|(protocol, params)| {
            let case = TestCase::new(protocol).expect("non-empty protocol");
            params
                .iter()
                .fold(case, |case, (k, v)| case.param(k, v).expect("unique keys from btree_map"))
        })
}

fn arb_matrix() -> impl Strategy<Value = TestMatrix> {
    prop::collection::btree_map(
        "[a-z_]{1,12}",
        prop::collection::vec(arb_case(), 0..6),
        1..4,
    )
    .prop_map(|topologies| {
        topologies
            .into_iter()
            .fold(TestMatrix::new(), |matrix, (name, cases)| matrix.with_topology(name, cases))
    })
}

#[test]
fn prop_environment_has_exactly_case_derived_keys() {
    proptest!(|(case in arb_case())| {
        let env = case.to_environment();

        // PROPERTY: one variable per parameter plus PROTOCOL
        prop_assert_eq!(env.len(), case.parameters().count() + 1);
        prop_assert_eq!(env.get(PROTOCOL_KEY), Some(case.protocol()));

        for (key, value) in case.parameters() {
            prop_assert_eq!(env.get(&key.to_uppercase()), Some(value));
        }

        let keys: BTreeSet<_> = env.iter().map(|(k, _)| k.to_string()).collect();
        prop_assert_eq!(keys.len(), env.len(), "environment keys must be unique");
    });
}

#[test]
fn prop_protocol_filter_selects_exact_subset() {
    proptest!(|(
        matrix in arb_matrix(),
        protocol in prop::sample::select(PROTOCOLS),
    )| {
        let selection = Selection { protocol: Some(protocol.to_string()), ..Default::default() };
        let plan = matrix.plan(&selection).expect("no topology filter");

        let expected: Vec<(&str, &TestCase)> = matrix
            .topologies()
            .flat_map(|t| {
                matrix.cases(t).expect("listed topology").iter().map(move |c| (t, c))
            })
            .filter(|(_, c)| c.protocol() == protocol)
            .collect();
        let actual: Vec<(&str, &TestCase)> = plan.iter().map(|p| (p.topology, p.case)).collect();

        // PROPERTY: filter keeps exactly the matching cases in run order
        prop_assert_eq!(actual, expected);
    });
}

#[test]
fn prop_absent_protocol_selects_nothing() {
    proptest!(|(matrix in arb_matrix())| {
        let selection =
            Selection { protocol: Some("no_such_protocol".to_string()), ..Default::default() };
        prop_assert!(matrix.plan(&selection).expect("no topology filter").is_empty());
    });
}

#[test]
fn builtin_catalog_cases_have_unique_uppercased_keys() {
    let matrix = catalog::builtin().expect("catalog builds");

    for topology in matrix.topologies() {
        for case in matrix.cases(topology).expect("listed topology") {
            assert!(!case.protocol().is_empty());
            let env = case.to_environment();
            let keys: BTreeSet<_> = env.iter().map(|(k, _)| k).collect();
            assert_eq!(keys.len(), env.len(), "{topology}: {case} has colliding keys");
        }
    }
}

#[test]
fn sliding_window_feedback_case_environment() {
    let case = TestCase::new("sliding_window").and_then(|c| c.param("feedback", 0)).expect("valid");
    let env = case.to_environment();

    assert_eq!(env.to_string(), "PROTOCOL=sliding_window FEEDBACK=0");
}
