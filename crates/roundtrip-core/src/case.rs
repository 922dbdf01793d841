//! Test cases and environment synthesis.
//!
//! A [`TestCase`] names a protocol and the parameters it should be run with.
//! The simulator reads its configuration from environment variables, so a
//! case is turned into a [`CaseEnv`] right before launch: `PROTOCOL` plus one
//! upper-cased variable per parameter.
//!
//! # Invariants
//!
//! - Protocol name is never empty
//! - Parameter keys are unique within a case
//! - Parameter order is insertion order, so logs and reproduction commands
//!   are stable across runs

use std::fmt;

use crate::error::HarnessError;

/// Environment key carrying the protocol name.
pub const PROTOCOL_KEY: &str = "PROTOCOL";

/// One (protocol, parameter set) combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    protocol: String,
    parameters: Vec<(String, String)>,
    known_issue: Option<String>,
}

impl TestCase {
    /// Create a case with no parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCase` if `protocol` is empty.
    pub fn new(protocol: impl Into<String>) -> Result<Self, HarnessError> {
        let protocol = protocol.into();
        if protocol.is_empty() {
            return Err(HarnessError::InvalidCase { reason: "empty protocol name".to_string() });
        }

        Ok(Self { protocol, parameters: Vec::new(), known_issue: None })
    }

    /// Add a parameter. Values are stored in their `Display` form, so both
    /// numbers and strings are accepted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCase` if the key is empty, names `PROTOCOL`, or
    /// collides with an existing key once upper-cased.
    pub fn param(mut self, key: &str, value: impl fmt::Display) -> Result<Self, HarnessError> {
        if key.is_empty() {
            return Err(HarnessError::InvalidCase {
                reason: format!("empty parameter name in {} case", self.protocol),
            });
        }
        let upper = key.to_uppercase();
        if upper == PROTOCOL_KEY || self.parameters.iter().any(|(k, _)| k.to_uppercase() == upper) {
            return Err(HarnessError::InvalidCase {
                reason: format!("duplicate parameter {key} in {} case", self.protocol),
            });
        }

        self.parameters.push((key.to_string(), value.to_string()));
        Ok(self)
    }

    /// Mark the case as quarantined. Quarantined cases stay in the catalog
    /// but are skipped unless explicitly requested.
    #[must_use]
    pub fn known_issue(mut self, note: impl Into<String>) -> Self {
        self.known_issue = Some(note.into());
        self
    }

    /// Protocol under test.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Parameters in insertion order.
    pub fn parameters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parameters.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Quarantine note, if any.
    pub fn issue(&self) -> Option<&str> {
        self.known_issue.as_deref()
    }

    /// Derive the environment variables that configure the simulator.
    ///
    /// Pure transform: no validation of parameter semantics happens here,
    /// the simulator owns that.
    pub fn to_environment(&self) -> CaseEnv {
        let mut vars = Vec::with_capacity(self.parameters.len() + 1);
        vars.push((PROTOCOL_KEY.to_string(), self.protocol.clone()));
        vars.extend(self.parameters.iter().map(|(k, v)| (k.to_uppercase(), v.clone())));

        CaseEnv { vars }
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.protocol)?;
        for (i, (k, v)) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {k}={v}")?;
        }
        if self.parameters.is_empty() { write!(f, "}}") } else { write!(f, " }}") }
    }
}

/// Ordered environment overlay for one simulator invocation.
///
/// Later `set` calls replace earlier values for the same key, so the runner
/// can layer transport constants over case-derived variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseEnv {
    vars: Vec<(String, String)>,
}

impl CaseEnv {
    /// Set `key` to `value`, replacing any previous value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.vars.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.vars.push((key, value)),
        }
    }

    /// Look up a variable.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Variables in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true if no variables are set.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl fmt::Display for CaseEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.vars.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}
