//! Cross-option rules checked after every word is consumed.
//!
//! Options are named by their command-line spelling (`-output-path`,
//! `paths`) and looked up in the result by binding name. Names the table
//! does not declare are simply absent.
//!
//! Rules are checked in a fixed order and the first failure is returned:
//! required, exactly-one-of, at-least-one-of, at-most-one-of (built-in
//! groups first), required-together, dependencies.
//!
//! # Examples
//!
//! ```
//! use argrammar_core::{Constraints, ConstraintKind, Parser, ParseConfig, ParseError, Pattern};
//!
//! let config = ParseConfig::new("demo")
//!     .with_patterns([Pattern::flag("-a"), Pattern::flag("-b")])
//!     .with_constraints(Constraints::new().at_most_one_of(["-a", "-b"]));
//! let parser = Parser::new(config).unwrap();
//!
//! assert!(parser.try_parse(["-a"]).is_ok());
//! match parser.try_parse(["-a", "-b"]) {
//!     Err(ParseError::Constraint(v)) => assert_eq!(v.kind(), ConstraintKind::AtMostOneOf),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ConstraintViolation, PatternTable, Value};

/// Mutually exclusive groups that every table enforces.
pub const STANDARD_AT_MOST_ONE: &[&[&str]] = &[
    &["-output-path", "-modify"],
    &["-pattern", "-string"],
    &["-format", "-replacement"],
];

/// If any dependent is present, all requirements must be too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub dependents: Vec<String>,
    pub requirements: Vec<String>,
}

/// Caller-declared option rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    pub required: Vec<String>,
    pub exactly_one_of: Vec<Vec<String>>,
    pub at_least_one_of: Vec<Vec<String>>,
    pub at_most_one_of: Vec<Vec<String>>,
    pub required_together: Vec<Vec<String>>,
    pub dependencies: Vec<Dependency>,
}

fn owned<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    pub fn exactly_one_of<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exactly_one_of.push(owned(names));
        self
    }

    pub fn at_least_one_of<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.at_least_one_of.push(owned(names));
        self
    }

    pub fn at_most_one_of<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.at_most_one_of.push(owned(names));
        self
    }

    pub fn required_together<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_together.push(owned(names));
        self
    }

    pub fn depends<D, R, S, T>(mut self, dependents: D, requirements: R) -> Self
    where
        D: IntoIterator<Item = S>,
        R: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        self.dependencies.push(Dependency {
            dependents: owned(dependents),
            requirements: owned(requirements),
        });
        self
    }

    /// Checks the rules against explicitly supplied values.
    ///
    /// `result` must hold only the options given on the command line;
    /// defaults are filled in afterwards.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConstraintViolation`] in rule order.
    pub fn validate(
        &self,
        table: &PatternTable,
        result: &BTreeMap<String, Value>,
    ) -> Result<(), ConstraintViolation> {
        let present = |name: &str| result.contains_key(&table.binding_for(name));
        let count = |names: &[String]| names.iter().filter(|n| present(n.as_str())).count();

        for name in &self.required {
            if !present(name.as_str()) {
                return Err(ConstraintViolation::Required(name.clone()));
            }
        }
        for names in &self.exactly_one_of {
            if count(names.as_slice()) != 1 {
                return Err(ConstraintViolation::ExactlyOneOf(names.clone()));
            }
        }
        for names in &self.at_least_one_of {
            if count(names.as_slice()) == 0 {
                return Err(ConstraintViolation::AtLeastOneOf(names.clone()));
            }
        }
        let standard = STANDARD_AT_MOST_ONE
            .iter()
            .map(|group| owned(group.iter().copied()));
        for names in standard.chain(self.at_most_one_of.iter().cloned()) {
            if count(names.as_slice()) > 1 {
                return Err(ConstraintViolation::AtMostOneOf(names));
            }
        }
        for names in &self.required_together {
            let c = count(names.as_slice());
            if c != 0 && c != names.len() {
                return Err(ConstraintViolation::RequiredTogether(names.clone()));
            }
        }
        for dep in &self.dependencies {
            for dependent in dep.dependents.iter().filter(|d| present(d.as_str())) {
                if !dep.requirements.iter().all(|r| present(r.as_str())) {
                    return Err(ConstraintViolation::Dependency {
                        dependent: dependent.clone(),
                        requirements: dep.requirements.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
