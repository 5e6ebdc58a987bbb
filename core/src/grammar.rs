//! Grammar files: patterns and constraints declared in YAML or JSON.
//!
//! # Example YAML
//!
//! ```yaml
//! description: copy files somewhere
//! paths: false
//! patterns:
//!   - name: -count
//!     kind: int
//!     help: how many copies
//!   - name: -verbose
//!     arity: 0
//!   - name: sources
//!     arity: "+"
//!   - name: dest
//! required:
//!   - dest
//! at_most_one_of:
//!   - [-count, -verbose]
//! dependencies:
//!   - dependents: [-count]
//!     requirements: [dest]
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Arity, Constraints, DeclarationError, Kind, ParseConfig, Parser, Pattern, Value};

/// Errors from loading or saving a grammar.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("invalid grammar: {0}")]
    Declaration(#[from] DeclarationError),
}

/// Convenience alias for results with [`GrammarError`].
pub type Result<T> = std::result::Result<T, GrammarError>;

fn single() -> Arity {
    Arity::Exact(1)
}

/// One pattern as written in a grammar file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSpec {
    pub name: String,
    #[serde(default = "single")]
    pub arity: Arity,
    /// Defaults to `bool` for flags and `str` otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Kind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl From<PatternSpec> for Pattern {
    fn from(spec: PatternSpec) -> Self {
        let mut pattern = Pattern::new(spec.name).with_arity(spec.arity);
        if let Some(kind) = spec.kind {
            pattern = pattern.with_kind(kind);
        }
        if let Some(default) = spec.default {
            pattern = pattern.with_default(default);
        }
        match spec.help {
            Some(help) => pattern.with_help(&help),
            None if spec.arity.is_flag() => pattern.with_help("undocumented flag"),
            None => pattern,
        }
    }
}

impl From<&Pattern> for PatternSpec {
    fn from(pattern: &Pattern) -> Self {
        Self {
            name: pattern.name().to_string(),
            arity: pattern.arity(),
            kind: (!pattern.arity().is_flag()).then_some(pattern.kind()),
            default: pattern
                .has_explicit_default()
                .then(|| pattern.default_value()),
            help: Some(pattern.help().to_string()),
        }
    }
}

/// A complete grammar: description, caller patterns, and constraints.
///
/// # Examples
///
/// ```
/// use argrammar_core::Grammar;
///
/// let grammar = Grammar::from_yaml_str(
///     "description: demo\npatterns:\n  - name: -count\n    kind: int\n",
/// )
/// .unwrap();
/// let parser = grammar.into_parser("demo").unwrap();
/// let args = parser.try_parse(["-count", "7"]).unwrap();
/// assert_eq!(args.get::<i64>("count").unwrap(), 7);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grammar {
    #[serde(default)]
    pub description: String,
    /// Adds the standard `-exts`, `-hidden-paths` and `paths` patterns.
    #[serde(default)]
    pub paths: bool,
    #[serde(default)]
    pub patterns: Vec<PatternSpec>,
    #[serde(flatten)]
    pub constraints: Constraints,
}

impl Grammar {
    /// Loads a grammar, reading JSON for `.json` files and YAML otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](GrammarError::IoError) if the file cannot be
    /// read, or a JSON/YAML error if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let grammar = if is_json(path) {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        Ok(grammar)
    }

    /// Saves the grammar, as JSON for `.json` files and YAML otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](GrammarError::IoError) if the file cannot be
    /// written, or a JSON/YAML error if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(std::fs::File::create(path)?);
        if is_json(path) {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_yaml::to_writer(writer, self)?;
        }
        Ok(())
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Converts to a [`ParseConfig`] for the named program.
    pub fn into_config(self, program: &str) -> ParseConfig {
        ParseConfig::new(&self.description)
            .with_program(program)
            .with_paths(self.paths)
            .with_patterns(self.patterns.into_iter().map(Pattern::from))
            .with_constraints(self.constraints)
    }

    /// Builds a [`Parser`] directly.
    ///
    /// # Errors
    ///
    /// [`GrammarError::Declaration`] if the patterns do not form a valid
    /// table.
    pub fn into_parser(self, program: &str) -> Result<Parser> {
        Ok(Parser::new(self.into_config(program))?)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
