//! Finished parse results and help rendering.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::io::Write as _;
use std::sync::Arc;

use regex::Regex;

use crate::table::{FORCE_FLUSH, FORCE_VALUE, STDOUT_PATH};
use crate::{AccessError, DEBUG_WORD, FromValue, KEY_MARKER, PatternTable, Value};

/// Width of the name column in help output.
const NAME_COLUMN: usize = 24;

/// Help text renderer bound to a full pattern table.
#[derive(Debug, Clone)]
pub struct Help {
    table: Arc<PatternTable>,
    program: String,
}

impl Help {
    pub(crate) fn new(table: Arc<PatternTable>, program: &str) -> Self {
        Self {
            table,
            program: program.to_string(),
        }
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Renders the header, description, and one line per pattern sorted
    /// by name.
    pub fn render(&self) -> String {
        self.render_with(&[])
    }

    /// Like [`render`](Help::render), followed by extra trailing lines.
    pub fn render_with(&self, lines: &[&str]) -> String {
        let mut out = format!("help: {}\n{}\n\n", self.program, self.table.description());
        for p in self.table.sorted() {
            let _ = writeln!(out, "{:<NAME_COLUMN$}  {}", p.name(), p.help());
        }
        if !lines.is_empty() {
            out.push('\n');
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }

    /// Writes help to stderr and exits with status 1.
    pub fn exit(&self, lines: &[&str]) -> ! {
        exit_with_help(&self.render_with(lines))
    }
}

pub(crate) fn exit_with_help(text: &str) -> ! {
    let _ = std::io::stdout().flush();
    let mut stderr = std::io::stderr().lock();
    let _ = stderr.write_all(text.as_bytes());
    let _ = stderr.flush();
    std::process::exit(1)
}

/// Immutable result of a successful parse.
///
/// Holds a value for every bound pattern (defaults included), records
/// which ones were given explicitly, and carries the [`Help`] renderer.
#[derive(Debug, Clone)]
pub struct ParsedArgs {
    values: BTreeMap<String, Value>,
    explicit: BTreeSet<String>,
    help: Help,
}

impl ParsedArgs {
    pub(crate) fn new(
        values: BTreeMap<String, Value>,
        explicit: BTreeSet<String>,
        help: Help,
    ) -> Self {
        Self {
            values,
            explicit,
            help,
        }
    }

    /// Raw value for a binding name.
    pub fn value(&self, binding: &str) -> Option<&Value> {
        self.values.get(binding)
    }

    /// Typed value for a binding name.
    ///
    /// # Errors
    ///
    /// [`AccessError::Unknown`] for an undeclared binding,
    /// [`AccessError::TypeMismatch`] if the value has another shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use argrammar_core::{Arity, Kind, ParseConfig, Parser, Pattern};
    ///
    /// let parser = Parser::new(
    ///     ParseConfig::new("sum").with_pattern(
    ///         Pattern::new("nums").with_arity(Arity::Any).with_kind(Kind::Int),
    ///     ),
    /// )
    /// .unwrap();
    /// let args = parser.try_parse(["1", "2", "3"]).unwrap();
    /// let nums: Vec<i64> = args.get("nums").unwrap();
    /// assert_eq!(nums.iter().sum::<i64>(), 6);
    /// assert!(args.get::<String>("nums").is_err());
    /// ```
    pub fn get<T: FromValue>(&self, binding: &str) -> Result<T, AccessError> {
        let value = self
            .values
            .get(binding)
            .ok_or_else(|| AccessError::Unknown(binding.to_string()))?;
        T::from_value(value).ok_or_else(|| AccessError::TypeMismatch {
            binding: binding.to_string(),
            expected: T::EXPECTED,
            found: value.type_name(),
        })
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Whether the binding was given on the command line rather than
    /// defaulted.
    pub fn is_explicit(&self, binding: &str) -> bool {
        self.explicit.contains(binding)
    }

    pub fn explicit(&self) -> impl Iterator<Item = &str> {
        self.explicit.iter().map(String::as_str)
    }

    pub fn help(&self) -> &Help {
        &self.help
    }

    /// `-output-path`, `<stdout>` unless given.
    pub fn output_path(&self) -> &str {
        self.value("output_path")
            .and_then(Value::as_str)
            .unwrap_or(STDOUT_PATH)
    }

    /// Raw `-vol-err` level name.
    pub fn vol_err(&self) -> &str {
        self.value("vol_err").and_then(Value::as_str).unwrap_or("note")
    }

    pub fn quiet(&self) -> bool {
        self.value("quiet")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Compiles `-pattern` as a regex, or `-string` as an escaped literal.
    ///
    /// # Errors
    ///
    /// [`AccessError::NoSearchPattern`] if neither was given,
    /// [`AccessError::InvalidSearchPattern`] if `-pattern` does not
    /// compile.
    pub fn search_regex(&self) -> Result<Regex, AccessError> {
        let source = if let Some(pattern) = self.value("pattern").and_then(Value::as_str) {
            pattern.to_string()
        } else if let Some(literal) = self.value("string").and_then(Value::as_str) {
            regex::escape(literal)
        } else {
            return Err(AccessError::NoSearchPattern);
        };
        Regex::new(&source).map_err(|e| AccessError::InvalidSearchPattern(e.to_string()))
    }

    /// Re-encodes the explicitly given arguments as words that parse back
    /// to the same result.
    ///
    /// Patterns are emitted in declaration order. Positional values are
    /// fenced by `-` so each lands in its own pattern. Value words starting
    /// with `-`, and the debug word itself, are preceded by `-arg`.
    pub fn to_words(&self) -> Vec<String> {
        let mut words = Vec::new();
        for p in self.help.table().bound_patterns() {
            if !self.is_explicit(p.binding()) {
                continue;
            }
            let Some(value) = self.values.get(p.binding()) else {
                continue;
            };
            if p.is_keyed() {
                words.push(p.name().to_string());
            } else {
                words.push(FORCE_FLUSH.to_string());
            }
            if !p.arity().is_flag() {
                for word in value.to_words() {
                    if word.starts_with(KEY_MARKER) || word == DEBUG_WORD {
                        words.push(FORCE_VALUE.to_string());
                    }
                    words.push(word);
                }
            }
            if !p.is_keyed() {
                words.push(FORCE_FLUSH.to_string());
            }
        }
        words
    }
}
