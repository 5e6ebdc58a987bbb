//! The full set of patterns for one invocation.
//!
//! A [`PatternTable`] always starts with the control words (`-`, `-help`,
//! `-arg`) and the standard options (`-output-path`, `-vol-err`,
//! `-quiet`), optionally followed by the paths-mode patterns, then the
//! caller's patterns in declaration order.

use std::collections::HashSet;

use crate::pattern::is_identifier;
use crate::{DeclarationError, ParseError, Pattern, Value, binding_name, presets};

/// Flushes the active key and drains buffered values into positionals.
pub const FORCE_FLUSH: &str = "-";
/// Requests help and exits.
pub const HELP: &str = "-help";
/// Treats the following word as a value even if it looks like a key.
pub const FORCE_VALUE: &str = "-arg";

/// Binding names that caller patterns may not claim.
pub const RESERVED_BINDINGS: &[&str] = &["args", "help", "all_dirs", "all_paths", "search_re"];

/// Default of `-output-path`.
pub const STDOUT_PATH: &str = "<stdout>";

/// Ordered, validated pattern collection.
///
/// # Examples
///
/// ```
/// use argrammar_core::{Pattern, PatternTable};
///
/// let table = PatternTable::new(
///     "count things",
///     vec![Pattern::new("-count"), Pattern::flag("-verbose")],
///     false,
/// )
/// .unwrap();
///
/// assert_eq!(table.resolve_key("-cou").unwrap().name(), "-count");
/// assert!(table.find("-output-path").is_some());
///
/// // Redeclaring a standard pattern is rejected.
/// assert!(PatternTable::new("", vec![Pattern::flag("-quiet")], false).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PatternTable {
    description: String,
    patterns: Vec<Pattern>,
    positional: Vec<usize>,
    keyed: Vec<usize>,
}

impl PatternTable {
    /// Builds the table, validating every pattern.
    ///
    /// # Errors
    ///
    /// Returns a [`DeclarationError`] if two patterns collide on name or
    /// binding, a caller pattern uses a reserved or non-identifier binding,
    /// or a flag is not boolean.
    pub fn new(
        description: &str,
        patterns: Vec<Pattern>,
        paths: bool,
    ) -> Result<Self, DeclarationError> {
        let mut all = control_patterns();
        all.extend(standard_patterns());
        if paths {
            all.extend([presets::key_exts(), presets::flag_hidden(), presets::arg_paths()]);
        }
        let builtin = all.len();
        all.extend(patterns);

        let mut names = HashSet::new();
        let mut bindings = HashSet::new();
        for (index, p) in all.iter().enumerate() {
            if !names.insert(p.name()) || !bindings.insert(p.binding()) {
                return Err(DeclarationError::DuplicatePattern {
                    name: p.name().to_string(),
                    binding: p.binding().to_string(),
                });
            }
            if p.is_control() {
                continue;
            }
            if index >= builtin && RESERVED_BINDINGS.contains(&p.binding()) {
                return Err(DeclarationError::ReservedName(p.binding().to_string()));
            }
            if !is_identifier(p.binding()) {
                return Err(DeclarationError::InvalidBindingName {
                    name: p.name().to_string(),
                    binding: p.binding().to_string(),
                });
            }
            if p.arity().is_flag() && p.default_value().as_bool().is_none() {
                return Err(DeclarationError::FlagKindMismatch(p.name().to_string()));
            }
        }

        let mut positional = Vec::new();
        let mut keyed = Vec::new();
        for (index, p) in all.iter().enumerate() {
            if p.is_keyed() {
                // `-` and `-help` are intercepted before prefix matching.
                if p.name() != FORCE_FLUSH && p.name() != HELP {
                    keyed.push(index);
                }
            } else {
                positional.push(index);
            }
        }

        Ok(Self {
            description: description.to_string(),
            patterns: all,
            positional,
            keyed,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// All patterns in declaration order, control words included.
    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// Patterns whose values appear in a parse result.
    pub fn bound_patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter().filter(|p| !p.is_control())
    }

    /// Positional patterns in declaration order.
    pub fn positional(&self) -> impl DoubleEndedIterator<Item = &Pattern> {
        self.positional.iter().map(|&i| &self.patterns[i])
    }

    /// Keyed patterns eligible for prefix matching.
    pub fn keyed(&self) -> impl Iterator<Item = &Pattern> {
        self.keyed.iter().map(|&i| &self.patterns[i])
    }

    /// Patterns sorted by name, as help lists them.
    pub fn sorted(&self) -> Vec<&Pattern> {
        let mut sorted: Vec<&Pattern> = self.patterns.iter().collect();
        sorted.sort_by(|a, b| a.name().cmp(b.name()));
        sorted
    }

    /// Looks a pattern up by its exact name.
    pub fn find(&self, name: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.name() == name)
    }

    /// Result-map key for an option spelling, declared or not.
    pub fn binding_for(&self, name: &str) -> String {
        self.find(name)
            .map(|p| p.binding().to_string())
            .unwrap_or_else(|| binding_name(name))
    }

    /// Resolves a key word by unique prefix.
    ///
    /// A word spelling a declared name in full selects that pattern even
    /// when it also prefixes longer names.
    ///
    /// # Errors
    ///
    /// [`ParseError::UnrecognizedKey`] if nothing matches,
    /// [`ParseError::AmbiguousKey`] if more than one pattern does.
    pub fn resolve_key(&self, word: &str) -> Result<&Pattern, ParseError> {
        if let Some(exact) = self.keyed().find(|p| p.name() == word) {
            return Ok(exact);
        }
        let mut matches = self.keyed().filter(|p| p.name().starts_with(word));
        let Some(first) = matches.next() else {
            return Err(ParseError::UnrecognizedKey(word.to_string()));
        };
        let rest: Vec<&Pattern> = matches.collect();
        if rest.is_empty() {
            return Ok(first);
        }
        Err(ParseError::AmbiguousKey {
            word: word.to_string(),
            candidates: std::iter::once(first)
                .chain(rest)
                .map(|p| p.name().to_string())
                .collect(),
        })
    }
}

fn control_patterns() -> Vec<Pattern> {
    vec![
        Pattern::control(FORCE_FLUSH, "<dash>", "terminate an argument list."),
        Pattern::control(HELP, "help", "print help message and exit."),
        Pattern::control(
            FORCE_VALUE,
            "arg",
            "treat the following argument as a value, even if it begins with a dash.",
        ),
    ]
}

fn standard_patterns() -> Vec<Pattern> {
    vec![
        Pattern::new("-output-path")
            .with_default(Value::from(STDOUT_PATH))
            .with_help("output path; defaults to \"<stdout>\"."),
        Pattern::new("-vol-err").with_default("note").with_help(
            "level of error reporting to std error (0-5: silent, error, warn, note, info, debug).",
        ),
        presets::flag_quiet(),
    ]
}
