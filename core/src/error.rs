//! Error types for grammar declaration, parsing, and result access.
//!
//! Declaration errors are programming mistakes in the pattern list and are
//! reported before any word is read. Parse errors describe bad user input
//! and carry the offending words or pattern names.

use thiserror::Error;

use crate::Kind;

/// Longest rendering of leftover words in [`ParseError::ExcessArguments`].
const EXCESS_DISPLAY_WIDTH: usize = 64;

/// Errors raised while building a [`PatternTable`](crate::PatternTable).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    /// Two patterns share a name or a binding name.
    #[error("duplicate pattern name: {name}; binding name: {binding}")]
    DuplicatePattern {
        /// External spelling of the colliding pattern.
        name: String,
        /// Binding name of the colliding pattern.
        binding: String,
    },
    /// A caller pattern uses a binding name reserved by the result object.
    #[error("reserved binding name: {0}")]
    ReservedName(String),
    /// The binding derived from a pattern name is not an identifier.
    #[error("pattern {name} has invalid binding name: {binding:?}")]
    InvalidBindingName { name: String, binding: String },
    /// A zero-arity pattern with a non-boolean kind or default.
    #[error("flag pattern {0} must be boolean with a boolean default")]
    FlagKindMismatch(String),
}

/// Cross-option rule failures found after all words are consumed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintViolation {
    #[error("missing required option: {0}")]
    Required(String),
    #[error("requires exactly one of these options: {}", .0.join(" "))]
    ExactlyOneOf(Vec<String>),
    #[error("requires at least one of these options: {}", .0.join(" "))]
    AtLeastOneOf(Vec<String>),
    #[error("requires at most one of these options: {}", .0.join(" "))]
    AtMostOneOf(Vec<String>),
    #[error("requires all or none of these options: {}", .0.join(" "))]
    RequiredTogether(Vec<String>),
    #[error("{dependent} depends on: {}", .requirements.join(", "))]
    Dependency {
        dependent: String,
        requirements: Vec<String>,
    },
}

/// Discriminant of a [`ConstraintViolation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Required,
    ExactlyOneOf,
    AtLeastOneOf,
    AtMostOneOf,
    RequiredTogether,
    Dependency,
}

impl ConstraintViolation {
    /// Returns which kind of rule failed.
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::Required(_) => ConstraintKind::Required,
            Self::ExactlyOneOf(_) => ConstraintKind::ExactlyOneOf,
            Self::AtLeastOneOf(_) => ConstraintKind::AtLeastOneOf,
            Self::AtMostOneOf(_) => ConstraintKind::AtMostOneOf,
            Self::RequiredTogether(_) => ConstraintKind::RequiredTogether,
            Self::Dependency { .. } => ConstraintKind::Dependency,
        }
    }
}

/// Errors returned from a parse.
///
/// Every variant except [`HelpRequested`](ParseError::HelpRequested) and
/// [`Declaration`](ParseError::Declaration) describes bad user input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// No keyed pattern starts with the word.
    #[error("unrecognized key: {0}")]
    UnrecognizedKey(String),

    /// The word is a prefix of more than one keyed pattern.
    #[error("key is not unique: {word}; matches {}", .candidates.join(" and "))]
    AmbiguousKey {
        word: String,
        candidates: Vec<String>,
    },

    /// A key was supplied twice, possibly under different prefixes.
    #[error("duplicate key: {name}{}", prefix_note(.word, .name))]
    DuplicateKey { word: String, name: String },

    /// Fewer value words were buffered than the pattern's arity demands.
    #[error("key: {name}; expects {required} argument(s); found: {found}")]
    InsufficientArguments {
        name: String,
        required: usize,
        found: usize,
    },

    /// Value words remain after every positional pattern was filled.
    #[error("excess arguments: {}", ellipsize(&format!("{:?}", .0), EXCESS_DISPLAY_WIDTH))]
    ExcessArguments(Vec<String>),

    /// A value word could not be converted to the pattern's kind.
    #[error("could not convert argument {word:?} to {kind} for {pattern}")]
    ValueConversion {
        word: String,
        pattern: String,
        kind: Kind,
    },

    /// The `-vol-err` value is not a known verbosity level.
    #[error("invalid verbosity level: {0:?}")]
    InvalidVerbosity(String),

    #[error(transparent)]
    Constraint(#[from] ConstraintViolation),

    #[error(transparent)]
    Declaration(#[from] DeclarationError),

    /// The help key was given; carries the rendered help text.
    #[error("help requested")]
    HelpRequested(String),
}

/// Errors from typed access into a [`ParsedArgs`](crate::ParsedArgs).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("no such argument: {0}")]
    Unknown(String),
    #[error("argument {binding} holds {found}, not {expected}")]
    TypeMismatch {
        binding: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("no pattern to compile: neither -pattern nor -string was given")]
    NoSearchPattern,
    #[error("invalid search pattern: {0}")]
    InvalidSearchPattern(String),
}

fn prefix_note(word: &str, name: &str) -> String {
    if word == name {
        String::new()
    } else {
        format!(" ({word})")
    }
}

/// Truncates `text` to at most `width` characters, marking the cut.
pub(crate) fn ellipsize(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
