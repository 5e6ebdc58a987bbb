//! Pattern definitions: one recognized option each.
//!
//! A [`Pattern`] is either keyed (its name starts with [`KEY_MARKER`]) or
//! positional. Keyed patterns are matched by unique prefix; positional
//! patterns receive leftover value words in declaration order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Kind, Value};

/// Leading character that marks a keyed pattern.
pub const KEY_MARKER: char = '-';

/// How many value words a pattern claims.
///
/// Serialized the way grammar files spell it: a count, or one of `"?"`,
/// `"*"`, `"+"`.
///
/// # Examples
///
/// ```
/// use argrammar_core::Arity;
///
/// assert!(Arity::Exact(0).is_flag());
/// assert_eq!(Arity::AtLeastOne.to_string(), "+");
/// assert_eq!("?".parse::<Arity>(), Ok(Arity::Optional));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ArityRepr", into = "ArityRepr")]
pub enum Arity {
    /// Exactly `n` words. `Exact(0)` is a flag.
    Exact(usize),
    /// Zero or one word.
    Optional,
    /// Any number of words.
    Any,
    /// One or more words.
    AtLeastOne,
}

impl Arity {
    pub fn is_flag(self) -> bool {
        self == Arity::Exact(0)
    }

    /// Whether `claimed` words under this arity commit a scalar.
    pub(crate) fn yields_scalar(self, claimed: usize) -> bool {
        matches!((self, claimed), (Arity::Exact(1), _) | (Arity::Optional, 1))
    }

    /// Value a pattern holds when it is not given and declares no default.
    fn implicit_default(self) -> Value {
        match self {
            Arity::Exact(0) => Value::Bool(false),
            Arity::Exact(1) | Arity::Optional => Value::None,
            _ => Value::List(Vec::new()),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::Optional => f.write_str("?"),
            Arity::Any => f.write_str("*"),
            Arity::AtLeastOne => f.write_str("+"),
        }
    }
}

impl std::str::FromStr for Arity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "?" => Ok(Arity::Optional),
            "*" => Ok(Arity::Any),
            "+" => Ok(Arity::AtLeastOne),
            other => other
                .parse()
                .map(Arity::Exact)
                .map_err(|_| format!("invalid arity: {other:?} (expected a count, '?', '*' or '+')")),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ArityRepr {
    Count(usize),
    Spelled(String),
}

impl TryFrom<ArityRepr> for Arity {
    type Error = String;

    fn try_from(repr: ArityRepr) -> Result<Self, Self::Error> {
        match repr {
            ArityRepr::Count(n) => Ok(Arity::Exact(n)),
            ArityRepr::Spelled(s) => s.parse(),
        }
    }
}

impl From<Arity> for ArityRepr {
    fn from(arity: Arity) -> Self {
        match arity {
            Arity::Exact(n) => ArityRepr::Count(n),
            other => ArityRepr::Spelled(other.to_string()),
        }
    }
}

/// One recognized command-line option.
///
/// Built with [`Pattern::new`] or [`Pattern::flag`] and refined with the
/// `with_*` methods; validated when added to a
/// [`PatternTable`](crate::PatternTable).
///
/// # Examples
///
/// ```
/// use argrammar_core::{Arity, Kind, Pattern, Value};
///
/// let count = Pattern::new("-line-count")
///     .with_kind(Kind::Int)
///     .with_help("number of lines");
/// assert!(count.is_keyed());
/// assert_eq!(count.binding(), "line_count");
/// assert_eq!(count.default_value(), Value::None);
///
/// let files = Pattern::new("files").with_arity(Arity::Any);
/// assert!(!files.is_keyed());
/// assert_eq!(files.default_value(), Value::List(vec![]));
///
/// let verbose = Pattern::flag("-verbose");
/// assert_eq!(verbose.kind(), Kind::Bool);
/// assert_eq!(verbose.default_value(), Value::Bool(false));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    name: String,
    binding: String,
    arity: Arity,
    kind: Kind,
    default: Option<Value>,
    help: String,
    control: bool,
}

impl Pattern {
    /// Creates a single-valued string pattern.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            binding: binding_name(&name),
            name,
            arity: Arity::Exact(1),
            kind: Kind::Str,
            default: None,
            help: "undocumented".to_string(),
            control: false,
        }
    }

    /// Creates a flag: a keyed pattern with no value words.
    pub fn flag(name: impl Into<String>) -> Self {
        Self::new(name)
            .with_arity(Arity::Exact(0))
            .with_help("undocumented flag")
    }

    /// Built-in control word; never stored in a result.
    pub(crate) fn control(name: &str, binding: &str, help: &str) -> Self {
        Self {
            name: name.to_string(),
            binding: binding.to_string(),
            arity: Arity::Exact(0),
            kind: Kind::Bool,
            default: None,
            help: help.to_string(),
            control: true,
        }
    }

    /// Sets the arity. `Exact(0)` also forces [`Kind::Bool`].
    pub fn with_arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        if arity.is_flag() {
            self.kind = Kind::Bool;
        }
        self
    }

    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key of this pattern's value in the result map.
    pub fn binding(&self) -> &str {
        &self.binding
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn is_keyed(&self) -> bool {
        self.name.starts_with(KEY_MARKER)
    }

    /// Whether this is one of the built-in control words (`-`, `-help`,
    /// `-arg`).
    pub fn is_control(&self) -> bool {
        self.control
    }

    /// The declared default, or the arity's implicit one.
    pub fn default_value(&self) -> Value {
        self.default
            .clone()
            .unwrap_or_else(|| self.arity.implicit_default())
    }

    pub(crate) fn has_explicit_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Derives the result-map key for an option spelling.
///
/// Strips one leading [`KEY_MARKER`] and turns remaining dashes into
/// underscores.
///
/// ```
/// use argrammar_core::binding_name;
///
/// assert_eq!(binding_name("-output-path"), "output_path");
/// assert_eq!(binding_name("paths"), "paths");
/// ```
pub fn binding_name(name: &str) -> String {
    name.strip_prefix(KEY_MARKER)
        .unwrap_or(name)
        .replace(KEY_MARKER, "_")
}

/// Whether `s` is an ASCII identifier.
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
