//! Command-line word grammar engine.
//!
//! This crate turns an already word-split command line into a validated,
//! typed, named result set:
//!
//! - [`Pattern`]: one recognized option, keyed (`-name`) or positional,
//!   with an [`Arity`], a value [`Kind`], a default, and help text.
//! - [`PatternTable`]: the standard patterns plus the caller's, checked
//!   for collisions and split into keyed and positional sets.
//! - [`Parser`]: resolves keys by unique prefix, buffers value words, and
//!   commits them per arity at each flush point.
//! - [`Constraints`]: required, exclusive, grouped, and dependent options,
//!   checked after all words are consumed.
//! - [`ParsedArgs`]: the immutable result with typed accessors and a
//!   bound [`Help`] renderer.
//!
//! Grammars can also be loaded from YAML or JSON ([`Grammar`]), and output
//! options are applied to an explicit [`OutputContext`].
//!
//! # Example
//!
//! ```
//! use argrammar_core::*;
//!
//! let parser = Parser::new(
//!     ParseConfig::new("resize images")
//!         .with_program("resize")
//!         .with_pattern(Pattern::new("-width").with_kind(Kind::Int).with_help("target width"))
//!         .with_pattern(Pattern::flag("-keep-aspect"))
//!         .with_pattern(Pattern::new("images").with_arity(Arity::AtLeastOne))
//!         .with_constraints(Constraints::new().require("-width")),
//! )
//! .unwrap();
//!
//! let args = parser.try_parse(["-wid", "640", "-keep", "-", "a.png", "b.png"]).unwrap();
//! assert_eq!(args.get::<i64>("width").unwrap(), 640);
//! assert!(args.get::<bool>("keep_aspect").unwrap());
//! assert_eq!(args.get::<Vec<String>>("images").unwrap(), ["a.png", "b.png"]);
//!
//! assert!(matches!(
//!     parser.try_parse(["a.png"]),
//!     Err(ParseError::Constraint(ConstraintViolation::Required(_)))
//! ));
//! ```

mod constraints;
mod context;
mod error;
mod grammar;
mod parser;
mod pattern;
pub mod presets;
mod result;
mod table;
mod value;

pub use constraints::{Constraints, Dependency, STANDARD_AT_MOST_ONE};
pub use context::{OutputContext, Verbosity};
pub use error::{AccessError, ConstraintKind, ConstraintViolation, DeclarationError, ParseError};
pub use grammar::{Grammar, GrammarError, PatternSpec};
pub use parser::{DEBUG_WORD, ParseConfig, Parser};
pub use pattern::{Arity, KEY_MARKER, Pattern, binding_name};
pub use result::{Help, ParsedArgs};
pub use table::{FORCE_FLUSH, FORCE_VALUE, HELP, PatternTable, RESERVED_BINDINGS, STDOUT_PATH};
pub use value::{FromValue, Kind, Value};
