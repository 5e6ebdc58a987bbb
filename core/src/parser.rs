//! Word-by-word parsing against a [`PatternTable`].
//!
//! The parser makes a single left-to-right pass. Value words are buffered
//! until a flush point (a new key, the `-` word, or end of input); a flush
//! first lets the active key claim words per its arity, then drains what
//! remains into positional patterns in declaration order.
//!
//! # Example
//!
//! ```
//! use argrammar_core::{Kind, ParseConfig, Parser, Pattern, Value};
//!
//! let parser = Parser::new(
//!     ParseConfig::new("count things")
//!         .with_pattern(Pattern::new("-count").with_kind(Kind::Int))
//!         .with_pattern(Pattern::flag("-verbose")),
//! )
//! .unwrap();
//!
//! let args = parser.try_parse(["-count", "3", "-verbose"]).unwrap();
//! assert_eq!(args.get::<i64>("count").unwrap(), 3);
//! assert!(args.get::<bool>("verbose").unwrap());
//! assert_eq!(args.value("quiet"), Some(&Value::Bool(false)));
//! ```

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::result::exit_with_help;
use crate::table::{FORCE_FLUSH, FORCE_VALUE, HELP};
use crate::{
    Arity, Constraints, DeclarationError, Help, KEY_MARKER, OutputContext, ParseError, ParsedArgs,
    Pattern, PatternTable, Value,
};

/// Removed from the input; turns per-word tracing up to `debug`.
pub const DEBUG_WORD: &str = "__DEBUG_ARG_PARSING__";

/// Everything needed to build a [`Parser`].
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Printed under the help header.
    pub description: String,
    /// Program name shown in help; defaults to the running executable.
    pub program: String,
    /// Caller patterns, appended after the standard ones.
    pub patterns: Vec<Pattern>,
    pub constraints: Constraints,
    /// Adds `-exts`, `-hidden-paths` and positional `paths`.
    pub paths: bool,
    /// Whether [`Parser::run`] pushes `-vol-err` onto the output context.
    pub push_verbosity: bool,
}

impl ParseConfig {
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            program: process_name(),
            patterns: Vec::new(),
            constraints: Constraints::default(),
            paths: false,
            push_verbosity: true,
        }
    }

    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    pub fn with_patterns(mut self, patterns: impl IntoIterator<Item = Pattern>) -> Self {
        self.patterns.extend(patterns);
        self
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_paths(mut self, paths: bool) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_push_verbosity(mut self, push: bool) -> Self {
        self.push_verbosity = push;
        self
    }
}

fn process_name() -> String {
    std::env::args()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

/// A validated grammar, ready to parse any number of word sequences.
#[derive(Debug, Clone)]
pub struct Parser {
    table: Arc<PatternTable>,
    constraints: Constraints,
    program: String,
    push_verbosity: bool,
}

impl Parser {
    /// Builds the pattern table.
    ///
    /// # Errors
    ///
    /// Any [`DeclarationError`] from [`PatternTable::new`].
    pub fn new(config: ParseConfig) -> Result<Self, DeclarationError> {
        let table = PatternTable::new(&config.description, config.patterns, config.paths)?;
        Ok(Self {
            table: Arc::new(table),
            constraints: config.constraints,
            program: config.program,
            push_verbosity: config.push_verbosity,
        })
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    pub fn help(&self) -> Help {
        Help::new(Arc::clone(&self.table), &self.program)
    }

    /// Whether `words` carry an unescaped [`DEBUG_WORD`].
    pub fn debug_requested(&self, words: &[String]) -> bool {
        debug_requested(&self.table, words)
    }

    /// Parses words without ever exiting.
    ///
    /// A help request comes back as [`ParseError::HelpRequested`] holding
    /// the rendered help text.
    ///
    /// # Errors
    ///
    /// The first [`ParseError`] encountered; parsing stops there.
    pub fn try_parse<I, S>(&self, words: I) -> Result<ParsedArgs, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        let mut state = ParseState::new(&self.table);
        state.trace = debug_requested(&self.table, &words);

        for word in words {
            if let Flow::Help = state.feed(word)? {
                return Err(ParseError::HelpRequested(self.help().render()));
            }
        }
        state.finish()?;

        let given = state.result;
        self.constraints.validate(&self.table, &given)?;
        Ok(self.assemble(given))
    }

    /// Parses words; a help request prints help to stderr and exits with
    /// status 1.
    pub fn parse<I, S>(&self, words: I) -> Result<ParsedArgs, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.try_parse(words) {
            Err(ParseError::HelpRequested(text)) => exit_with_help(&text),
            other => other,
        }
    }

    /// Parses the process arguments, skipping the program name.
    pub fn parse_env(&self) -> Result<ParsedArgs, ParseError> {
        self.parse(std::env::args().skip(1))
    }

    /// Parses words and, unless disabled in the config, applies the
    /// output options (`-vol-err`, `-quiet`, `-output-path`) to `ctx`.
    pub fn run<I, S>(&self, ctx: &mut OutputContext, words: I) -> Result<ParsedArgs, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args = self.parse(words)?;
        if self.push_verbosity {
            ctx.apply(&args)?;
        }
        Ok(args)
    }

    fn assemble(&self, mut values: BTreeMap<String, Value>) -> ParsedArgs {
        let explicit: BTreeSet<String> = values.keys().cloned().collect();
        for p in self.table.bound_patterns() {
            values
                .entry(p.binding().to_string())
                .or_insert_with(|| p.default_value());
        }

        debug!(
            arguments = values.len(),
            explicit = explicit.len(),
            "parsed arguments"
        );
        for (binding, value) in &values {
            debug!("  {binding:24}: {value}");
        }

        ParsedArgs::new(values, explicit, self.help())
    }
}

/// Whether [`DEBUG_WORD`] appears as a control word, not as an escaped
/// value.
fn debug_requested(table: &PatternTable, words: &[String]) -> bool {
    let mut escaped = false;
    for word in words {
        if std::mem::take(&mut escaped) {
            continue;
        }
        if word == DEBUG_WORD {
            return true;
        }
        escaped = word.starts_with(KEY_MARKER)
            && word != FORCE_FLUSH
            && table
                .resolve_key(word)
                .is_ok_and(|p| p.name() == FORCE_VALUE);
    }
    false
}

enum Flow {
    Continue,
    Help,
}

/// Mutable state of one parse.
struct ParseState<'t> {
    table: &'t PatternTable,
    result: BTreeMap<String, Value>,
    active: Option<&'t Pattern>,
    pending: VecDeque<String>,
    /// Unclaimed positional patterns, last declared first.
    positional: Vec<&'t Pattern>,
    force_value: bool,
    trace: bool,
}

impl<'t> ParseState<'t> {
    fn new(table: &'t PatternTable) -> Self {
        Self {
            table,
            result: BTreeMap::new(),
            active: None,
            pending: VecDeque::new(),
            positional: table.positional().rev().collect(),
            force_value: false,
            trace: false,
        }
    }

    fn note(&self, message: fmt::Arguments<'_>) {
        if self.trace {
            debug!("{message}");
        } else {
            trace!("{message}");
        }
    }

    fn feed(&mut self, word: String) -> Result<Flow, ParseError> {
        if self.force_value {
            self.force_value = false;
            self.note(format_args!("force val: {word}"));
            self.pending.push_back(word);
            return Ok(Flow::Continue);
        }
        if word == DEBUG_WORD {
            return Ok(Flow::Continue);
        }
        // Checked before key matching: `-` prefixes every key.
        if word == FORCE_FLUSH {
            self.flush()?;
            return Ok(Flow::Continue);
        }
        if word == HELP {
            return Ok(Flow::Help);
        }
        if !word.starts_with(KEY_MARKER) {
            self.note(format_args!("val: {word}"));
            self.pending.push_back(word);
            return Ok(Flow::Continue);
        }

        self.note(format_args!("key: {word}"));
        let pattern = self.table.resolve_key(&word)?;
        let pending_same = self
            .active
            .is_some_and(|active| active.binding() == pattern.binding());
        if pending_same || self.result.contains_key(pattern.binding()) {
            return Err(ParseError::DuplicateKey {
                word,
                name: pattern.name().to_string(),
            });
        }
        if pattern.name() == FORCE_VALUE {
            self.force_value = true;
            return Ok(Flow::Continue);
        }
        self.flush()?;
        self.active = Some(pattern);
        Ok(Flow::Continue)
    }

    /// Final flush at end of input. A trailing `-arg` has no word to escape.
    fn finish(&mut self) -> Result<(), ParseError> {
        if self.force_value {
            return Err(ParseError::InsufficientArguments {
                name: FORCE_VALUE.to_string(),
                required: 1,
                found: 0,
            });
        }
        self.flush()
    }

    /// Commits the active key, then drains buffered words into positionals.
    fn flush(&mut self) -> Result<(), ParseError> {
        if let Some(pattern) = self.active.take() {
            self.note(format_args!("flush key: {}", pattern.name()));
            self.claim(pattern)?;
        }
        while !self.pending.is_empty() {
            let Some(pattern) = self.positional.pop() else {
                return Err(ParseError::ExcessArguments(self.pending.drain(..).collect()));
            };
            self.note(format_args!("flush positional: {}", pattern.name()));
            self.claim(pattern)?;
        }
        Ok(())
    }

    /// Takes words from the front of the buffer per the pattern's arity.
    fn claim(&mut self, pattern: &'t Pattern) -> Result<(), ParseError> {
        if self.result.contains_key(pattern.binding()) {
            return Err(ParseError::DuplicateKey {
                word: pattern.name().to_string(),
                name: pattern.name().to_string(),
            });
        }
        let available = self.pending.len();
        let insufficient = |required| ParseError::InsufficientArguments {
            name: pattern.name().to_string(),
            required,
            found: available,
        };
        let count = match pattern.arity() {
            Arity::Exact(0) => {
                let present = !pattern.default_value().as_bool().unwrap_or(false);
                self.result
                    .insert(pattern.binding().to_string(), Value::Bool(present));
                return Ok(());
            }
            Arity::Exact(n) if available < n => return Err(insufficient(n)),
            Arity::Exact(n) => n,
            Arity::Optional => available.min(1),
            Arity::Any => available,
            Arity::AtLeastOne if available == 0 => return Err(insufficient(1)),
            Arity::AtLeastOne => available,
        };

        let mut items = Vec::with_capacity(count);
        for word in self.pending.drain(..count) {
            match pattern.kind().convert(&word) {
                Some(value) => items.push(value),
                None => {
                    return Err(ParseError::ValueConversion {
                        word,
                        pattern: pattern.name().to_string(),
                        kind: pattern.kind(),
                    });
                }
            }
        }

        let value = if items.len() == 1 && pattern.arity().yields_scalar(1) {
            items.swap_remove(0)
        } else {
            Value::List(items)
        };
        self.result.insert(pattern.binding().to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Kind, presets};

    fn parser(patterns: Vec<Pattern>) -> Parser {
        Parser::new(
            ParseConfig::new("test")
                .with_program("test")
                .with_patterns(patterns),
        )
        .unwrap()
    }

    #[test]
    fn test_flag_presence_negates_default() {
        let p = parser(vec![
            Pattern::flag("-on"),
            Pattern::flag("-off").with_default(true),
        ]);
        let args = p.try_parse(["-on", "-off"]).unwrap();
        assert_eq!(args.get::<bool>("on").unwrap(), true);
        assert_eq!(args.get::<bool>("off").unwrap(), false);

        let args = p.try_parse(Vec::<String>::new()).unwrap();
        assert_eq!(args.get::<bool>("on").unwrap(), false);
        assert_eq!(args.get::<bool>("off").unwrap(), true);
    }

    #[test]
    fn test_exact_arity_requires_enough_words() {
        let p = parser(vec![Pattern::new("-pair").with_arity(Arity::Exact(2))]);
        assert_eq!(
            p.try_parse(["-pair", "a"]).unwrap_err(),
            ParseError::InsufficientArguments {
                name: "-pair".into(),
                required: 2,
                found: 1,
            }
        );
        let args = p.try_parse(["-pair", "a", "b"]).unwrap();
        assert_eq!(
            args.get::<Vec<String>>("pair").unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_at_least_one_with_no_words_fails() {
        let p = parser(vec![
            Pattern::new("-names").with_arity(Arity::AtLeastOne),
            Pattern::flag("-x"),
        ]);
        assert_eq!(
            p.try_parse(["-names", "-x"]).unwrap_err(),
            ParseError::InsufficientArguments {
                name: "-names".into(),
                required: 1,
                found: 0,
            }
        );
    }

    #[test]
    fn test_optional_claims_at_most_one() {
        let p = parser(vec![
            Pattern::new("-level").with_arity(Arity::Optional).with_kind(Kind::Int),
            Pattern::new("rest").with_arity(Arity::Any),
        ]);
        let args = p.try_parse(["-level", "2", "x"]).unwrap();
        assert_eq!(args.value("level"), Some(&Value::Int(2)));
        assert_eq!(args.value("rest"), Some(&Value::from(vec!["x"])));

        let args = p.try_parse(["-level"]).unwrap();
        assert_eq!(args.value("level"), Some(&Value::List(vec![])));
        assert!(args.is_explicit("level"));
    }

    #[test]
    fn test_positional_fill_order() {
        let p = parser(vec![
            Pattern::new("a"),
            Pattern::new("b").with_arity(Arity::Any),
        ]);
        let args = p.try_parse(["x", "y", "z"]).unwrap();
        assert_eq!(args.value("a"), Some(&Value::from("x")));
        assert_eq!(args.value("b"), Some(&Value::from(vec!["y", "z"])));
    }

    #[test]
    fn test_key_values_do_not_leak_into_positionals() {
        let p = parser(vec![
            Pattern::new("-n").with_kind(Kind::Int),
            Pattern::new("file"),
            Pattern::new("more").with_arity(Arity::Any),
        ]);
        let args = p.try_parse(["-n", "5", "in.txt", "a", "b"]).unwrap();
        assert_eq!(args.value("n"), Some(&Value::Int(5)));
        assert_eq!(args.value("file"), Some(&Value::from("in.txt")));
        assert_eq!(args.value("more"), Some(&Value::from(vec!["a", "b"])));
    }

    #[test]
    fn test_force_flush_closes_variadic_key() {
        let p = parser(vec![
            Pattern::new("-tags").with_arity(Arity::Any),
            Pattern::new("target"),
        ]);
        let args = p.try_parse(["-tags", "a", "b", "-", "out"]).unwrap();
        assert_eq!(args.value("tags"), Some(&Value::from(vec!["a", "b"])));
        assert_eq!(args.value("target"), Some(&Value::from("out")));

        let args = p.try_parse(["-tags", "a", "b", "out"]).unwrap();
        assert_eq!(args.value("tags"), Some(&Value::from(vec!["a", "b", "out"])));
        assert_eq!(args.value("target"), Some(&Value::None));
    }

    #[test]
    fn test_force_value_escape() {
        let p = parser(vec![Pattern::new("-offset").with_kind(Kind::Int)]);
        let args = p.try_parse(["-offset", "-arg", "-12"]).unwrap();
        assert_eq!(args.get::<i64>("offset").unwrap(), -12);

        let p = parser(vec![Pattern::new("word")]);
        let args = p.try_parse(["-arg", "-help"]).unwrap();
        assert_eq!(args.get::<String>("word").unwrap(), "-help");
    }

    #[test]
    fn test_force_value_prefix_also_escapes() {
        let p = parser(vec![Pattern::new("word")]);
        let args = p.try_parse(["-ar", "-quiet"]).unwrap();
        assert_eq!(args.get::<String>("word").unwrap(), "-quiet");
        assert!(!args.quiet());
    }

    #[test]
    fn test_excess_arguments() {
        let p = parser(vec![Pattern::new("only")]);
        assert_eq!(
            p.try_parse(["a", "b", "c"]).unwrap_err(),
            ParseError::ExcessArguments(vec!["b".into(), "c".into()])
        );
    }

    #[test]
    fn test_duplicate_key_via_prefix() {
        let p = parser(vec![Pattern::new("-count").with_kind(Kind::Int)]);
        assert_eq!(
            p.try_parse(["-count", "1", "-cou", "2"]).unwrap_err(),
            ParseError::DuplicateKey {
                word: "-cou".into(),
                name: "-count".into(),
            }
        );
    }

    #[test]
    fn test_adjacent_duplicate_keys_rejected() {
        let p = parser(vec![
            Pattern::new("-count").with_kind(Kind::Int),
            Pattern::flag("-v"),
        ]);
        assert_eq!(
            p.try_parse(["-count", "1", "-count", "2"]).unwrap_err(),
            ParseError::DuplicateKey {
                word: "-count".into(),
                name: "-count".into(),
            }
        );
        assert_eq!(
            p.try_parse(["-v", "-v"]).unwrap_err(),
            ParseError::DuplicateKey {
                word: "-v".into(),
                name: "-v".into(),
            }
        );
        assert!(matches!(
            p.try_parse(["-count", "1", "-v", "-count", "2"]),
            Err(ParseError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn test_trailing_force_value_needs_a_word() {
        let p = parser(vec![Pattern::new("word").with_arity(Arity::Any)]);
        assert_eq!(
            p.try_parse(["a", "-arg"]).unwrap_err(),
            ParseError::InsufficientArguments {
                name: "-arg".into(),
                required: 1,
                found: 0,
            }
        );
    }

    #[test]
    fn test_escaped_debug_word_is_a_value() {
        let p = parser(vec![Pattern::new("name")]);
        let words: Vec<String> = vec![FORCE_VALUE.into(), DEBUG_WORD.into()];
        assert!(!debug_requested(p.table(), &words));
        let args = p.try_parse(words).unwrap();
        assert_eq!(args.get::<String>("name").unwrap(), DEBUG_WORD);

        let words: Vec<String> = vec!["-ar".into(), "-arg".into(), DEBUG_WORD.into()];
        assert!(debug_requested(p.table(), &words));
    }

    #[test]
    fn test_value_conversion_error() {
        let p = parser(vec![Pattern::new("-count").with_kind(Kind::Int)]);
        assert_eq!(
            p.try_parse(["-count", "three"]).unwrap_err(),
            ParseError::ValueConversion {
                word: "three".into(),
                pattern: "-count".into(),
                kind: Kind::Int,
            }
        );
    }

    #[test]
    fn test_help_request_renders_help() {
        let p = parser(vec![Pattern::flag("-verbose").with_help("talk more")]);
        match p.try_parse(["-verbose", "-help", "-bogus"]) {
            Err(ParseError::HelpRequested(text)) => {
                assert!(text.starts_with("help: test\ntest\n"));
                assert!(text.contains("-verbose"));
                assert!(text.contains("talk more"));
            }
            other => panic!("expected help, got {other:?}"),
        }
    }

    #[test]
    fn test_debug_word_is_ignored() {
        let p = parser(vec![Pattern::new("name")]);
        let args = p.try_parse([DEBUG_WORD, "bob"]).unwrap();
        assert_eq!(args.get::<String>("name").unwrap(), "bob");
    }

    #[test]
    fn test_paths_mode_defaults() {
        let p = Parser::new(ParseConfig::new("test").with_paths(true)).unwrap();
        let args = p.try_parse(Vec::<String>::new()).unwrap();
        assert_eq!(
            args.get::<Vec<String>>("paths").unwrap(),
            vec!["<stdin>".to_string()]
        );
        assert!(!args.get::<bool>("hidden_paths").unwrap());

        let args = p.try_parse(["-exts", "rs", "toml", "-", "a.rs"]).unwrap();
        assert_eq!(args.value("exts"), Some(&Value::from(vec!["rs", "toml"])));
        assert_eq!(args.value("paths"), Some(&Value::from(vec!["a.rs"])));
    }

    #[test]
    fn test_standard_exclusion_applies() {
        let p = parser(vec![presets::flag_modify()]);
        let err = p
            .try_parse(["-output-path", "out.txt", "-modify"])
            .unwrap_err();
        assert!(matches!(err, ParseError::Constraint(_)));
    }
}
