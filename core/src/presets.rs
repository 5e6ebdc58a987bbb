//! Ready-made patterns for options that many tools share.
//!
//! `arg_*` helpers build positional patterns, `key_*` helpers keyed ones,
//! and `flag_*` helpers flags. Each returns a plain [`Pattern`] that can
//! still be refined with the `with_*` builders.

use crate::{Arity, Pattern, Value};

pub fn arg_dirs() -> Pattern {
    Pattern::new("dirs")
        .with_arity(Arity::AtLeastOne)
        .with_help("directory paths")
}

pub fn arg_exts() -> Pattern {
    Pattern::new("exts")
        .with_arity(Arity::AtLeastOne)
        .with_help("file type extensions")
}

/// Positional file paths, defaulting to `<stdin>`.
pub fn arg_paths() -> Pattern {
    Pattern::new("paths")
        .with_arity(Arity::AtLeastOne)
        .with_default(Value::List(vec![Value::from("<stdin>")]))
        .with_help("file paths; defaults to \"<stdin>\"")
}

pub fn key_dirs() -> Pattern {
    Pattern::new("-dirs")
        .with_arity(Arity::AtLeastOne)
        .with_help("directory paths")
}

pub fn key_exts() -> Pattern {
    Pattern::new("-exts")
        .with_arity(Arity::AtLeastOne)
        .with_help("file type extensions")
}

pub fn key_paths() -> Pattern {
    Pattern::new("-paths")
        .with_arity(Arity::AtLeastOne)
        .with_help("file paths")
}

pub fn key_format() -> Pattern {
    Pattern::new("-format").with_help("format string")
}

/// Regular expression consumed by
/// [`ParsedArgs::search_regex`](crate::ParsedArgs::search_regex).
pub fn key_pattern() -> Pattern {
    Pattern::new("-pattern").with_help("regex pattern")
}

/// Literal search string, escaped by
/// [`ParsedArgs::search_regex`](crate::ParsedArgs::search_regex).
pub fn key_string() -> Pattern {
    Pattern::new("-string").with_help("search string")
}

pub fn key_replacement() -> Pattern {
    Pattern::new("-replacement").with_help("replacement string")
}

pub fn flag_hidden() -> Pattern {
    Pattern::flag("-hidden-paths").with_help("include hidden files")
}

pub fn flag_lines() -> Pattern {
    Pattern::flag("-lines").with_help("perform operation line by line instead of across whole text")
}

pub fn flag_modify() -> Pattern {
    Pattern::flag("-modify").with_help("modify files in place")
}

pub fn flag_no_backup() -> Pattern {
    Pattern::flag("-no-backup").with_help("do not backup files before mutation")
}

pub fn flag_quiet() -> Pattern {
    Pattern::flag("-quiet").with_help("omit writes to std out.")
}
