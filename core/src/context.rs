//! Output configuration threaded from the process entry point.
//!
//! An [`OutputContext`] replaces process-wide verbosity state: the entry
//! point creates one, a successful parse configures it through
//! [`OutputContext::apply`], and components that write output take it by
//! reference.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::level_filters::LevelFilter;

use crate::{ParseError, ParsedArgs};

/// Amount of diagnostic output written to stderr.
///
/// Accepts level names or their index `0`–`5`.
///
/// ```
/// use argrammar_core::Verbosity;
///
/// assert_eq!("warn".parse::<Verbosity>(), Ok(Verbosity::Warn));
/// assert_eq!("5".parse::<Verbosity>(), Ok(Verbosity::Debug));
/// assert!(Verbosity::Info > Verbosity::Note);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Verbosity {
    Silent,
    Error,
    Warn,
    #[default]
    Note,
    Info,
    Debug,
}

const LEVELS: [Verbosity; 6] = [
    Verbosity::Silent,
    Verbosity::Error,
    Verbosity::Warn,
    Verbosity::Note,
    Verbosity::Info,
    Verbosity::Debug,
];

impl Verbosity {
    pub fn as_str(self) -> &'static str {
        match self {
            Verbosity::Silent => "silent",
            Verbosity::Error => "error",
            Verbosity::Warn => "warn",
            Verbosity::Note => "note",
            Verbosity::Info => "info",
            Verbosity::Debug => "debug",
        }
    }

    /// Matching `tracing` filter; each level opens one more tier.
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Silent => LevelFilter::OFF,
            Verbosity::Error => LevelFilter::ERROR,
            Verbosity::Warn => LevelFilter::WARN,
            Verbosity::Note => LevelFilter::INFO,
            Verbosity::Info => LevelFilter::DEBUG,
            Verbosity::Debug => LevelFilter::TRACE,
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<usize>() {
            return LEVELS
                .get(index)
                .copied()
                .ok_or_else(|| format!("verbosity index out of range: {index}"));
        }
        LEVELS
            .iter()
            .copied()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| format!("unknown verbosity: {s}"))
    }
}

/// Verbosity stack, stdout switch, and output destination.
#[derive(Debug, Clone)]
pub struct OutputContext {
    verbosity: Vec<Verbosity>,
    stdout_enabled: bool,
    output_path: Option<PathBuf>,
}

impl Default for OutputContext {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputContext {
    /// Starts at [`Verbosity::Note`] with stdout enabled.
    pub fn new() -> Self {
        Self {
            verbosity: vec![Verbosity::default()],
            stdout_enabled: true,
            output_path: None,
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity.last().copied().unwrap_or_default()
    }

    pub fn push_verbosity(&mut self, level: Verbosity) {
        self.verbosity.push(level);
    }

    /// Restores the previous level. The base level is never popped.
    pub fn pop_verbosity(&mut self) -> Option<Verbosity> {
        if self.verbosity.len() > 1 {
            self.verbosity.pop()
        } else {
            None
        }
    }

    /// Whether messages at `level` should be written.
    pub fn meets(&self, level: Verbosity) -> bool {
        self.verbosity() >= level
    }

    pub fn stdout_enabled(&self) -> bool {
        self.stdout_enabled
    }

    pub fn set_stdout_enabled(&mut self, enabled: bool) {
        self.stdout_enabled = enabled;
    }

    /// Destination given by `-output-path`; `None` means stdout.
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Pushes `-vol-err`, applies `-quiet`, and records `-output-path`.
    ///
    /// # Errors
    ///
    /// [`ParseError::InvalidVerbosity`] if `-vol-err` names no level; the
    /// context is left unchanged.
    pub fn apply(&mut self, args: &ParsedArgs) -> Result<(), ParseError> {
        let level: Verbosity = args
            .vol_err()
            .parse()
            .map_err(|_| ParseError::InvalidVerbosity(args.vol_err().to_string()))?;
        self.push_verbosity(level);
        self.stdout_enabled = !args.quiet();
        self.output_path = args
            .is_explicit("output_path")
            .then(|| PathBuf::from(args.output_path()));
        Ok(())
    }
}
