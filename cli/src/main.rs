use std::fs;
use std::path::{Path, PathBuf};

use argrammar_core::{Grammar, OutputContext, ParsedArgs, Parser as WordParser, STDOUT_PATH};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "argrammar")]
#[command(about = "Parse command-line words against a grammar file")]
#[command(version)]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse words and print the resulting argument map.
    Parse(ParseArgs),
    /// Print the help text a grammar produces.
    Help(GrammarArgs),
    /// Check that a grammar declares a valid pattern table.
    Check(GrammarArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Grammar file (.json, otherwise YAML).
    #[arg(long)]
    grammar: PathBuf,
    /// Output format for the argument map.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Program name shown in help (default: grammar file stem).
    #[arg(long)]
    program: Option<String>,
    /// Words to parse, given after `--`.
    #[arg(last = true, allow_hyphen_values = true)]
    words: Vec<String>,
}

#[derive(Debug, Args)]
struct GrammarArgs {
    /// Grammar file (.json, otherwise YAML).
    #[arg(long)]
    grammar: PathBuf,
    /// Program name shown in help (default: grammar file stem).
    #[arg(long)]
    program: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Help(args) => run_help(args),
        Command::Check(args) => run_check(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let parser = load_parser(&args.grammar, args.program.as_deref())?;
    let initial = if parser.debug_requested(&args.words) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let reload = init_tracing(initial);

    let mut ctx = OutputContext::new();
    let parsed = parser
        .run(&mut ctx, args.words)
        .map_err(|e| e.to_string())?;

    if let Some(handle) = reload {
        handle
            .reload(ctx.verbosity().level_filter())
            .map_err(|e| format!("Failed to set log level: {e}"))?;
    }

    let output = format_values(&parsed, args.format)?;
    match ctx.output_path() {
        Some(path) if path != Path::new(STDOUT_PATH) => {
            fs::write(path, &output)
                .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
            debug!(path = %path.display(), "wrote argument map");
        }
        _ if ctx.stdout_enabled() => print!("{output}"),
        _ => debug!("stdout disabled; argument map not printed"),
    }
    Ok(())
}

fn run_help(args: GrammarArgs) -> Result<(), String> {
    let parser = load_parser(&args.grammar, args.program.as_deref())?;
    print!("{}", parser.help().render());
    Ok(())
}

fn run_check(args: GrammarArgs) -> Result<(), String> {
    let parser = load_parser(&args.grammar, args.program.as_deref())?;
    let table = parser.table();
    println!(
        "{}: {} patterns ({} keyed, {} positional)",
        args.grammar.display(),
        table.bound_patterns().count(),
        table.keyed().filter(|p| !p.is_control()).count(),
        table.positional().count(),
    );
    Ok(())
}

fn load_parser(path: &Path, program: Option<&str>) -> Result<WordParser, String> {
    let grammar = Grammar::load(path)
        .map_err(|e| format!("Failed to load grammar {}: {e}", path.display()))?;
    let program = program.map(str::to_string).unwrap_or_else(|| program_name(path));
    grammar
        .into_parser(&program)
        .map_err(|e| format!("{}: {e}", path.display()))
}

fn program_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "argrammar".to_string())
}

fn format_values(parsed: &ParsedArgs, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(parsed.values())
            .map(|json| format!("{json}\n"))
            .map_err(|e| format!("Failed to serialize output: {e}")),
        CliOutputFormat::Yaml => serde_yaml::to_string(parsed.values())
            .map_err(|e| format!("Failed to serialize output: {e}")),
    }
}

/// Installs the stderr subscriber.
///
/// `RUST_LOG`, when set, wins and the level stays fixed. Otherwise the
/// returned handle lets the caller swap in the level chosen by `-vol-err`.
fn init_tracing(initial: LevelFilter) -> Option<reload::Handle<LevelFilter, Registry>> {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .init();
        return None;
    }

    let (filter, handle) = reload::Layer::new(initial);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
    Some(handle)
}
