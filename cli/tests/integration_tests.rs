use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const GRAMMAR: &str = r#"
description: copy files somewhere
patterns:
  - name: -count
    kind: int
    default: 1
    help: how many copies
  - name: -verbose
    arity: 0
  - name: sources
    arity: "+"
  - name: dest
required:
  - dest
"#;

fn write_grammar(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("failed to write grammar");
    path
}

fn argrammar(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_argrammar"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run argrammar")
}

fn parse_words(grammar: &Path, words: &[&str]) -> Output {
    let mut args = vec!["parse", "--grammar", grammar.to_str().unwrap(), "--"];
    args.extend_from_slice(words);
    argrammar(&args)
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

#[test]
fn parse_prints_json_argument_map() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = write_grammar(dir.path(), "copy.yml", GRAMMAR);

    let out = parse_words(&grammar, &["-count", "3", "-verbose", "a", "b", "-", "dir"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let map: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(map["count"], 3);
    assert_eq!(map["verbose"], true);
    assert_eq!(map["sources"], serde_json::json!(["a", "b"]));
    assert_eq!(map["dest"], "dir");
    assert_eq!(map["output_path"], "<stdout>");
    assert_eq!(map["vol_err"], "note");
}

#[test]
fn parse_yaml_format() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = write_grammar(dir.path(), "copy.yml", GRAMMAR);

    let out = argrammar(&[
        "parse",
        "--grammar",
        grammar.to_str().unwrap(),
        "--format",
        "yaml",
        "--",
        "a",
        "-",
        "dir",
    ]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("dest: dir"), "{stdout}");
    assert!(stdout.contains("count: 1"), "{stdout}");
}

#[test]
fn parse_writes_to_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = write_grammar(dir.path(), "copy.yml", GRAMMAR);
    let target = dir.path().join("args.json");

    let out = parse_words(
        &grammar,
        &["-output-path", target.to_str().unwrap(), "src", "-", "dst"],
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(out.stdout.is_empty());

    let map: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(map["dest"], "dst");
    assert_eq!(map["output_path"], target.to_str().unwrap());
}

#[test]
fn parse_quiet_suppresses_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = write_grammar(dir.path(), "copy.yml", GRAMMAR);

    let out = parse_words(&grammar, &["-quiet", "-", "a", "-", "b"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(out.stdout.is_empty());
}

#[test]
fn parse_errors_exit_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = write_grammar(dir.path(), "copy.yml", GRAMMAR);

    let out = parse_words(&grammar, &["-bogus"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&out.stderr).trim(),
        "error: unrecognized key: -bogus"
    );

    let out = parse_words(&grammar, &["a"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("missing required option: dest"));

    let out = parse_words(&grammar, &["-vol-err", "shouty", "a", "-", "b"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid verbosity level"));
}

#[test]
fn parse_help_key_prints_help_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = write_grammar(dir.path(), "copy.yml", GRAMMAR);

    let out = parse_words(&grammar, &["-count", "2", "-help"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.starts_with("help: copy\ncopy files somewhere\n"), "{stderr}");
    assert!(stderr.contains("how many copies"));
}

#[test]
fn parse_json_grammar_with_program_override() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = write_grammar(
        dir.path(),
        "g.json",
        r#"{"description": "json grammar", "patterns": [{"name": "-x", "arity": "?"}]}"#,
    );

    let out = argrammar(&[
        "parse",
        "--grammar",
        grammar.to_str().unwrap(),
        "--program",
        "renamed",
        "--",
        "-help",
    ]);
    assert!(String::from_utf8_lossy(&out.stderr).starts_with("help: renamed\n"));

    let out = parse_words(&grammar, &["-x", "val"]);
    assert!(out.status.success());
    let map: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(map["x"], "val");
}

// ---------------------------------------------------------------------------
// help / check
// ---------------------------------------------------------------------------

#[test]
fn help_subcommand_prints_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = write_grammar(dir.path(), "copy.yml", GRAMMAR);

    let out = argrammar(&["help", "--grammar", grammar.to_str().unwrap()]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("help: copy\n"));
    for name in ["-count", "-verbose", "-output-path", "-vol-err", "sources", "dest"] {
        assert!(stdout.contains(name), "help is missing {name}");
    }
}

#[test]
fn check_reports_pattern_counts() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = write_grammar(dir.path(), "copy.yml", GRAMMAR);

    let out = argrammar(&["check", "--grammar", grammar.to_str().unwrap()]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("7 patterns (5 keyed, 2 positional)"), "{stdout}");
}

#[test]
fn check_rejects_reserved_and_duplicate_patterns() {
    let dir = tempfile::tempdir().unwrap();

    let reserved = write_grammar(dir.path(), "reserved.yml", "patterns:\n  - name: search_re\n");
    let out = argrammar(&["check", "--grammar", reserved.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("reserved binding name: search_re"));

    let duplicate = write_grammar(
        dir.path(),
        "dup.yml",
        "patterns:\n  - name: -in-file\n  - name: -in_file\n",
    );
    let out = argrammar(&["check", "--grammar", duplicate.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("duplicate pattern name"));
}

#[test]
fn missing_grammar_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yml");
    let out = argrammar(&["check", "--grammar", missing.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).starts_with("error: Failed to load grammar"));
}
