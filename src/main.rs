// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Command-line interface for chatmark.
//!
//! This binary provides the `chatmark` command for rendering JSON chat logs
//! to HTML or plain text, or dumping each message's parsed document tree.

use chatmark::export::{ExportOptions, render_chat_log};
use chatmark::grouping::DEFAULT_GROUP_LIMIT;
use chatmark::renderer::Format;
use chatmark::{chatlog, parser};
use lexopt::prelude::*;
use snafu::{OptionExt, ensure, prelude::*};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Where to write the rendered output.
#[derive(Clone)]
enum OutputTarget {
    /// Write each file to the specified directory.
    Directory(PathBuf),
    /// Write to stdout.
    Stdout,
}

/// What to produce for each input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputKind {
    /// A rendered document.
    Document(Format),
    /// The parsed nodes of every message, as JSON.
    Ast,
}

impl OutputKind {
    const fn extension(self) -> &'static str {
        match self {
            Self::Document(Format::Html) => "html",
            Self::Document(Format::PlainText) => "txt",
            Self::Ast => "ast.json",
        }
    }
}

#[allow(clippy::struct_excessive_bools)]
struct Cli {
    input: Vec<PathBuf>,
    output: OutputTarget,
    kind: OutputKind,
    group_limit: usize,
    show_timestamps: bool,
    verbose: bool,
    quiet: bool,
    dry_run: bool,
    force: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("at least one input file or directory is required"))]
    NoInputFiles,

    #[snafu(display("cannot output multiple files to stdout"))]
    MultipleFilesToStdout,

    #[snafu(display("failed to create output directory: {source}"))]
    CreateOutputDir { source: std::io::Error },

    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to parse {}: {source}", path.display()))]
    ParseFile {
        path: PathBuf,
        source: chatlog::ParseError,
    },

    #[snafu(display("failed to serialize document tree: {source}"))]
    SerializeAst { source: serde_json::Error },

    #[snafu(display("invalid input filename: no file stem"))]
    InvalidFilename,

    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn print_help() {
    println!(
        "\
{name} {version}
Render chat logs written in chat markdown

Usage: {name} [OPTIONS] -o <OUTPUT> <INPUT>...

Arguments:
  <INPUT>...  Input JSON chat logs or directories containing them

Options:
  -o, --output <OUTPUT>     Output directory (or - for stdout)
      --format <FORMAT>     Output format: html, text or ast (default: html)
      --group-limit <N>     Maximum messages per group (default: {limit})
      --show-timestamps     Include group timestamps (default: on)
      --hide-timestamps     Hide group timestamps

Other options:
  -v, --verbose             Log debug diagnostics to stderr
  -q, --quiet               Suppress progress messages
  -n, --dry-run             Show what would be processed without writing
  -f, --force               Overwrite existing output files
  -h, --help                Print help
  -V, --version             Print version",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        limit = DEFAULT_GROUP_LIMIT,
    );
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    // Show help if no arguments provided
    if std::env::args().len() == 1 {
        print_help();
        std::process::exit(0);
    }

    let mut input = Vec::new();
    let mut output: Option<OutputTarget> = None;
    let mut kind = OutputKind::Document(Format::Html);
    let mut group_limit = DEFAULT_GROUP_LIMIT;
    let mut show_timestamps = true;
    let mut verbose = false;
    let mut quiet = false;
    let mut dry_run = false;
    let mut force = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Short('o') | Long("output") => {
                let val: PathBuf = parser.value()?.parse()?;
                output = Some(if val == Path::new("-") {
                    OutputTarget::Stdout
                } else {
                    OutputTarget::Directory(val)
                });
            }
            Long("format") => {
                let val: String = parser.value()?.parse()?;
                kind = match val.as_str() {
                    "html" => OutputKind::Document(Format::Html),
                    "text" | "txt" | "plain" => OutputKind::Document(Format::PlainText),
                    "ast" | "json" => OutputKind::Ast,
                    _ => return Err("format must be html, text or ast".into()),
                };
            }
            Long("group-limit") => {
                let val: usize = parser
                    .value()?
                    .parse()
                    .map_err(|_| "group-limit must be a positive number")?;
                if val == 0 {
                    return Err("group-limit must be at least 1".into());
                }
                group_limit = val;
            }
            // Show/hide flags - last one wins
            Long("show-timestamps") => show_timestamps = true,
            Long("hide-timestamps") => show_timestamps = false,
            Short('v') | Long("verbose") => verbose = true,
            Short('q') | Long("quiet") => quiet = true,
            Short('n') | Long("dry-run") => dry_run = true,
            Short('f') | Long("force") => force = true,
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Value(val) => input.push(val.parse()?),
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(Cli {
        input,
        output: output.ok_or("missing required option: --output")?,
        kind,
        group_limit,
        show_timestamps,
        verbose,
        quiet,
        dry_run,
        force,
    })
}

/// Sends diagnostics to stderr. `RUST_LOG` overrides the level.
fn init_logging(verbose: bool) {
    let default = if verbose { "chatmark=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Error> {
    let cli = parse_args().context(ParseArgsSnafu)?;
    init_logging(cli.verbose);

    ensure!(!cli.input.is_empty(), NoInputFilesSnafu);

    // Collect all input files first
    let files = collect_input_files(&cli.input);
    tracing::debug!(files = files.len(), "collected inputs");

    match &cli.output {
        OutputTarget::Stdout => {
            ensure!(files.len() == 1, MultipleFilesToStdoutSnafu);
            process_to_stdout(&files[0], &cli)?;
        }
        OutputTarget::Directory(dir) => {
            if !cli.dry_run {
                std::fs::create_dir_all(dir).context(CreateOutputDirSnafu)?;
            }
            for file in &files {
                process_file(file, dir, &cli)?;
            }
        }
    }

    Ok(())
}

/// Collects all JSON files from the given inputs (files and directories).
fn collect_input_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            {
                files.push(entry.path().to_path_buf());
            }
        } else {
            files.push(input.clone());
        }
    }
    files
}

/// Reads, parses and renders one chat log according to the CLI options.
fn convert(input: &Path, cli: &Cli) -> Result<String, Error> {
    let json = std::fs::read_to_string(input).context(ReadFileSnafu { path: input })?;
    let log = chatlog::parse_chat_log(&json).context(ParseFileSnafu { path: input })?;

    match cli.kind {
        OutputKind::Document(format) => {
            let opts = ExportOptions {
                format,
                group_limit: cli.group_limit,
                show_timestamps: cli.show_timestamps,
            };
            Ok(render_chat_log(&log, &opts))
        }
        OutputKind::Ast => {
            let documents: Vec<_> = log
                .messages
                .iter()
                .map(|message| parser::parse(&message.content))
                .collect();
            let mut json = serde_json::to_string_pretty(&documents).context(SerializeAstSnafu)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Processes a single file and outputs to stdout.
fn process_to_stdout(input: &Path, cli: &Cli) -> Result<(), Error> {
    if cli.dry_run {
        eprintln!("Would output {}", input.display());
        return Ok(());
    }

    print!("{}", convert(input, cli)?);
    Ok(())
}

/// Processes a single file and writes to the output directory.
fn process_file(input: &Path, out_dir: &Path, cli: &Cli) -> Result<(), Error> {
    let out_name = input.file_stem().context(InvalidFilenameSnafu)?;
    let out_path = out_dir.join(format!(
        "{}.{}",
        out_name.to_string_lossy(),
        cli.kind.extension()
    ));

    // Handle dry-run mode
    if cli.dry_run {
        eprintln!("Would write {}", out_path.display());
        return Ok(());
    }

    // Check if output exists and handle overwrite
    if out_path.exists() && !cli.force {
        eprintln!(
            "Skipping {} (already exists, use --force to overwrite)",
            out_path.display()
        );
        return Ok(());
    }

    let rendered = convert(input, cli)?;
    std::fs::write(&out_path, &rendered).context(WriteFileSnafu { path: &out_path })?;

    if !cli.quiet {
        eprintln!("Wrote {}", out_path.display());
    }
    Ok(())
}
