//! sharpfix CLI - lint and fix C# syntax trees
//!
//! Reads syntax-tree documents (JSON with a `tree` and the binder's `types`)
//! and reports or fixes rule violations.
//!
//! Available rules:
//! - NullEqualityAnalyzer: Convert `a == b` / `a != b` on value types to `a is b` / `a is not b`
//! - TryReturnTypeAnalyzer: Convert `T TryX(...)` to `bool TryX(..., out T value)`

mod config;
mod output;
mod process;

use anyhow::Result;
use clap::Parser;
use colored::*;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use config::{Config, Excludes};
use output::{OutputFormat, Reporter};
use process::{is_fixed_output, process_file, write_fixed, ProcessResult};
use sharpfix_rules::{Pipeline, RuleRegistry};

/// Environment variable holding the log filter
const LOG_ENV: &str = "SHARPFIX_LOG";

#[derive(Parser)]
#[command(name = "sharpfix")]
#[command(version)]
#[command(about = "Lint and fix C# syntax trees")]
struct Cli {
    /// Syntax-tree documents or directories to process
    #[arg(required_unless_present = "list_rules")]
    paths: Vec<PathBuf>,

    /// Check for issues without applying fixes (default mode)
    #[arg(long, conflicts_with = "fix")]
    check: bool,

    /// Write fixed documents next to their inputs (<name>.fixed.json)
    #[arg(long)]
    fix: bool,

    /// Show verbose output
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Rules to run (can be specified multiple times). Overrides config file.
    #[arg(long, short = 'r', value_name = "RULE")]
    rule: Vec<String>,

    /// Output format: text, json
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Path to config file (default: auto-detect .sharpfix.toml)
    #[arg(long, value_name = "PATH", conflicts_with = "no_config")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long)]
    no_config: bool,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

/// Log to stderr, filtered by `SHARPFIX_LOG` (default `warn`, `debug` with --verbose)
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let registry = RuleRegistry::new();

    if cli.list_rules {
        println!("{}", "Available rules:".bold());
        for (id, title, description) in registry.list_rules() {
            println!("  {} - {}", id.green(), title);
            println!("      {}", description);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(&cli)?;

    let output_format = if cli.json {
        OutputFormat::Json
    } else {
        match cli.format.as_deref() {
            Some(format) => OutputFormat::parse(format).ok_or_else(|| {
                anyhow::anyhow!("Invalid output format '{}'. Valid options: text, json", format)
            })?,
            None => config.output.format.unwrap_or_default(),
        }
    };

    let enabled_rules = config.rules.resolve(&registry, &cli.rule)?;
    let excludes = config.paths.excludes()?;

    let fix_mode = cli.fix;
    let check_mode = cli.check || !fix_mode;
    let pipeline = Pipeline::new(RuleRegistry::with_enabled(&enabled_rules));

    if cli.verbose && output_format == OutputFormat::Text {
        println!("{}: {}", "Mode".bold(), if fix_mode { "fix" } else { "check" });
        println!("{}: {}", "Rules".bold(), pipeline.registry().all_ids().join(", "));
        println!();
    }

    let (mut file_paths, missing_paths) = collect_paths(&cli.paths, &excludes);
    file_paths.sort();
    file_paths.dedup();

    // Results come back in input order, so the report stays sorted by path
    let results: Vec<Result<ProcessResult>> = file_paths
        .par_iter()
        .map(|path| process_file(path, &pipeline))
        .collect();

    let mut reporter = Reporter::new(output_format, cli.verbose);

    for path in &missing_paths {
        tracing::warn!(path = %path.display(), "path does not exist");
        if output_format == OutputFormat::Text {
            eprintln!("{}: Path does not exist: {}", "Warning".yellow(), path.display());
        }
    }

    for (path, result) in file_paths.iter().zip(results) {
        report_result(path, result, fix_mode, &mut reporter);
    }

    let summary = reporter.summary();
    let exit_code = if summary.errors > 0 {
        ExitCode::from(1)
    } else if check_mode && summary.total_findings > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    };

    reporter.finish(check_mode)?;

    Ok(exit_code)
}

fn load_config(cli: &Cli) -> Result<Config> {
    if cli.no_config {
        return Ok(Config::default());
    }

    let loaded = match &cli.config {
        Some(path) => Some((Config::load_path(path)?, path.clone())),
        None => Config::discover()?,
    };

    Ok(match loaded {
        Some((config, path)) => {
            tracing::debug!(path = %path.display(), "using config");
            config
        }
        None => Config::default(),
    })
}

/// Expand the given paths into the documents to process. Directories are
/// walked for `.json` files; documents written by `--fix` are skipped.
fn collect_paths(paths: &[PathBuf], excludes: &Excludes) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut file_paths = Vec::new();
    let mut missing_paths = Vec::new();

    for path in paths {
        if path.is_file() {
            file_paths.push(path.clone());
        } else if path.is_dir() {
            for entry in walkdir::WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            {
                let file_path = entry.path();
                if !is_fixed_output(file_path) && !excludes.matches(file_path) {
                    file_paths.push(file_path.to_path_buf());
                }
            }
        } else {
            missing_paths.push(path.clone());
        }
    }

    (file_paths, missing_paths)
}

fn report_result(path: &Path, result: Result<ProcessResult>, fix_mode: bool, reporter: &mut Reporter) {
    let result = match result {
        Ok(result) => result,
        Err(e) => {
            reporter.report_error(path, &format!("{:#}", e));
            return;
        }
    };

    if result.findings.is_empty() {
        reporter.report_skipped(path);
        return;
    }

    if !fix_mode {
        reporter.report_check(path, result.findings, &result.before, &result.after);
        return;
    }

    match &result.fixed {
        Some(document) => match write_fixed(path, document) {
            Ok(written) => reporter.report_fix(path, result.findings, &written),
            Err(e) => reporter.report_error(path, &format!("{:#}", e)),
        },
        // every finding failed to fix; show them as in check mode
        None => reporter.report_check(path, result.findings, &result.before, &result.after),
    }
}
