// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `paperboy-dag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "paperboy-dag",
    version,
    about = "Build a job/report task graph from base64-encoded JSON.",
    long_about = None
)]
pub struct CliArgs {
    /// Base64-encoded JSON job document.
    #[arg(
        long,
        value_name = "B64",
        conflicts_with = "job_file",
        required_unless_present = "job_file"
    )]
    pub job: Option<String>,

    /// File containing the base64-encoded job document.
    #[arg(long, value_name = "PATH")]
    pub job_file: Option<PathBuf>,

    /// Base64-encoded JSON array of report documents.
    ///
    /// If neither this nor `--reports-file` is given, the job has no reports.
    #[arg(long, value_name = "B64", conflicts_with = "reports_file")]
    pub reports: Option<String>,

    /// File containing the base64-encoded reports array.
    #[arg(long, value_name = "PATH")]
    pub reports_file: Option<PathBuf>,

    /// Defaults file (TOML). Built-in defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    pub defaults: Option<PathBuf>,

    /// Output format for the built graph.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Build and validate, print a human summary instead of the graph.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PAPERBOY_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Graph output format.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Dot,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
