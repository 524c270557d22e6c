// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod emit;
pub mod errors;
pub mod job;
pub mod logging;
pub mod types;

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::load_or_default;
use crate::dag::{TaskGraph, build_from_encoded};

/// Empty JSON array, base64-encoded: used when no reports are supplied.
const NO_REPORTS_B64: &str = "W10=";

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - reading the encoded job / reports (flags or files)
/// - loading defaults
/// - building the graph
/// - rendering it to stdout
pub fn run(args: CliArgs) -> Result<()> {
    let graph = build_from_args(&args)?;

    let output = if args.dry_run {
        emit::summary(&graph)
    } else {
        emit::render(&graph, args.format)?
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }

    debug!(dry_run = args.dry_run, format = ?args.format, "graph written");
    Ok(())
}

/// Resolve inputs from CLI arguments and build the graph.
pub fn build_from_args(args: &CliArgs) -> Result<TaskGraph> {
    let job_b64 = match (&args.job, &args.job_file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => read_encoded(path)?,
        (None, None) => anyhow::bail!("either --job or --job-file is required"),
    };

    let reports_b64 = match (&args.reports, &args.reports_file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => read_encoded(path)?,
        (None, None) => NO_REPORTS_B64.to_string(),
    };

    let defaults = load_or_default(args.defaults.as_deref())?;

    let graph = build_from_encoded(&job_b64, &reports_b64, &defaults)?;
    info!(dag_id = %graph.dag().dag_id, tasks = graph.len(), "graph ready");
    Ok(graph)
}

fn read_encoded(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
