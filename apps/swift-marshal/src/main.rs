//! swift-marshal CLI binary entry point.
//! Resolves configuration and inputs, runs the pipeline, prints results and
//! maps the outcome to an exit code (0 ok, 1 reordering needed, 2 error).

use anyhow::Context;
use clap::Parser;
use fs_err as fs;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use swift_marshal::cli::{Cli, Commands, Inputs};
use swift_marshal::config;
use swift_marshal::discover::collect_files;
use swift_marshal::error::MarshalError;
use swift_marshal::gateway::FileGateway;
use swift_marshal::models::configuration::Configuration;
use swift_marshal::output::{self, CheckView};
use swift_marshal::pipeline::Pipeline;
use swift_marshal::syntax::SwiftParser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit code when at least one file is (or would be) reordered.
const EXIT_NEEDS_REORDER: u8 = 1;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match real_main(cli) {
        Ok(code) => code,
        Err(err) => {
            let prefix = if std::env::var_os("NO_COLOR").is_none() {
                "error:".red().bold().to_string()
            } else {
                "error:".to_string()
            };
            eprintln!("{prefix} {err:#}");
            let code = err
                .downcast_ref::<MarshalError>()
                .map_or(2, MarshalError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn real_main(cli: Cli) -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir().context("cannot determine the working directory")?;
    match cli.cmd {
        Commands::Check {
            inputs,
            warn_only,
            xcode,
            output,
        } => {
            let (cfg, files) = prepare(&inputs, &cwd)?;
            let gateway = FileGateway::new();
            let pipeline = Pipeline::new(SwiftParser, &cfg, &gateway);
            let results = pipeline.run_check(&files)?;
            let view = CheckView {
                quiet: inputs.quiet,
                xcode,
            };
            output::print_check(&results, view, &inputs.format);
            if let Some(marker) = output {
                write_marker(&marker)?;
            }
            let needs_reorder = results.iter().any(|r| r.needs_reorder);
            if needs_reorder && !warn_only && !xcode {
                return Ok(ExitCode::from(EXIT_NEEDS_REORDER));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Fix { inputs, dry_run } => {
            let (cfg, files) = prepare(&inputs, &cwd)?;
            let gateway = FileGateway::new();
            let pipeline = Pipeline::new(SwiftParser, &cfg, &gateway);
            let results = pipeline.run_fix(&files, dry_run)?;
            output::print_fix(&results, dry_run, inputs.quiet, &inputs.format);
            if dry_run && results.iter().any(|r| r.modified) {
                return Ok(ExitCode::from(EXIT_NEEDS_REORDER));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { force } => {
            let path = config::write_default_config(&cwd, force)?;
            debug!("wrote {}", path.display());
            println!("Created {}", config::CONFIG_FILE_NAME);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Validates the invocation and resolves configuration and input files.
fn prepare(inputs: &Inputs, cwd: &Path) -> Result<(Configuration, Vec<PathBuf>), MarshalError> {
    if !matches!(inputs.format.as_str(), "human" | "json") {
        return Err(MarshalError::Validation(format!(
            "unknown output mode '{}' (expected human or json)",
            inputs.format
        )));
    }
    let files = collect_files(&inputs.files, inputs.path.as_deref())?;
    let cfg = config::resolve_config(inputs.config.as_deref(), cwd)?;
    debug!(files = files.len(), strategy = ?cfg.extensions_strategy, "prepared run");
    Ok((cfg, files))
}

/// Empty file whose existence tells build tools the check ran.
fn write_marker(path: &Path) -> Result<(), MarshalError> {
    let io_err = |source| MarshalError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    fs::write(path, b"").map_err(io_err)
}
