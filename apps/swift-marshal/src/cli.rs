//! CLI argument parsing via `clap`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "swift-marshal",
    version,
    about = "Keep Swift type members in a consistent order",
    long_about = "swift-marshal checks and fixes the order of members inside Swift type declarations.\n\nConfiguration: --config, else the nearest .swift-marshal.yaml up to the repository root, else built-in defaults.",
    after_help = "Examples:\n  swift-marshal check --path Sources\n  swift-marshal check --xcode --path Sources --output .build/marker\n  swift-marshal fix --dry-run Sources/App/Model.swift\n  swift-marshal init",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

/// File selection and configuration shared by `check` and `fix`.
#[derive(Args, Debug, Clone)]
pub struct Inputs {
    #[arg(help = "Swift files to process")]
    pub files: Vec<PathBuf>,
    #[arg(short = 'p', long, help = "Directory to search recursively for .swift files")]
    pub path: Option<PathBuf>,
    #[arg(short = 'c', long, help = "Configuration file (default: discovered .swift-marshal.yaml)")]
    pub config: Option<PathBuf>,
    #[arg(short = 'q', long, action = clap::ArgAction::SetTrue, help = "Only print the summary")]
    pub quiet: bool,
    #[arg(long, default_value = "human", help = "Output mode: human|json (default: human)")]
    pub format: String,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Report types whose members are out of order
    #[command(
        about = "Check member order",
        long_about = "Report type declarations whose members are not in the configured order. Exits 1 when any file needs reordering, unless --warn-only or --xcode is set.",
        after_help = "Examples:\n  swift-marshal check Sources/A.swift Sources/B.swift\n  swift-marshal check --path Sources --quiet"
    )]
    Check {
        #[command(flatten)]
        inputs: Inputs,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Report but always exit 0")]
        warn_only: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Print Xcode-style warnings (implies exit 0)")]
        xcode: bool,
        #[arg(long, help = "Create an empty marker file after checking")]
        output: Option<PathBuf>,
    },
    /// Reorder members in place
    #[command(
        about = "Fix member order",
        long_about = "Rewrite files so members follow the configured order. Everything outside the moved members stays byte-identical.",
        after_help = "Examples:\n  swift-marshal fix --path Sources\n  swift-marshal fix --dry-run --path Sources"
    )]
    Fix {
        #[command(flatten)]
        inputs: Inputs,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Show what would change; exit 1 if anything would")]
        dry_run: bool,
    },
    /// Write a default configuration file
    #[command(
        about = "Create .swift-marshal.yaml",
        long_about = "Write the default configuration to .swift-marshal.yaml in the current directory."
    )]
    Init {
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Overwrite an existing file")]
        force: bool,
    },
}
