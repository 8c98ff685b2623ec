#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "swkit")]
#[command(author, version, about = "Service worker build integration", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Resolve the service worker configuration and report it
    Check,

    /// Serve the compiled service worker at /sw.js
    Dev {
        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "localhost")]
        host: String,
    },

    /// Relocate a built worker chunk and clean the client manifests
    Finalize {
        /// Directory the client bundle was written to
        #[arg(long, value_name = "DIR")]
        out_dir: PathBuf,

        /// Worker chunk file name, relative to --out-dir
        #[arg(long, value_name = "NAME")]
        file: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.json);

    // Determine working directory, absolute so entry points resolve absolute
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
        .canonicalize()
        .into_diagnostic()?;

    match cli.command {
        Commands::Check => commands::check::run(&cwd, cli.json),
        Commands::Dev { port, host } => {
            let action = commands::dev::DevAction { cwd, port, host };
            commands::dev::run(action)
        }
        Commands::Finalize { out_dir, file } => {
            let action = commands::finalize::FinalizeAction { cwd, out_dir, file };
            commands::finalize::run(action, cli.json)
        }
    }
}
