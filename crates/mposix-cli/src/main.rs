use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mposix_host::{MposixConfig, Session};

mod commands;

#[derive(Parser)]
#[command(
    name = "mposix",
    about = "mposix: POSIX bindings for the host runtime",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Configuration file (default: built-in settings)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Invoke a binding by name.
    ///
    /// ARGS fill the input parameters in order; outputs start empty and are
    /// printed after the call.
    Call {
        /// Operation name, exported symbol or call-table name
        operation: String,
        args: Vec<OsString>,
        /// Use ARGS as the complete slot list, outputs included
        #[arg(long)]
        raw: bool,
        /// Print failing status codes instead of raising them
        #[arg(long)]
        no_raise: bool,
    },
    /// List the available bindings
    Ops {
        /// Print the JSON manifest
        #[arg(long)]
        json: bool,
    },
    /// Print the external-call table for the shared library
    Table {
        /// Path of the installed shared library
        #[arg(short, long, default_value = "libmposix_ffi.so")]
        library: String,
    },
    /// Convert an octal permission string to its integer mode
    Mode { octal: String },
    /// Convert an integer mode to its octal permission string
    Octal { mode: u32 },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => MposixConfig::from_file(path)?,
        None => MposixConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log.filter.parse()?)
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(config = ?cli.config, max_open = config.directories.max_open, "configuration loaded");

    match cli.command {
        Commands::Call { operation, args, raw, no_raise } => {
            let mut session = Session::from_config(&config)?;
            commands::call::call(&mut session, &operation, &args, raw, no_raise)
        }
        Commands::Ops { json } => commands::ops::list(&Session::from_config(&config)?, json),
        Commands::Table { library } => {
            commands::ops::table(&Session::from_config(&config)?, &library)
        }
        Commands::Mode { octal } => commands::mode::mode(&octal),
        Commands::Octal { mode } => commands::mode::octal(mode),
    }
}
