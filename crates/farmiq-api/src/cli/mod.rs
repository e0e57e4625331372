//! CLI command definitions for the `farmiq` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod check;
pub mod seed;
pub mod skills;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Farm advisory chat service backed by semantic memory.
#[derive(Parser)]
#[command(name = "farmiq", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config.toml (defaults to {data_dir}/config.toml).
    #[arg(long, global = true, env = "FARMIQ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Seed memory and start the HTTP API.
    Serve {
        /// Override `service.port`.
        #[arg(long)]
        port: Option<u16>,

        /// Override `service.host`.
        #[arg(long)]
        host: Option<String>,
    },

    /// Write the farm records into the configured memory store.
    Seed {
        /// Print the record summaries without touching a store.
        #[arg(long)]
        dry_run: bool,
    },

    /// List the skills the kernel would register.
    Skills,

    /// Validate the configuration without contacting any backend.
    CheckConfig,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
