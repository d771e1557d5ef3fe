//! `circlet` — interactive front end for the circlet hash ring.
//!
//! # Usage
//!
//! ```text
//! circlet                                   # interactive menu (default)
//! circlet -c circlet.toml repl              # with a config file
//! circlet --hasher blake3 repl              # BLAKE3 tokens instead of SHA-1
//! circlet place -s alpha -s beta k1 k2 k3   # one-shot placement table
//! circlet place -s alpha -s beta k1 --json  # same, as JSON
//! ```

mod config;
mod render;
mod repl;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use circlet_ring::{HasherKind, Ring, SharedRing, TokenHasher};
use circlet_types::ServerAssignments;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use config::CliConfig;
use repl::Repl;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "circlet", version, about = "Consistent hashing ring explorer")]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Token hash function (overrides `[ring] hasher`).
    #[arg(long, global = true, env = "CIRCLET_HASHER")]
    hasher: Option<HasherKind>,

    /// Maximum collision probes per value (overrides `[ring] max_probes`).
    #[arg(long, global = true)]
    max_probes: Option<u32>,

    /// Log level filter (overrides `[log] level`; `RUST_LOG` wins over both).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive numbered menu.
    Repl,

    /// Place values on a fixed set of servers and print the result.
    Place {
        /// Server to add to the ring. Repeat for each server.
        #[arg(short, long = "server", required = true)]
        servers: Vec<String>,

        /// Data values to place, in order.
        values: Vec<String>,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    // CLI args override config file values.
    if let Some(hasher) = cli.hasher {
        config.ring.hasher = hasher;
    }
    if let Some(max_probes) = cli.max_probes {
        config.ring.max_probes = Some(max_probes);
    }
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }

    setup_tracing(&config.log.level);
    debug!(
        hasher = %config.ring.hasher,
        max_probes = config.max_probes(),
        "ring configuration"
    );

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => cmd_repl(&config),
        Commands::Place {
            servers,
            values,
            json,
        } => cmd_place(&config, &servers, &values, json),
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the config value.
/// Logs go to stderr so they don't interleave with the menu on stdout.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// -----------------------------------------------------------------------
// circlet repl
// -----------------------------------------------------------------------

fn cmd_repl(config: &CliConfig) -> Result<()> {
    let ring = SharedRing::new(config.build_ring());
    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    Repl::new(ring, stdin, stdout)
        .run()
        .context("interactive session failed")
}

// -----------------------------------------------------------------------
// circlet place
// -----------------------------------------------------------------------

/// Machine-readable result of `circlet place --json`.
///
/// `place` requires at least one server, so every value has an owner and
/// the report carries no unassigned list.
#[derive(Serialize)]
struct PlacementReport<'a> {
    hasher: &'a str,
    servers: Vec<ServerAssignments>,
}

fn cmd_place(config: &CliConfig, servers: &[String], values: &[String], json: bool) -> Result<()> {
    let mut ring = config.build_ring();
    place(&mut ring, servers, values)?;

    let mut out = io::stdout().lock();
    write_placement(&mut out, &config.ring.hasher.to_string(), &ring, json)
}

/// Add `servers`, then `values`, to `ring` in order.
fn place<H: TokenHasher>(ring: &mut Ring<H>, servers: &[String], values: &[String]) -> Result<()> {
    for name in servers {
        ring.add_server(name)
            .with_context(|| format!("cannot add server {name:?}"))?;
    }
    for value in values {
        ring.add_data(value)
            .with_context(|| format!("cannot place value {value:?}"))?;
    }
    info!(
        servers = ring.server_count(),
        values = ring.data_count(),
        "placement complete"
    );
    Ok(())
}

/// Print the assignment table, or the JSON report when `json` is set.
fn write_placement<H: TokenHasher>(
    out: &mut impl Write,
    hasher: &str,
    ring: &Ring<H>,
    json: bool,
) -> Result<()> {
    if json {
        let report = PlacementReport {
            hasher,
            servers: ring.assignments(),
        };
        serde_json::to_writer_pretty(&mut *out, &report).context("failed to write JSON")?;
        writeln!(out)?;
    } else {
        writeln!(out, "Server Ring ({hasher}):")?;
        render::servers(out, ring.servers())?;
        writeln!(out, "Servers:")?;
        render::assignments(out, &ring.assignments())?;
    }
    Ok(())
}
