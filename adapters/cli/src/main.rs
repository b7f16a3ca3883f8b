#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that connects the Sonar Scout engine to the referee.
//!
//! The referee writes the roster and turn blocks to stdin and reads one
//! command line per drone from stdout; logs go to stderr.

mod config;
mod emitter;
mod protocol;

use std::{
    io::{self, BufReader},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use sonar_scout_engine::Engine;
use tracing::{debug, info};
use tracing_subscriber::filter::EnvFilter;

use crate::protocol::ProtocolReader;

/// Command-line options for the Sonar Scout decision engine.
#[derive(Debug, Parser)]
#[command(name = "sonar-scout", version, about)]
struct Args {
    /// Path to a TOML file overriding engine parameters.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Tracing filter directive, e.g. `debug` or `sonar_scout_engine=debug`.
    #[arg(long)]
    log_filter: Option<String>,
}

/// Entry point for the Sonar Scout command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_filter.as_deref())?;

    let config = config::load(args.config.as_deref())?;
    info!(?config, "engine configured");

    let stdin = io::stdin();
    let mut reader = ProtocolReader::new(BufReader::new(stdin.lock()));
    let roster = reader.read_roster().context("failed to read roster")?;
    info!(creatures = roster.len(), "roster received");

    let mut engine =
        Engine::new(&config, &roster).context("engine rejected the configuration or roster")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    while let Some(observation) = reader.read_turn().context("failed to read turn")? {
        let orders = engine.turn(&observation);
        emitter::write_orders(&mut out, &orders).context("failed to write orders")?;
        debug!(turn = engine.context().turn, orders = orders.len(), "turn answered");
    }

    info!("referee closed the stream");
    Ok(())
}

fn init_tracing(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => {
            EnvFilter::try_new(directive).context("invalid --log-filter directive")?
        }
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}
