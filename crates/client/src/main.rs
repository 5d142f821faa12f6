//! `dbot`: runs one cooperating game bot.
//!
//! The binary is the composition root: it loads `.env` and the operator
//! config file, sets up logging, builds a [`Bot`] and runs it against either
//! the JSON-lines stdio bridge or an in-process simulated grid.
//!
//! # Examples
//!
//! ```bash
//! # Drive a real server through a wire adapter on stdio
//! adapter | dbot alpha --config config.json | adapter
//!
//! # Rehearse exploration on a grid file ('.' is floor)
//! dbot alpha --simulate maps/room.txt --explore
//! ```
mod bridge;
mod config;
mod logging;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use dbot_core::{Location, Point};
use runtime::{
    Bot, ChannelTransport, Runner, RuntimeConfig, SimConnection, SimMap, SimulatedServer,
    spawn_ticker,
};

use config::BotsFile;

/// Runs one cooperating game bot
#[derive(Parser)]
#[command(name = "dbot")]
#[command(about = "Runs one cooperating game bot", long_about = None)]
#[command(version)]
struct Cli {
    /// Bot name; must appear in the config file unless simulating
    bot: String,

    /// Credentials, admins and command prompt
    #[arg(long, env = "DBOT_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Rehearse against an in-process server built from this grid file
    #[arg(long, value_name = "GRID")]
    simulate: Option<PathBuf>,

    /// Map name given to the simulated grid
    #[arg(long, default_value = "sim")]
    map: String,

    /// Starting column in the simulated grid
    #[arg(long, default_value_t = 1)]
    start_x: i32,

    /// Starting row in the simulated grid
    #[arg(long, default_value_t = 1)]
    start_y: i32,

    /// Start exploring right away
    #[arg(long)]
    explore: bool,

    /// Keep exploration on this map
    #[arg(long, requires = "explore")]
    focus: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::setup_logging(&cli.bot)?;

    let file = if cli.simulate.is_some() && !cli.config.exists() {
        tracing::info!("no config at {}, simulating without one", cli.config.display());
        BotsFile::default()
    } else {
        BotsFile::load(&cli.config)?
    };

    let mut bot = build_bot(&cli, &file)?;
    if cli.explore {
        bot.start_exploration(cli.focus.clone());
    }

    let bot = match &cli.simulate {
        Some(grid) => run_simulated(bot, grid, &cli).await?,
        None => run_bridged(bot).await?,
    };
    tracing::info!("{} stopped with {} actions queued", bot.name(), bot.action_count());
    Ok(())
}

fn build_bot(cli: &Cli, file: &BotsFile) -> Result<Bot> {
    let mut config = RuntimeConfig::from_env();
    if let Some(max_errors) = file.max_errors {
        config.max_errors = max_errors;
    }
    if let Some(prompt) = &file.command_prompt {
        config.command_prompt = prompt.clone();
    }

    let mut builder = Bot::builder(cli.bot.as_str())
        .config(config)
        .friends(file.friends_of(&cli.bot))
        .admins(file.admins.iter().cloned());
    match file.credentials(&cli.bot) {
        Some(credentials) => builder = builder.credentials(credentials),
        None if cli.simulate.is_some() => {}
        None => bail!("no bot named {} in {}", cli.bot, cli.config.display()),
    }
    builder.build().context("Failed to build bot")
}

async fn run_simulated(bot: Bot, grid: &Path, cli: &Cli) -> Result<Bot> {
    let text = std::fs::read_to_string(grid)
        .with_context(|| format!("Failed to read grid: {}", grid.display()))?;
    let map = SimMap::parse(cli.map.as_str(), &text);
    let start = Point::new(cli.start_x, cli.start_y);
    if !map.is_floor(start) {
        bail!("start {} is not floor in {}", start, grid.display());
    }
    tracing::info!("simulating {} from {}", grid.display(), start);

    let server = Arc::new(Mutex::new(SimulatedServer::new().with_map(map)));
    let ticker = spawn_ticker(server.clone(), Duration::from_millis(100));
    let connection = SimConnection::connect(
        server,
        cli.bot.as_str(),
        Location::new(cli.map.as_str(), start),
    )?;

    let result = Runner::new(bot, connection).run_until(shutdown_signal()).await;
    ticker.abort();
    Ok(result?)
}

async fn run_bridged(bot: Bot) -> Result<Bot> {
    let (transport, peer) = ChannelTransport::pair();
    let (reader, writer) = bridge::spawn_stdio(peer);

    let result = Runner::new(bot, transport).run_until(shutdown_signal()).await;
    reader.abort();
    // The writer ends once the transport is dropped and its queue drains.
    match writer.await {
        Ok(Err(e)) => tracing::warn!("command writer failed: {}", e),
        Err(e) if !e.is_cancelled() => tracing::warn!("command writer panicked: {}", e),
        _ => {}
    }
    Ok(result?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("cannot listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
