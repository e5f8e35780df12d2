//! Strictly Eriantys - unified CLI
//!
//! Runs bot simulations or replays command scripts against a session.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, SessionArgs};
use std::path::Path;
use strictly_eriantys::{
    GameEvent, Player, PlayerCount, Script, ScriptEvent, SessionConfig, SimpleAI, run_script,
    run_simulation,
};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Simulate { session, json } => simulate(&session, json).await,
        Command::Script {
            path,
            session,
            quiet,
        } => replay(&path, &session, !quiet),
    }
}

/// Builds the session config from the optional file and the flag overrides.
#[instrument]
fn load_config(args: &SessionArgs) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };
    if let Some(players) = args.players {
        config = config.with_players(PlayerCount::try_from(players)?);
    }
    if let Some(variant) = args.variant {
        config = config.with_variant(variant);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(rounds) = args.rounds {
        config = config.with_max_rounds(rounds);
    }
    config.validate()?;
    Ok(config)
}

/// Plays a session between random bots and prints what happened.
#[instrument(skip(args))]
async fn simulate(args: &SessionArgs, json: bool) -> Result<()> {
    let config = load_config(args)?;
    let base_seed = config.seed().unwrap_or_else(rand::random);
    let players: Vec<Box<dyn Player>> = ["ada", "bo", "cy"]
        .iter()
        .take(config.players().get())
        .enumerate()
        .map(|(i, name)| {
            let seed = base_seed.wrapping_add(i as u64 + 1);
            Box::new(SimpleAI::new(*name, seed)) as Box<dyn Player>
        })
        .collect();

    info!(players = %config.players(), variant = %config.variant(), "Starting simulation");
    let (termination, events) = run_simulation("simulation".to_string(), config, players).await?;

    for event in &events {
        match event {
            GameEvent::ActionTaken { player, action } if json => {
                let line = serde_json::json!({ "player": player, "action": action });
                println!("{}", serde_json::to_string(&line)?);
            }
            GameEvent::ActionTaken { player, action } => println!("{player}: {action:?}"),
            GameEvent::Rejected { player, reason } => warn!(%player, %reason, "Bot action rejected"),
            GameEvent::GameOver(_) => {}
        }
    }
    println!("{termination}");
    Ok(())
}

/// Replays a script file and prints the outcome of every command.
#[instrument(skip(args))]
fn replay(path: &Path, args: &SessionArgs, verbose: bool) -> Result<()> {
    let config = load_config(args)?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let script: Script = text.parse()?;
    info!(commands = script.lines().len(), "Replaying script");

    let mut rejected = 0;
    let snapshot = run_script(config, &script, |event| match event {
        ScriptEvent::Accepted(line) if verbose => {
            println!("{:>4} ok       {}", line.line, line.request);
        }
        ScriptEvent::Accepted(_) => {}
        ScriptEvent::Rejected { line, reason } => {
            rejected += 1;
            println!("{:>4} rejected {} ({})", line.line, line.request, reason);
        }
        ScriptEvent::Notified {
            player,
            notification,
        } if verbose => match serde_json::to_string(&notification) {
            Ok(text) => println!("     -> {player}: {text}"),
            Err(error) => warn!(%error, "Could not serialize notification"),
        },
        ScriptEvent::Notified { .. } => {}
    })?;

    println!("state: {}, rejected: {}", snapshot.state, rejected);
    if let Some(termination) = snapshot.termination {
        println!("{termination}");
    }
    Ok(())
}
