//! Connect Four - command-line peer
//!
//! Runs the game core against the in-memory store.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use connect_four_rules::MoveType;
use distributed_connect_four::{
    AgentId, GameManager, MemoryStore, NewMove, NodeConfig, telemetry,
};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument};

/// Environment variable that overrides the configured agent.
const AGENT_ENV: &str = "CONNECT_FOUR_AGENT";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = NodeConfig::load_or_default(&cli.config)?;
    if let Ok(agent) = std::env::var(AGENT_ENV) {
        config = config.with_agent(AgentId::from(agent));
    }

    telemetry::init(config.log_filter());

    match cli.command {
        Command::Describe => run_describe(&config),
        Command::Hotseat { creator, opponent } => run_hotseat(&config, creator, opponent).await,
    }
}

/// Print the move catalogue and the board new games use
#[instrument(skip(config))]
fn run_describe(config: &NodeConfig) -> Result<()> {
    println!("Agent: {}", config.agent());
    println!("Board: {}", config.board());
    println!("Move types:");
    for move_type in MoveType::describe() {
        println!("  {:<20} {}", move_type.to_string(), serde_json::to_string(&move_type)?);
    }
    Ok(())
}

/// Play both seats of one game from stdin
#[instrument(skip(config))]
async fn run_hotseat(config: &NodeConfig, creator: Option<String>, opponent: String) -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let creator = creator
        .map(AgentId::from)
        .unwrap_or_else(|| config.agent().clone());

    let host = GameManager::new(Arc::clone(&store), creator).with_board(*config.board());
    let guest = GameManager::new(store, AgentId::from(opponent));

    let game = host.create_game(guest.agent().clone(), 0).await?;
    info!(game = %game.short(), "Hotseat game started");
    println!("Game {}", game);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut timestamp = 1;

    loop {
        let state = host.get_state(&game).await?;
        println!("{}", state.render());
        if state.outcome().is_over() {
            break;
        }

        let mover = if state.next_agent() == host.agent() {
            &host
        } else {
            &guest
        };
        print!("{}> ", mover.agent());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            info!("Input closed, leaving game");
            break;
        };

        let column: i32 = match line.trim().parse() {
            Ok(column) => column,
            Err(_) => {
                println!("Enter a column number");
                continue;
            }
        };

        let request = NewMove::new(game, MoveType::DropPiece { column }, timestamp);
        match mover.make_move(request).await {
            Ok(hash) => {
                debug!(move_hash = %hash.short(), "Move stored");
                timestamp += 1;
            }
            Err(e) if e.is_retryable() => return Err(e.into()),
            Err(e) => println!("Rejected: {}", e),
        }
    }

    Ok(())
}
