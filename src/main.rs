use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pawnstorm::position::uci_string;
use pawnstorm::search::{format_pv, format_score};
use pawnstorm::{Engine, EngineConfig, Position, SearchLimits, uci};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML file overriding engine parameters
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Speak UCI on stdin/stdout (default)
    Uci,
    /// Pick a move for a single position and print it
    Think {
        #[arg(long)]
        fen: Option<String>,
        /// Remaining clock of the side to move
        #[arg(long, default_value_t = 60_000)]
        time_ms: u64,
        #[arg(long, default_value_t = 0)]
        inc_ms: u64,
        /// Search to a fixed depth instead of using the clock
        #[arg(long)]
        depth: Option<u8>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout belongs to the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = match &cli.config {
        Some(path) => {
            EngineConfig::load(path).with_context(|| format!("loading config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    info!(hash_mb = config.hash_mb, tt_lifetime = ?config.tt_lifetime, "engine configured");
    let mut engine = Engine::new(config);

    match cli.command.unwrap_or(Command::Uci) {
        Command::Uci => uci::run(&mut engine).context("UCI loop failed")?,
        Command::Think { fen, time_ms, inc_ms, depth } => {
            let mut pos = match fen {
                Some(fen) => Position::from_fen(&fen).context("parsing --fen")?,
                None => Position::default(),
            };
            let result = match depth {
                Some(depth) => engine.think(&mut pos, SearchLimits::depth(depth))?,
                None => engine.think_on_clock(&mut pos, time_ms, inc_ms)?,
            };
            println!(
                "depth {} {} nodes {} time {} pv {}",
                result.depth,
                format_score(result.score),
                result.stats.nodes + result.stats.qnodes,
                result.elapsed_ms,
                format_pv(&result.pv)
            );
            println!("bestmove {}", uci_string(&result.best_move));
        }
    }

    Ok(())
}
