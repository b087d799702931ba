use std::io;

use alphaprune::rules::{self, ChessRules};
use alphaprune::types::{EngineConfig, Strategy, DEFAULT_DEPTH};
use alphaprune::{choose_move, play, uci, SearchState};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shakmaty::Chess;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "alphaprune")]
#[command(about = "Alpha-beta chess move picker", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the chosen move for a position
    Best {
        /// FEN position to analyze (default: initial position)
        #[arg(short, long)]
        fen: Option<String>,

        /// Search depth in plies
        #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
        depth: u8,
    },
    /// Play against the engine, entering moves in SAN
    Play {
        /// FEN to start from (default: initial position)
        #[arg(short, long)]
        fen: Option<String>,

        #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
        depth: u8,

        /// random, greedy or alphabeta
        #[arg(short, long, default_value_t = Strategy::AlphaBeta)]
        strategy: Strategy,
    },
    /// Speak the UCI protocol on stdin/stdout
    Uci,
}

fn start_position(fen: Option<&str>) -> Result<Chess> {
    match fen {
        Some(fen) => rules::parse_fen(fen).context("parsing --fen"),
        None => Ok(Chess::default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    match args.command.unwrap_or(Command::Uci) {
        Command::Best { fen, depth } => {
            let board = start_position(fen.as_deref())?;
            let mut state = SearchState::new();
            let result = choose_move(&ChessRules, &mut state, &board, depth)
                .context("searching position")?;
            println!("{}", rules::uci_string(&result.best_move));
        }
        Command::Play { fen, depth, strategy } => {
            let board = start_position(fen.as_deref())?;
            let config = EngineConfig { depth, strategy };
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            play::run(stdin.lock(), &mut stdout, board, &config, &mut rand::thread_rng())?;
        }
        Command::Uci => uci::run().context("running UCI loop")?,
    }

    Ok(())
}
