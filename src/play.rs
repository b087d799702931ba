use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use rand::Rng;
use shakmaty::{Chess, Position as _};
use tracing::info;

use crate::rules::{self, ChessRules, Rules};
use crate::strategy::pick_move;
use crate::types::EngineConfig;

/// Human plays the side to move of `start` by typing SAN moves; the engine
/// answers each one. Returns the final position.
pub fn run<I, O, G>(
    input: I,
    output: &mut O,
    start: Chess,
    config: &EngineConfig,
    rng: &mut G,
) -> Result<Chess>
where
    I: BufRead,
    O: Write,
    G: Rng + ?Sized,
{
    let mut board = start;
    let mut lines = input.lines();

    write!(output, "{}", rules::render(&board))?;

    loop {
        if game_over(&board, output)? {
            break;
        }

        write!(output, "Enter chess move: ")?;
        output.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("reading move from input")?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == "quit" {
            break;
        }

        let mv = match rules::parse_san(&board, text) {
            Ok(mv) => mv,
            Err(_) => {
                writeln!(output, "Please enter a valid move")?;
                continue;
            }
        };
        board = ChessRules.play(&board, &mv)?;
        write!(output, "{}", rules::render(&board))?;

        if game_over(&board, output)? {
            break;
        }

        let reply = pick_move(config.strategy, &ChessRules, &board, config.depth, rng)
            .context("engine failed to pick a reply")?;
        let san = rules::san_string(&board, &reply);
        info!(reply = %san, strategy = %config.strategy, "engine reply");
        writeln!(output, "Engine plays {san}")?;
        board = ChessRules.play(&board, &reply)?;
        write!(output, "{}", rules::render(&board))?;
    }

    Ok(board)
}

fn game_over<O: Write>(board: &Chess, output: &mut O) -> Result<bool> {
    if board.legal_moves().is_empty() {
        writeln!(output, "Game Over")?;
        return Ok(true);
    }
    Ok(false)
}
