use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};

use shakmaty::{Chess, Move};
use tracing::{debug, warn};

use crate::error::SearchError;
use crate::rules::{self, ChessRules, Rules, RulesError};
use crate::strategy::pick_move;
use crate::types::{EngineConfig, Strategy};
use crate::worker::{self, Outcome, SearchHandle};

/// Engine output, shared with the search worker that reports `bestmove`.
pub type Output<W> = Arc<Mutex<W>>;

pub fn run() -> io::Result<()> {
    let stdin = io::stdin();
    run_with(stdin.lock(), Arc::new(Mutex::new(io::stdout())))
}

/// The protocol loop over any input and output. Returns once `quit` is read
/// or the input ends, with no search left running.
pub fn run_with<I, W>(input: I, output: Output<W>) -> io::Result<()>
where
    I: BufRead,
    W: Write + Send + 'static,
{
    let mut board = Chess::default();
    let mut config = EngineConfig::default();
    let mut search: Option<SearchHandle<Move>> = None;
    let mut rng = rand::thread_rng();

    for line in input.lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = tokens.first() else {
            continue;
        };

        match command {
            "uci" => {
                send(&output, format_args!("id name alphaprune"))?;
                send(&output, format_args!("id author alphaprune developers"))?;
                send(
                    &output,
                    format_args!("option name Depth type spin default {} min 1 max 10", config.depth),
                )?;
                send(
                    &output,
                    format_args!(
                        "option name Strategy type combo default {} var alphabeta var greedy var random",
                        config.strategy
                    ),
                )?;
                send(&output, format_args!("uciok"))?;
            }
            "isready" => {
                wait_for_search(&mut search);
                send(&output, format_args!("readyok"))?;
            }
            "ucinewgame" => {
                stop_search(&mut search);
                board = Chess::default();
            }
            "position" => {
                stop_search(&mut search);
                if let Err(e) = parse_position(&tokens, &mut board) {
                    warn!(error = %e, "ignoring position command");
                }
            }
            "go" => {
                stop_search(&mut search);
                let depth = parse_go(&tokens).depth.unwrap_or(config.depth);

                match config.strategy {
                    Strategy::AlphaBeta => {
                        let sink = output.clone();
                        search = Some(worker::spawn_with(
                            ChessRules,
                            board.clone(),
                            depth,
                            move |outcome| report_bestmove(&sink, outcome),
                        ));
                    }
                    strategy => match pick_move(strategy, &ChessRules, &board, depth, &mut rng) {
                        Ok(mv) => send(&output, format_args!("bestmove {}", rules::uci_string(&mv)))?,
                        Err(e) => {
                            debug!(error = %e, "no move to report");
                            send(&output, format_args!("bestmove 0000"))?;
                        }
                    },
                }
            }
            "stop" => stop_search(&mut search),
            "setoption" => {
                wait_for_search(&mut search);
                parse_setoption(&tokens, &mut config);
            }
            "quit" => break,
            "d" | "print" => {
                send(&output, format_args!("{}", rules::render(&board).trim_end()))?;
            }
            _ => {}
        }
    }

    stop_search(&mut search);
    Ok(())
}

fn send<W: Write>(output: &Mutex<W>, line: fmt::Arguments<'_>) -> io::Result<()> {
    let mut out = output
        .lock()
        .map_err(|_| io::Error::other("engine output lock poisoned"))?;
    writeln!(out, "{line}")?;
    out.flush()
}

/// Runs on the worker thread once the search is over.
fn report_bestmove<W: Write>(output: &Mutex<W>, outcome: &Outcome<Move>) {
    let sent = match outcome {
        Ok(result) => send(
            output,
            format_args!("info depth {} score cp {} nodes {}", result.depth, result.score, result.nodes),
        )
        .and_then(|()| send(output, format_args!("bestmove {}", rules::uci_string(&result.best_move)))),
        // No partial result on cancel; GUIs read 0000 as the null move.
        Err(SearchError::Cancelled) => send(output, format_args!("bestmove 0000")),
        Err(e) => {
            warn!(error = %e, "search failed");
            send(output, format_args!("bestmove 0000"))
        }
    };
    if let Err(e) = sent {
        warn!(error = %e, "could not report bestmove");
    }
}

/// Wait for a running search to finish on its own.
fn wait_for_search(search: &mut Option<SearchHandle<Move>>) {
    if let Some(handle) = search.take() {
        let _ = handle.wait();
    }
}

/// Cancel a running search and wait for the worker to let go of it. The
/// position is only changed after this returns.
fn stop_search(search: &mut Option<SearchHandle<Move>>) {
    if let Some(handle) = search.take() {
        if handle.is_in_progress() {
            handle.cancel();
        }
        let _ = handle.wait();
    }
}

/// Parsed `go` command parameters. Search is depth-limited only, so time
/// controls are accepted and ignored.
#[derive(Default)]
struct GoParams {
    depth: Option<u8>,
}

fn parse_go(tokens: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let mut iter = tokens.iter().skip(1);

    while let Some(&token) = iter.next() {
        match token {
            "depth" => {
                params.depth = iter.next().and_then(|d| d.parse().ok()).filter(|&d| d > 0);
            }
            "movetime" | "wtime" | "btime" | "winc" | "binc" | "movestogo" | "nodes" => {
                iter.next();
            }
            _ => {}
        }
    }

    params
}

fn parse_position(tokens: &[&str], board: &mut Chess) -> Result<(), RulesError> {
    let mut idx = 1;

    let mut next = match tokens.get(idx) {
        Some(&"startpos") => {
            idx += 1;
            Chess::default()
        }
        Some(&"fen") => {
            idx += 1;
            // Collect FEN fields up to "moves" keyword or end of tokens
            let mut fen_parts: Vec<&str> = Vec::new();
            while let Some(&part) = tokens.get(idx) {
                if part == "moves" || fen_parts.len() >= 6 {
                    break;
                }
                fen_parts.push(part);
                idx += 1;
            }
            rules::parse_fen(&fen_parts.join(" "))?
        }
        _ => return Err(RulesError::UnparsableMove(tokens.join(" "))),
    };

    if tokens.get(idx) == Some(&"moves") {
        for &move_str in tokens.iter().skip(idx + 1) {
            let mv = rules::parse_uci_move(&next, move_str)?;
            next = ChessRules.play(&next, &mv)?;
        }
    }

    *board = next;
    Ok(())
}

fn parse_setoption(tokens: &[&str], config: &mut EngineConfig) {
    let name_idx = tokens.iter().position(|&t| t == "name");
    let value_idx = tokens.iter().position(|&t| t == "value");

    if let (Some(ni), Some(vi)) = (name_idx, value_idx) {
        if vi <= ni {
            return;
        }
        let name: String = tokens[ni + 1..vi].join(" ");
        let value: String = tokens[vi + 1..].join(" ");

        match name.to_lowercase().as_str() {
            "depth" => {
                if let Ok(depth) = value.parse::<u8>() {
                    config.depth = depth.clamp(1, 10);
                }
            }
            "strategy" => match value.parse() {
                Ok(strategy) => config.strategy = strategy,
                Err(e) => warn!(error = %e, "ignoring strategy option"),
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Position;
    use std::io::Cursor;

    fn session(commands: &str) -> Vec<String> {
        let output = Arc::new(Mutex::new(Vec::new()));
        run_with(Cursor::new(commands.to_string()), output.clone()).unwrap();
        let bytes = output.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap().lines().map(str::to_string).collect()
    }

    fn bestmoves(lines: &[String]) -> Vec<&str> {
        lines.iter().filter_map(|l| l.strip_prefix("bestmove ")).collect()
    }

    #[test]
    fn test_handshake() {
        let lines = session("uci\nisready\nquit\n");
        assert_eq!(lines.first().map(String::as_str), Some("id name alphaprune"));
        assert!(lines.iter().any(|l| l == "uciok"));
        assert_eq!(lines.last().map(String::as_str), Some("readyok"));
    }

    #[test]
    fn test_go_reports_before_readyok() {
        let lines = session("position startpos moves e2e4\ngo depth 1\nisready\nquit\n");
        let moves = bestmoves(&lines);
        assert_eq!(moves.len(), 1);
        let after_e4 = {
            let mut board = Chess::default();
            parse_position(&["position", "startpos", "moves", "e2e4"], &mut board).unwrap();
            board
        };
        assert!(rules::parse_uci_move(&after_e4, moves[0]).is_ok());

        let best = lines.iter().position(|l| l.starts_with("bestmove")).unwrap();
        let ready = lines.iter().position(|l| l == "readyok").unwrap();
        assert!(best < ready);
        assert!(lines[best - 1].starts_with("info depth 1 "));
    }

    #[test]
    fn test_go_finds_mate_in_position() {
        let lines = session(
            "position fen r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4\n\
             go depth 2\nisready\nquit\n",
        );
        assert_eq!(bestmoves(&lines), vec!["h5f7"]);
    }

    #[test]
    fn test_stop_cancels_running_search() {
        let lines = session("go depth 9\nstop\nisready\nquit\n");
        assert_eq!(bestmoves(&lines), vec!["0000"]);
        assert_eq!(lines.last().map(String::as_str), Some("readyok"));
    }

    #[test]
    fn test_position_change_cancels_previous_go() {
        let lines = session("go depth 9\nposition startpos moves e2e4\ngo depth 1\nisready\nquit\n");
        let moves = bestmoves(&lines);
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0], "0000");
        assert_ne!(moves[1], "0000");
    }

    #[test]
    fn test_greedy_strategy_answers_synchronously() {
        let lines = session(
            "setoption name Strategy value greedy\n\
             position fen 7k/8/8/3q4/4P3/8/8/K7 w - - 0 1\ngo\nquit\n",
        );
        assert_eq!(bestmoves(&lines), vec!["e4d5"]);
    }

    #[test]
    fn test_quit_with_search_running_reports_once() {
        let lines = session("go depth 9\nquit\n");
        assert_eq!(bestmoves(&lines), vec!["0000"]);
    }

    #[test]
    fn test_parse_position_startpos() {
        let mut board = parse_position_fen("8/8/8/8/8/8/8/K6k w - - 0 1");
        let tokens = vec!["position", "startpos"];
        parse_position(&tokens, &mut board).unwrap();
        assert_eq!(rules::render(&board), rules::render(&Chess::default()));
    }

    #[test]
    fn test_parse_position_startpos_with_moves() {
        let mut board = Chess::default();
        let tokens = vec!["position", "startpos", "moves", "e2e4", "e7e5"];
        parse_position(&tokens, &mut board).unwrap();
        assert_ne!(rules::render(&board), rules::render(&Chess::default()));
        assert_eq!(board.fullmoves().get(), 2);
    }

    #[test]
    fn test_parse_position_fen() {
        let mut board = Chess::default();
        let tokens = vec![
            "position", "fen",
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR",
            "b", "KQkq", "-", "0", "1",
        ];
        parse_position(&tokens, &mut board).unwrap();
        assert_eq!(board.turn(), shakmaty::Color::Black);
    }

    #[test]
    fn test_parse_position_illegal_move_keeps_board() {
        let mut board = Chess::default();
        let tokens = vec!["position", "startpos", "moves", "e2e4", "e2e4"];
        assert!(parse_position(&tokens, &mut board).is_err());
        assert_eq!(board.turn(), shakmaty::Color::White);
        assert_eq!(rules::render(&board), rules::render(&Chess::default()));
    }

    #[test]
    fn test_parse_go_depth() {
        let tokens = vec!["go", "depth", "6"];
        assert_eq!(parse_go(&tokens).depth, Some(6));
    }

    #[test]
    fn test_parse_go_ignores_clock() {
        let tokens = vec!["go", "wtime", "60000", "btime", "60000", "depth", "2"];
        assert_eq!(parse_go(&tokens).depth, Some(2));
        assert_eq!(parse_go(&["go", "infinite"]).depth, None);
        assert_eq!(parse_go(&["go", "depth", "0"]).depth, None);
    }

    #[test]
    fn test_parse_setoption_depth() {
        let mut config = EngineConfig::default();
        parse_setoption(&["setoption", "name", "Depth", "value", "5"], &mut config);
        assert_eq!(config.depth, 5);
        parse_setoption(&["setoption", "name", "Depth", "value", "99"], &mut config);
        assert_eq!(config.depth, 10);
    }

    #[test]
    fn test_parse_setoption_strategy() {
        let mut config = EngineConfig::default();
        parse_setoption(&["setoption", "name", "Strategy", "value", "greedy"], &mut config);
        assert_eq!(config.strategy, Strategy::Greedy);
        parse_setoption(&["setoption", "name", "Strategy", "value", "nonsense"], &mut config);
        assert_eq!(config.strategy, Strategy::Greedy);
    }

    fn parse_position_fen(fen: &str) -> Chess {
        rules::parse_fen(fen).unwrap()
    }
}
