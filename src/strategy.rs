use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::SearchError;
use crate::evaluation::capture_value;
use crate::root::choose_move;
use crate::rules::Rules;
use crate::search::SearchState;
use crate::types::{Score, Strategy};

/// Any legal move, uniformly.
pub fn random_move<R: Rules, G: Rng + ?Sized>(
    rules: &R,
    pos: &R::Position,
    rng: &mut G,
) -> Result<R::Move, SearchError> {
    let moves = rules.legal_moves(pos).map_err(SearchError::rules)?;
    moves
        .as_ref()
        .choose(rng)
        .cloned()
        .ok_or(SearchError::NoLegalMoves)
}

/// The capture of the most valuable piece, first one on ties. Falls back to
/// a random move when nothing can be taken.
pub fn greedy_move<R: Rules, G: Rng + ?Sized>(
    rules: &R,
    pos: &R::Position,
    rng: &mut G,
) -> Result<R::Move, SearchError> {
    let moves = rules.legal_moves(pos).map_err(SearchError::rules)?;

    let mut best: Option<(&R::Move, Score)> = None;
    for mv in moves.as_ref() {
        if let Some(role) = rules.captured(pos, mv) {
            let value = capture_value(role);
            if best.is_none_or(|(_, v)| value > v) {
                best = Some((mv, value));
            }
        }
    }

    match best {
        Some((mv, _)) => Ok(mv.clone()),
        None => random_move(rules, pos, rng),
    }
}

/// Picks a reply for the side to move according to `strategy`.
pub fn pick_move<R: Rules, G: Rng + ?Sized>(
    strategy: Strategy,
    rules: &R,
    pos: &R::Position,
    depth: u8,
    rng: &mut G,
) -> Result<R::Move, SearchError> {
    match strategy {
        Strategy::Random => random_move(rules, pos, rng),
        Strategy::Greedy => greedy_move(rules, pos, rng),
        Strategy::AlphaBeta => {
            let mut state = SearchState::new();
            Ok(choose_move(rules, &mut state, pos, depth)?.best_move)
        }
    }
}
