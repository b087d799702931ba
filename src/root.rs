use tracing::{debug, info};

use crate::error::SearchError;
use crate::evaluation::score_transition;
use crate::rules::Rules;
use crate::search::{alpha_beta, SearchState};
use crate::types::{ScoredMove, SearchResult, SearchWindow, Side};

/// Scores every root move: its own immediate score for the side to move
/// plus a full-window search of the reply tree. Enumeration order is kept.
pub fn score_root_moves<R: Rules>(
    rules: &R,
    state: &mut SearchState,
    pos: &R::Position,
    max_depth: u8,
) -> Result<Vec<ScoredMove<R::Move>>, SearchError> {
    if max_depth == 0 {
        return Err(SearchError::DepthTooLow);
    }

    let moves = rules.legal_moves(pos).map_err(SearchError::rules)?;
    let mut scored = Vec::with_capacity(moves.as_ref().len());

    for mv in moves.as_ref() {
        let child = rules.play(pos, mv).map_err(SearchError::rules)?;
        let immediate = score_transition(rules, pos, mv, &child, Side::Maximizing);
        let below = alpha_beta(
            rules,
            state,
            &child,
            max_depth,
            1,
            Side::Minimizing,
            SearchWindow::FULL,
        )?;
        debug!(mv = %rules.notation(mv), immediate, below, "scored root move");
        scored.push(ScoredMove {
            mv: mv.clone(),
            score: immediate + below,
        });
    }

    Ok(scored)
}

/// Picks the root move with the strictly greatest score; the first one seen
/// wins ties.
pub fn choose_move<R: Rules>(
    rules: &R,
    state: &mut SearchState,
    pos: &R::Position,
    max_depth: u8,
) -> Result<SearchResult<R::Move>, SearchError> {
    let scored = score_root_moves(rules, state, pos, max_depth)?;

    let mut iter = scored.into_iter();
    let mut best = iter.next().ok_or(SearchError::NoLegalMoves)?;
    for candidate in iter {
        if candidate.score > best.score {
            best = candidate;
        }
    }

    info!(
        best = %rules.notation(&best.mv),
        score = best.score,
        depth = max_depth,
        nodes = state.nodes,
        "search complete"
    );

    Ok(SearchResult {
        best_move: best.mv,
        score: best.score,
        depth: max_depth,
        nodes: state.nodes,
    })
}
