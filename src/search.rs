use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::SearchError;
use crate::evaluation::score_transition;
use crate::rules::Rules;
use crate::types::{Score, SearchWindow, Side};

/// Mutable search state shared across recursion
pub struct SearchState {
    pub nodes: u64,
    pub stop: Arc<AtomicBool>,
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            nodes: 0,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// State whose search can be stopped via `stop` from another thread.
    pub fn with_stop(stop: Arc<AtomicBool>) -> Self {
        Self { nodes: 0, stop }
    }

    fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

/// Every child of `pos` with the immediate score of the move leading to it.
fn expand<R: Rules>(
    rules: &R,
    pos: &R::Position,
    side: Side,
) -> Result<Vec<(R::Position, Score)>, SearchError> {
    let moves = rules.legal_moves(pos).map_err(SearchError::rules)?;
    let mut children = Vec::with_capacity(moves.as_ref().len());
    for mv in moves.as_ref() {
        let child = rules.play(pos, mv).map_err(SearchError::rules)?;
        let score = score_transition(rules, pos, mv, &child, side);
        children.push((child, score));
    }
    Ok(children)
}

/// Depth-limited minimax with alpha-beta pruning.
///
/// Scores are cumulative: each child contributes its own move's immediate
/// score plus whatever the subtree below it returns. At `max_depth` the
/// immediate scores are final. A node with no legal moves scores 0.
///
/// The child's window is shifted by its immediate score so both bounds stay
/// in the child's units; the result with a full window equals [`minimax`].
/// The stop flag is checked after each child is folded in.
pub fn alpha_beta<R: Rules>(
    rules: &R,
    state: &mut SearchState,
    pos: &R::Position,
    max_depth: u8,
    depth: u8,
    side: Side,
    mut window: SearchWindow,
) -> Result<Score, SearchError> {
    state.nodes += 1;

    let children = expand(rules, pos, side)?;
    if children.is_empty() {
        return Ok(0);
    }

    let leaf = depth >= max_depth;
    let mut best = match side {
        Side::Maximizing => Score::MIN,
        Side::Minimizing => Score::MAX,
    };

    for (child, immediate) in &children {
        let score = if leaf {
            *immediate
        } else {
            let below = alpha_beta(
                rules,
                state,
                child,
                max_depth,
                depth + 1,
                !side,
                window.shifted(*immediate),
            )?;
            immediate + below
        };

        match side {
            Side::Maximizing => {
                best = best.max(score);
                window.alpha = window.alpha.max(best);
            }
            Side::Minimizing => {
                best = best.min(score);
                window.beta = window.beta.min(best);
            }
        }

        if state.is_stopped() {
            return Err(SearchError::Cancelled);
        }
        if window.is_closed() {
            break;
        }
    }

    Ok(best)
}

/// Exhaustive minimax over the same tree and scores as [`alpha_beta`].
pub fn minimax<R: Rules>(
    rules: &R,
    state: &mut SearchState,
    pos: &R::Position,
    max_depth: u8,
    depth: u8,
    side: Side,
) -> Result<Score, SearchError> {
    state.nodes += 1;

    let children = expand(rules, pos, side)?;
    if children.is_empty() {
        return Ok(0);
    }

    let mut scores = Vec::with_capacity(children.len());
    for (child, immediate) in &children {
        let score = if depth >= max_depth {
            *immediate
        } else {
            immediate + minimax(rules, state, child, max_depth, depth + 1, !side)?
        };
        scores.push(score);
    }

    // non-empty, checked above
    let best = match side {
        Side::Maximizing => scores.iter().copied().max(),
        Side::Minimizing => scores.iter().copied().min(),
    };
    Ok(best.unwrap_or(0))
}
