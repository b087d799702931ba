use shakmaty::Role;

use crate::error::SearchError;
use crate::rules::Rules;
use crate::types::{Score, Side};

pub const CHECK_BONUS: Score = 200;
pub const CHECKMATE_BONUS: Score = 20_000;
/// Charged on every ply so shorter forced lines win.
pub const PLY_DECAY: Score = 1;

/// Material value of a captured piece. Kings are never captured.
pub fn capture_value(role: Role) -> Score {
    match role {
        Role::Pawn => 10,
        Role::Knight => 30,
        Role::Bishop => 30,
        Role::Rook => 50,
        Role::Queen => 90,
        Role::King => 0,
    }
}

/// Scores `mv` played from `pos` on behalf of `side`.
///
/// Checkmate beats check, and check beats the capture value. The raw score
/// is then decayed by one ply: the maximizer contributes `score - 1`, the
/// minimizer `-score - 1`.
///
/// `mv` must come from the legal move list of `pos`; anything else is
/// reported as [`SearchError::IllegalMove`].
pub fn evaluate<R: Rules>(
    rules: &R,
    pos: &R::Position,
    mv: &R::Move,
    side: Side,
) -> Result<Score, SearchError> {
    if !rules.is_legal(pos, mv) {
        return Err(SearchError::IllegalMove {
            mv: rules.notation(mv),
        });
    }
    let child = rules.play(pos, mv).map_err(SearchError::rules)?;
    Ok(score_transition(rules, pos, mv, &child, side))
}

/// Same scoring as [`evaluate`], for a move already applied to give `child`.
/// The search uses this so each node plays its moves once.
pub(crate) fn score_transition<R: Rules>(
    rules: &R,
    pos: &R::Position,
    mv: &R::Move,
    child: &R::Position,
    side: Side,
) -> Score {
    let score = if rules.is_checkmate(child) {
        CHECKMATE_BONUS
    } else if rules.is_check(child) {
        CHECK_BONUS
    } else {
        rules.captured(pos, mv).map_or(0, capture_value)
    };
    decay(score, side)
}

fn decay(score: Score, side: Side) -> Score {
    match side {
        Side::Maximizing => score - PLY_DECAY,
        Side::Minimizing => -score - PLY_DECAY,
    }
}
