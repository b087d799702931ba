use std::fmt;

use arrayvec::ArrayVec;
use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, File, Move, Position as _, Rank, Role, Square};
use thiserror::Error;

/// The move-generation side of the game. The search never inspects a
/// position itself; everything it needs to know goes through here.
///
/// Implementations must enumerate moves in the same order every time they
/// are asked about an unchanged position, and `play` must leave its input
/// untouched.
pub trait Rules {
    type Position: Clone;
    type Move: Clone + fmt::Debug;
    type MoveList: AsRef<[Self::Move]>;
    type Error: std::error::Error + Send + Sync + 'static;

    fn legal_moves(&self, pos: &Self::Position) -> Result<Self::MoveList, Self::Error>;

    /// Returns a new position with `mv` applied.
    fn play(&self, pos: &Self::Position, mv: &Self::Move) -> Result<Self::Position, Self::Error>;

    fn is_legal(&self, pos: &Self::Position, mv: &Self::Move) -> bool;

    /// Piece type removed from the board by `mv`, if it is a capture.
    fn captured(&self, pos: &Self::Position, mv: &Self::Move) -> Option<Role>;

    /// Side to move is in check.
    fn is_check(&self, pos: &Self::Position) -> bool;

    fn is_checkmate(&self, pos: &Self::Position) -> bool;

    /// Caller-facing text for a move.
    fn notation(&self, mv: &Self::Move) -> String;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },
    #[error("illegal move {0}")]
    IllegalMove(String),
    #[error("cannot read move '{0}'")]
    UnparsableMove(String),
}

/// Standard chess, backed by `shakmaty`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChessRules;

impl Rules for ChessRules {
    type Position = Chess;
    type Move = Move;
    type MoveList = ArrayVec<Move, 256>;
    type Error = RulesError;

    fn legal_moves(&self, pos: &Chess) -> Result<Self::MoveList, RulesError> {
        Ok(pos.legal_moves())
    }

    fn play(&self, pos: &Chess, mv: &Move) -> Result<Chess, RulesError> {
        pos.clone()
            .play(mv)
            .map_err(|_| RulesError::IllegalMove(uci_string(mv)))
    }

    fn is_legal(&self, pos: &Chess, mv: &Move) -> bool {
        pos.is_legal(mv)
    }

    fn captured(&self, _pos: &Chess, mv: &Move) -> Option<Role> {
        mv.capture()
    }

    fn is_check(&self, pos: &Chess) -> bool {
        pos.is_check()
    }

    fn is_checkmate(&self, pos: &Chess) -> bool {
        pos.is_checkmate()
    }

    fn notation(&self, mv: &Move) -> String {
        uci_string(mv)
    }
}

pub fn uci_string(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}

pub fn parse_fen(fen: &str) -> Result<Chess, RulesError> {
    let invalid = |reason: String| RulesError::InvalidFen {
        fen: fen.to_string(),
        reason,
    };
    let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| invalid(format!("{e}")))
}

/// Parses a long-algebraic move ("e2e4", "a7a8q") and checks it against `pos`.
pub fn parse_uci_move(pos: &Chess, text: &str) -> Result<Move, RulesError> {
    let uci: UciMove = text
        .parse()
        .map_err(|_| RulesError::UnparsableMove(text.to_string()))?;
    uci.to_move(pos)
        .map_err(|_| RulesError::IllegalMove(text.to_string()))
}

/// Parses standard algebraic notation ("Nf3", "exd5", "O-O") against `pos`.
pub fn parse_san(pos: &Chess, text: &str) -> Result<Move, RulesError> {
    let san: San = text
        .trim_end_matches(['+', '#'])
        .parse()
        .map_err(|_| RulesError::UnparsableMove(text.to_string()))?;
    san.to_move(pos)
        .map_err(|_| RulesError::IllegalMove(text.to_string()))
}

pub fn san_string(pos: &Chess, mv: &Move) -> String {
    San::from_move(pos, mv).to_string()
}

/// Text diagram of the board, rank 8 at the top, '.' for empty squares.
pub fn render(pos: &Chess) -> String {
    let board = pos.board();
    let mut out = String::with_capacity(8 * 18 + 20);

    for &rank in Rank::ALL.iter().rev() {
        out.push(rank.char());
        out.push(' ');
        for (i, &file) in File::ALL.iter().enumerate() {
            let sq = Square::from_coords(file, rank);
            out.push(board.piece_at(sq).map_or('.', |p| p.char()));
            if i < 7 {
                out.push(' ');
            }
        }
        out.push('\n');
    }
    out.push_str("  a b c d e f g h\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_has_twenty_moves() {
        let moves = ChessRules.legal_moves(&Chess::default()).unwrap();
        assert_eq!(moves.len(), 20);
    }

    #[test]
    fn test_enumeration_order_is_stable() {
        let pos = parse_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
        let first = ChessRules.legal_moves(&pos).unwrap();
        let second = ChessRules.legal_moves(&pos).unwrap();
        assert_eq!(first.as_slice(), second.as_slice());
    }

    #[test]
    fn test_play_leaves_input_untouched() {
        let pos = Chess::default();
        let mv = parse_uci_move(&pos, "e2e4").unwrap();
        let child = ChessRules.play(&pos, &mv).unwrap();
        assert_eq!(ChessRules.legal_moves(&pos).unwrap().len(), 20);
        assert_ne!(render(&pos), render(&child));
    }

    #[test]
    fn test_captured_role() {
        let pos = parse_fen("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mv = parse_uci_move(&pos, "e4d5").unwrap();
        assert_eq!(ChessRules.captured(&pos, &mv), Some(Role::Queen));
        let quiet = parse_uci_move(&pos, "e4e5").unwrap();
        assert_eq!(ChessRules.captured(&pos, &quiet), None);
    }

    #[test]
    fn test_en_passant_captures_pawn() {
        let pos = parse_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        let mv = parse_uci_move(&pos, "e5d6").unwrap();
        assert_eq!(ChessRules.captured(&pos, &mv), Some(Role::Pawn));
    }

    #[test]
    fn test_parse_uci_move_invalid() {
        let pos = Chess::default();
        assert_eq!(
            parse_uci_move(&pos, "e2e5"),
            Err(RulesError::IllegalMove("e2e5".to_string()))
        );
        assert!(matches!(
            parse_uci_move(&pos, "zz"),
            Err(RulesError::UnparsableMove(_))
        ));
    }

    #[test]
    fn test_parse_uci_move_promotion() {
        let pos = parse_fen("8/P7/8/8/8/8/8/K6k w - - 0 1").unwrap();
        let mv = parse_uci_move(&pos, "a7a8q").unwrap();
        assert_eq!(mv.promotion(), Some(Role::Queen));
        assert_eq!(ChessRules.notation(&mv), "a7a8q");
    }

    #[test]
    fn test_parse_san() {
        let pos = Chess::default();
        let mv = parse_san(&pos, "Nf3").unwrap();
        assert_eq!(uci_string(&mv), "g1f3");
        assert!(parse_san(&pos, "Ke2").is_err());
    }

    #[test]
    fn test_parse_fen_rejects_garbage() {
        assert!(matches!(
            parse_fen("not a fen"),
            Err(RulesError::InvalidFen { .. })
        ));
    }

    #[test]
    fn test_render_startpos() {
        let text = render(&Chess::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "8 r n b q k b n r");
        assert_eq!(lines[7], "1 R N B Q K B N R");
        assert_eq!(lines[8], "  a b c d e f g h");
    }

    #[test]
    fn test_check_and_mate_predicates() {
        // Fool's mate
        let pos = parse_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        assert!(ChessRules.is_check(&pos));
        assert!(ChessRules.is_checkmate(&pos));
        assert!(!ChessRules.is_check(&Chess::default()));
    }
}
