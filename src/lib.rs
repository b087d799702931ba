//! Depth-limited alpha-beta move selection for chess.
//!
//! The rules of the game live behind [`rules::Rules`]; [`rules::ChessRules`]
//! plugs in `shakmaty`. [`root::choose_move`] is the entry point.

pub mod error;
pub mod evaluation;
pub mod play;
pub mod root;
pub mod rules;
pub mod search;
pub mod strategy;
pub mod types;
pub mod uci;
pub mod worker;

pub use error::SearchError;
pub use root::choose_move;
pub use rules::{ChessRules, Rules};
pub use search::SearchState;
pub use types::{EngineConfig, Score, ScoredMove, SearchResult, SearchWindow, Side, Strategy};
