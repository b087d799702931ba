use std::fmt;
use std::ops::Not;
use std::str::FromStr;

pub type Score = i32;

/// Root window sentinels. Finite, and far above anything the evaluator can
/// accumulate over a realistic depth.
pub const SCORE_INFINITY: Score = 100_000;
pub const DEFAULT_DEPTH: u8 = 3;

/// Whose interest a score reflects, and which way a node optimizes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Side {
    Maximizing,
    Minimizing,
}

impl Not for Side {
    type Output = Side;

    fn not(self) -> Side {
        match self {
            Side::Maximizing => Side::Minimizing,
            Side::Minimizing => Side::Maximizing,
        }
    }
}

/// Alpha: what the maximizer can already guarantee on this path.
/// Beta: what the minimizer can already guarantee.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SearchWindow {
    pub alpha: Score,
    pub beta: Score,
}

impl SearchWindow {
    pub const FULL: SearchWindow = SearchWindow {
        alpha: -SCORE_INFINITY,
        beta: SCORE_INFINITY,
    };

    pub fn new(alpha: Score, beta: Score) -> Self {
        Self { alpha, beta }
    }

    /// True once no remaining sibling can change the outcome.
    pub fn is_closed(&self) -> bool {
        self.beta <= self.alpha
    }

    /// Re-expresses the window relative to a child whose own move already
    /// contributed `offset` to the parent's running total.
    pub fn shifted(&self, offset: Score) -> Self {
        Self {
            alpha: self.alpha - offset,
            beta: self.beta - offset,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoredMove<M> {
    pub mv: M,
    pub score: Score,
}

#[derive(Clone, Debug)]
pub struct SearchResult<M> {
    pub best_move: M,
    pub score: Score,
    pub depth: u8,
    pub nodes: u64,
}

/// How the engine picks its reply.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Strategy {
    Random,
    Greedy,
    #[default]
    AlphaBeta,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Random => "random",
            Strategy::Greedy => "greedy",
            Strategy::AlphaBeta => "alphabeta",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown strategy '{0}', expected random, greedy or alphabeta")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(Strategy::Random),
            "greedy" => Ok(Strategy::Greedy),
            "alphabeta" | "alpha-beta" | "minimax" => Ok(Strategy::AlphaBeta),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

pub struct EngineConfig {
    pub depth: u8,
    pub strategy: Strategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            strategy: Strategy::default(),
        }
    }
}
