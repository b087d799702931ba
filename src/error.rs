use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("no legal moves available")]
    NoLegalMoves,
    #[error("move {mv} is not legal in this position")]
    IllegalMove { mv: String },
    #[error("search depth must be at least 1")]
    DepthTooLow,
    #[error("search was cancelled")]
    Cancelled,
    #[error("search worker panicked")]
    WorkerPanicked,
    #[error("rules engine failure")]
    Rules(#[source] BoxError),
}

impl SearchError {
    pub fn rules<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SearchError::Rules(Box::new(err))
    }
}
