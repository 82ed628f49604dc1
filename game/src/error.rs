use thiserror::Error;

use crate::position::Position;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown cell code {field:?} at row {row}, col {col}")]
    UnknownCell {
        row: usize,
        col: usize,
        field: String,
    },
    #[error("invalid board size {rows}x{cols}")]
    Dimensions { rows: usize, cols: usize },
    #[error("token type count {0} is outside 3..=8")]
    TokenTypes(u8),
    #[error("{kind} entry at row {row}, col {col} is outside the board")]
    OutOfBounds {
        kind: &'static str,
        row: usize,
        col: usize,
    },
    #[error("{kind} spread probability {probability} is outside 0..=1")]
    Probability { kind: &'static str, probability: f64 },
}

/// Why a player action was not started.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("a resolution sequence is still running")]
    Busy,
    #[error("{0:?} is outside the board")]
    OutOfBounds(Position),
    #[error("cells are not orthogonal neighbors")]
    NotAdjacent,
    #[error("a blocker prevents this swap")]
    Blocked,
    #[error("the swap produces no match")]
    NoMatch,
    #[error("no special token at {0:?}")]
    NotSpecial(Position),
    #[error("no token at {0:?}")]
    Empty(Position),
}
