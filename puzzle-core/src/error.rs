use thiserror::Error;

use crate::piece::PieceId;
use crate::structure::Edge;

/// Failures raised synchronously by the assembly engine.
///
/// All of them are caller mistakes; nothing here is retried.
#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("piece has already been centered, use relocate_to instead")]
    AlreadyCentered,
    #[error("piece {0} has no central anchor yet")]
    NotCentered(PieceId),
    #[error("can not connect {edge}!")]
    CannotConnect { edge: Edge },
    #[error("structure code must be 4 chars, got {found}")]
    InvalidStructureCode { found: usize },
    #[error("max pieces count has not been specified")]
    MaxPiecesCountUnset,
    #[error("unknown piece {0}")]
    UnknownPiece(PieceId),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PuzzleError>;
