use serde::{Deserialize, Serialize};

use crate::piece::PieceId;
use crate::puzzle::Puzzle;
use crate::vector::Axis;

/// How a dragged piece treats the pieces connected to it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DragMode {
    /// Break away only when the movement is open on both axes.
    #[default]
    TryDisconnection,
    /// Always break away before moving.
    ForceDisconnection,
    /// Never break away; the whole cluster follows.
    ForceConnection,
}

impl DragMode {
    pub fn drag_should_disconnect(self, puzzle: &Puzzle, piece: PieceId, dx: f64, dy: f64) -> bool {
        match self {
            DragMode::TryDisconnection => {
                let Some(p) = puzzle.piece(piece) else {
                    return false;
                };
                puzzle
                    .connector_for(piece, Axis::Horizontal)
                    .open_movement(p, dx)
                    && puzzle
                        .connector_for(piece, Axis::Vertical)
                        .open_movement(p, dy)
            }
            DragMode::ForceDisconnection => true,
            DragMode::ForceConnection => false,
        }
    }
}
