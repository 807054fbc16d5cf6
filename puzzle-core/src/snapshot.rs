//! In-memory snapshot format.
//!
//! ```json
//! {
//!   "pieceRadius": {"x": 2, "y": 2},
//!   "proximity": 1,
//!   "pieces": [
//!     {
//!       "centralAnchor": {"x": 4, "y": 4},
//!       "structure": "TS--",
//!       "metadata": {"id": "1"},
//!       "connections": {"right": {"id": "2"}, "down": null, "left": null, "up": null}
//!     }
//!   ]
//! }
//! ```
//!
//! Connections are informational: importing rebuilds them with
//! [`Puzzle::autoconnect`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PuzzleError, Result};
use crate::piece::{Metadata, Piece, PieceConfig, PieceId};
use crate::puzzle::Puzzle;
use crate::settings::PuzzleSettings;
use crate::structure::{Edge, Structure};
use crate::vector::Vector;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleDump {
    pub piece_radius: Vector,
    pub proximity: f64,
    pub pieces: Vec<PieceDump>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceDump {
    pub central_anchor: Vector,
    pub structure: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<ConnectionsDump>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionsDump {
    pub right: Option<PieceRef>,
    pub down: Option<PieceRef>,
    pub left: Option<PieceRef>,
    pub up: Option<PieceRef>,
}

impl ConnectionsDump {
    fn refs(&self) -> impl Iterator<Item = &PieceRef> {
        [&self.right, &self.down, &self.left, &self.up]
            .into_iter()
            .flatten()
    }
}

/// Neighbour reference by metadata id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieceRef {
    pub id: Option<String>,
}

impl Puzzle {
    /// Dump every piece. `compact` drops the connections. Fails if a piece
    /// was never placed.
    pub fn export(&self, compact: bool) -> Result<PuzzleDump> {
        let pieces = self
            .piece_ids()
            .map(|id| self.export_piece(id, compact))
            .collect::<Result<Vec<_>>>()?;
        Ok(PuzzleDump {
            piece_radius: self.piece_radius(),
            proximity: self.proximity(),
            pieces,
        })
    }

    fn export_piece(&self, id: PieceId, compact: bool) -> Result<PieceDump> {
        let piece = self.piece(id).ok_or(PuzzleError::UnknownPiece(id))?;
        let central_anchor = piece
            .central_anchor()
            .ok_or(PuzzleError::NotCentered(id))?;
        let neighbor = |edge: Edge| {
            piece.connection(edge).map(|n| PieceRef {
                id: self
                    .piece(n)
                    .and_then(Piece::id)
                    .map(str::to_owned),
            })
        };
        let connections = (!compact).then(|| ConnectionsDump {
            right: neighbor(Edge::Right),
            down: neighbor(Edge::Down),
            left: neighbor(Edge::Left),
            up: neighbor(Edge::Up),
        });
        Ok(PieceDump {
            central_anchor,
            structure: piece.structure().serialize(),
            metadata: piece.metadata().clone(),
            connections,
        })
    }

    /// Rebuild a puzzle from a dump and reconnect whatever fits.
    pub fn import(dump: &PuzzleDump) -> Result<Puzzle> {
        let settings = PuzzleSettings::default()
            .with_piece_radius(dump.piece_radius)
            .with_proximity(dump.proximity);
        let mut puzzle = Puzzle::new(settings);
        let known: HashSet<&str> = dump
            .pieces
            .iter()
            .filter_map(|p| p.metadata.id.as_deref())
            .collect();

        for piece in &dump.pieces {
            let structure = Structure::deserialize(&piece.structure)?;
            let dangling = piece
                .connections
                .iter()
                .flat_map(|c| c.refs())
                .filter(|r| !r.id.as_deref().is_some_and(|id| known.contains(id)))
                .count();
            if dangling > 0 {
                warn!(
                    piece = piece.metadata.id.as_deref().unwrap_or("?"),
                    dangling, "snapshot references unknown neighbours"
                );
            }
            puzzle.new_piece(
                structure,
                PieceConfig {
                    central_anchor: Some(piece.central_anchor),
                    size: None,
                    metadata: piece.metadata.clone(),
                },
            );
        }
        puzzle.autoconnect();
        debug!(pieces = puzzle.len(), "imported");
        Ok(puzzle)
    }

    pub fn to_json(&self, compact: bool) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export(compact)?)?)
    }

    pub fn from_json(json: &str) -> Result<Puzzle> {
        let dump: PuzzleDump = serde_json::from_str(json)?;
        Puzzle::import(&dump)
    }
}
