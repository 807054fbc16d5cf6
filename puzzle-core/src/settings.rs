use serde::{Deserialize, Serialize};

use crate::vector::Vector;

/// Half and full extent of a piece.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub radius: Vector,
}

impl Size {
    pub fn from_radius(radius: Vector) -> Self {
        Size { radius }
    }

    pub fn from_diameter(diameter: Vector) -> Self {
        Size {
            radius: diameter.scale(0.5),
        }
    }

    pub fn diameter(&self) -> Vector {
        self.radius.scale(2.0)
    }
}

/// Puzzle wide defaults. Pieces fall back to these unless they carry their
/// own size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PuzzleSettings {
    pub piece_radius: Vector,
    /// Per-axis distance under which two complementary edges may connect.
    pub proximity: f64,
}

impl PuzzleSettings {
    pub fn with_piece_radius(mut self, radius: Vector) -> Self {
        self.piece_radius = radius;
        self
    }

    pub fn with_piece_diameter(mut self, diameter: Vector) -> Self {
        self.piece_radius = diameter.scale(0.5);
        self
    }

    pub fn with_proximity(mut self, proximity: f64) -> Self {
        self.proximity = proximity;
        self
    }

    pub fn piece_size(&self) -> Size {
        Size::from_radius(self.piece_radius)
    }
}

impl Default for PuzzleSettings {
    fn default() -> Self {
        PuzzleSettings {
            piece_radius: Vector::cast(2.0),
            proximity: 1.0,
        }
    }
}
