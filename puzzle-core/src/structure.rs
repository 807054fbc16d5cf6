use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PuzzleError, Result};
use crate::insert::Insert;

/// Edge of a piece, listed in structure code order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Right,
    Down,
    Left,
    Up,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Right, Edge::Down, Edge::Left, Edge::Up];

    pub fn opposite(self) -> Edge {
        match self {
            Edge::Right => Edge::Left,
            Edge::Down => Edge::Up,
            Edge::Left => Edge::Right,
            Edge::Up => Edge::Down,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Edge::Right => 0,
            Edge::Down => 1,
            Edge::Left => 2,
            Edge::Up => 3,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Edge::Right => "right",
            Edge::Down => "down",
            Edge::Left => "left",
            Edge::Up => "up",
        };
        f.write_str(name)
    }
}

/// Insert assignment of the four edges of a piece.
///
/// Adjacent pieces must carry matching inserts on their shared edge, but that
/// is only checked when they connect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Structure {
    pub up: Insert,
    pub down: Insert,
    pub left: Insert,
    pub right: Insert,
}

impl Structure {
    pub fn new(right: Insert, down: Insert, left: Insert, up: Insert) -> Self {
        Structure {
            up,
            down,
            left,
            right,
        }
    }

    pub fn insert(&self, edge: Edge) -> Insert {
        match edge {
            Edge::Right => self.right,
            Edge::Down => self.down,
            Edge::Left => self.left,
            Edge::Up => self.up,
        }
    }

    /// Four-char code in right, down, left, up order.
    pub fn serialize(&self) -> String {
        Edge::ALL
            .iter()
            .map(|edge| self.insert(*edge).to_char())
            .collect()
    }

    pub fn deserialize(code: &str) -> Result<Structure> {
        let chars: Vec<char> = code.chars().collect();
        if chars.len() != 4 {
            return Err(PuzzleError::InvalidStructureCode { found: chars.len() });
        }
        Ok(Structure::new(
            Insert::from_char(chars[0]),
            Insert::from_char(chars[1]),
            Insert::from_char(chars[2]),
            Insert::from_char(chars[3]),
        ))
    }
}

impl FromStr for Structure {
    type Err = PuzzleError;

    fn from_str(code: &str) -> Result<Self> {
        Structure::deserialize(code)
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}
