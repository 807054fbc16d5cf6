use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::error::{PuzzleError, Result};
use crate::piece::{Piece, PieceId, PieceMut};
use crate::puzzle::Puzzle;
use crate::structure::Edge;
use crate::vector::Axis;

/// Extra predicate two pieces must satisfy before connecting.
pub type Requirement = Rc<dyn Fn(&Piece, &Piece) -> bool>;

/// Proximity, matching and attraction rules along one axis.
///
/// The horizontal connector links a piece's right edge to the left edge of
/// the next one; the vertical connector links down to up.
#[derive(Clone)]
pub struct Connector {
    axis: Axis,
    forward: Edge,
    backward: Edge,
    requirement: Option<Requirement>,
}

impl Connector {
    pub fn horizontal() -> Self {
        Connector {
            axis: Axis::Horizontal,
            forward: Edge::Right,
            backward: Edge::Left,
            requirement: None,
        }
    }

    pub fn vertical() -> Self {
        Connector {
            axis: Axis::Vertical,
            forward: Edge::Down,
            backward: Edge::Up,
            requirement: None,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn forward(&self) -> Edge {
        self.forward
    }

    pub fn backward(&self) -> Edge {
        self.backward
    }

    pub fn attach_requirement(&mut self, requirement: Requirement) {
        self.requirement = Some(requirement);
    }

    pub fn clear_requirement(&mut self) {
        self.requirement = None;
    }

    pub fn forward_connection(&self, piece: &Piece) -> Option<PieceId> {
        piece.connection(self.forward)
    }

    pub fn backward_connection(&self, piece: &Piece) -> Option<PieceId> {
        piece.connection(self.backward)
    }

    /// Whether `one`'s forward anchor lies within `proximity` of `other`'s
    /// backward anchor, tested independently on each axis.
    pub fn close_to(&self, puzzle: &Puzzle, one: PieceId, other: PieceId, proximity: f64) -> bool {
        match (
            puzzle.edge_anchor(one, self.forward),
            puzzle.edge_anchor(other, self.backward),
        ) {
            (Some(forward), Some(backward)) => forward.equal(backward, proximity),
            _ => false,
        }
    }

    pub fn matches(&self, one: &Piece, other: &Piece) -> bool {
        one.structure()
            .insert(self.forward)
            .matches(other.structure().insert(self.backward))
    }

    pub fn requirement_met(&self, one: &Piece, other: &Piece) -> bool {
        self.requirement.as_ref().is_none_or(|req| req(one, other))
    }

    pub fn can_connect_with(
        &self,
        puzzle: &Puzzle,
        one: PieceId,
        other: PieceId,
        proximity: f64,
    ) -> bool {
        let (Some(a), Some(b)) = (puzzle.piece(one), puzzle.piece(other)) else {
            return false;
        };
        self.close_to(puzzle, one, other, proximity)
            && self.matches(a, b)
            && self.requirement_met(a, b)
    }

    /// Move `iron`, and everything rigidly attached to it, until its edge
    /// touches the facing edge of `magnet`. `back` swaps the two roles.
    ///
    /// The edge pair is picked by comparing centres along the axis; when
    /// both centres are aligned the iron's forward edge is used.
    pub fn attract(&self, puzzle: &mut Puzzle, iron: PieceId, magnet: PieceId, back: bool) {
        let (iron, magnet) = if back { (magnet, iron) } else { (iron, magnet) };
        let (Some(iron_center), Some(magnet_center)) = (
            puzzle.piece(iron).and_then(Piece::central_anchor),
            puzzle.piece(magnet).and_then(Piece::central_anchor),
        ) else {
            return;
        };
        let (iron_edge, magnet_edge) =
            if self.axis.of(iron_center) > self.axis.of(magnet_center) {
                (self.backward, self.forward)
            } else {
                (self.forward, self.backward)
            };
        let (Some(from), Some(to)) = (
            puzzle.edge_anchor(iron, iron_edge),
            puzzle.edge_anchor(magnet, magnet_edge),
        ) else {
            return;
        };
        let delta = from.diff(to);
        let mut visited = HashSet::from([magnet]);
        PieceMut::new(puzzle, iron).push_visiting(delta.x, delta.y, false, &mut visited);
    }

    pub fn connect_with(
        &self,
        puzzle: &mut Puzzle,
        one: PieceId,
        other: PieceId,
        proximity: f64,
        back: bool,
    ) -> Result<()> {
        if !self.can_connect_with(puzzle, one, other, proximity) {
            return Err(PuzzleError::CannotConnect { edge: self.forward });
        }
        if puzzle.pieces[one.0].connection(self.forward) == Some(other) {
            return Ok(());
        }
        self.unlink_stale(puzzle, one, other);
        self.attract(puzzle, one, other, back);
        puzzle.pieces[one.0].set_connection(self.forward, Some(other));
        puzzle.pieces[other.0].set_connection(self.backward, Some(one));
        debug!(piece = %one, other = %other, edge = %self.forward, "connected");
        PieceMut::new(puzzle, one).fire_connect(other);
        Ok(())
    }

    // a slot taken over by a new neighbour drops its old link on both sides,
    // before attraction can drag the old neighbour along
    fn unlink_stale(&self, puzzle: &mut Puzzle, one: PieceId, other: PieceId) {
        if let Some(stale) = puzzle.pieces[one.0].connection(self.forward) {
            puzzle.pieces[stale.0].set_connection(self.backward, None);
            puzzle.pieces[one.0].set_connection(self.forward, None);
        }
        if let Some(stale) = puzzle.pieces[other.0].connection(self.backward) {
            puzzle.pieces[stale.0].set_connection(self.forward, None);
            puzzle.pieces[other.0].set_connection(self.backward, None);
        }
    }

    /// A movement of `delta` along this axis is open unless it presses into
    /// a connected neighbour.
    pub fn open_movement(&self, piece: &Piece, delta: f64) -> bool {
        (delta > 0.0 && self.forward_connection(piece).is_none())
            || (delta < 0.0 && self.backward_connection(piece).is_none())
            || delta == 0.0
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("axis", &self.axis)
            .field("forward", &self.forward)
            .field("backward", &self.backward)
            .field("requirement", &self.requirement.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceConfig;
    use crate::settings::PuzzleSettings;
    use crate::structure::Structure;
    use crate::vector::Vector;

    fn pair(code_a: &str, code_b: &str, b_at: (f64, f64)) -> (Puzzle, PieceId, PieceId) {
        let mut puzzle = Puzzle::new(PuzzleSettings::default().with_proximity(1.0));
        let a = puzzle.new_piece(
            Structure::deserialize(code_a).unwrap(),
            PieceConfig {
                central_anchor: Some(Vector::ZERO),
                ..Default::default()
            },
        );
        let b = puzzle.new_piece(
            Structure::deserialize(code_b).unwrap(),
            PieceConfig {
                central_anchor: Some(b_at.into()),
                ..Default::default()
            },
        );
        (puzzle, a, b)
    }

    #[test]
    fn proximity_is_per_axis() {
        let (puzzle, a, b) = pair("T---", "--S-", (5.0, 1.0));
        let h = Connector::horizontal();
        assert!(h.close_to(&puzzle, a, b, 1.0));
        assert!(!h.close_to(&puzzle, a, b, 0.5));
        assert!(!h.close_to(&puzzle, b, a, 1.0));
    }

    #[test]
    fn match_uses_forward_and_backward_inserts() {
        let (puzzle, a, b) = pair("-T--", "---S", (0.0, 4.0));
        let v = Connector::vertical();
        let (pa, pb) = (puzzle.piece(a).unwrap(), puzzle.piece(b).unwrap());
        assert!(v.matches(pa, pb));
        assert!(!v.matches(pb, pa));
        assert!(!Connector::horizontal().matches(pa, pb));
    }

    #[test]
    fn requirement_can_veto() {
        let (puzzle, a, b) = pair("T---", "--S-", (4.0, 0.0));
        let mut h = Connector::horizontal();
        assert!(h.can_connect_with(&puzzle, a, b, 1.0));
        h.attach_requirement(Rc::new(|one: &Piece, _: &Piece| one.id().is_some()));
        assert!(!h.can_connect_with(&puzzle, a, b, 1.0));
        h.clear_requirement();
        assert!(h.can_connect_with(&puzzle, a, b, 1.0));
    }

    #[test]
    fn attract_moves_only_the_iron() {
        let (mut puzzle, a, b) = pair("T---", "--S-", (6.0, 2.0));
        Connector::horizontal().attract(&mut puzzle, b, a, false);
        assert_eq!(puzzle.piece(a).unwrap().central_anchor(), Some(Vector::ZERO));
        assert_eq!(
            puzzle.piece(b).unwrap().central_anchor(),
            Some(Vector::new(4.0, 0.0))
        );
    }

    #[test]
    fn open_movement_blocks_pressing_into_neighbors() {
        let (mut puzzle, a, b) = pair("T---", "--S-", (4.0, 0.0));
        let h = Connector::horizontal();
        h.connect_with(&mut puzzle, a, b, 1.0, false).unwrap();
        let pa = puzzle.piece(a).unwrap();
        let pb = puzzle.piece(b).unwrap();
        assert!(!h.open_movement(pa, 1.0));
        assert!(h.open_movement(pa, -1.0));
        assert!(h.open_movement(pa, 0.0));
        assert!(h.open_movement(pb, 1.0));
        assert!(!h.open_movement(pb, -1.0));
    }

    #[test]
    fn taking_over_a_slot_leaves_the_old_neighbour_behind() {
        let (mut puzzle, a, b) = pair("T---", "--S-", (4.0, 0.0));
        let h = Connector::horizontal();
        h.connect_with(&mut puzzle, a, b, 1.0, false).unwrap();
        // b wanders off without being disconnected
        puzzle.piece_mut(b).unwrap().translate(16.0, 0.0, true);
        let c = puzzle.new_piece(
            Structure::deserialize("--S-").unwrap(),
            PieceConfig {
                central_anchor: Some(Vector::new(4.5, 0.0)),
                ..Default::default()
            },
        );

        h.connect_with(&mut puzzle, a, c, 1.0, false).unwrap();

        assert_eq!(
            puzzle.piece(a).unwrap().central_anchor(),
            Some(Vector::new(0.5, 0.0))
        );
        assert_eq!(
            puzzle.piece(b).unwrap().central_anchor(),
            Some(Vector::new(20.0, 0.0))
        );
        assert_eq!(puzzle.piece(a).unwrap().right_connection(), Some(c));
        assert_eq!(puzzle.piece(c).unwrap().left_connection(), Some(a));
        assert_eq!(puzzle.piece(b).unwrap().left_connection(), None);
    }
}
