//! Pieces and the drag/connect/disconnect state machine.
//!
//! A [`Piece`] only knows its own data. Everything that walks the connection
//! graph goes through [`PieceMut`], a handle borrowing the owning [`Puzzle`].

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::connector::Connector;
use crate::error::{PuzzleError, Result};
use crate::puzzle::Puzzle;
use crate::settings::Size;
use crate::structure::{Edge, Structure};
use crate::validator::same_position;
use crate::vector::{Anchor, Axis, Vector};

/// Position of a piece inside its puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub usize);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub type TranslateListener = Box<dyn FnMut(PieceId, f64, f64)>;
/// Receives the piece firing the event and the neighbour involved.
pub type ConnectionListener = Box<dyn FnMut(PieceId, PieceId)>;

/// Free-form annotations carried by a piece.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_position: Option<Vector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_position: Option<Vector>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Metadata {
    pub fn with_id(id: impl Into<String>) -> Self {
        Metadata {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Fields present in `other` win.
    pub fn merge(&mut self, other: Metadata) {
        if other.id.is_some() {
            self.id = other.id;
        }
        if other.color.is_some() {
            self.color = other.color;
        }
        if other.label.is_some() {
            self.label = other.label;
        }
        if other.target_position.is_some() {
            self.target_position = other.target_position;
        }
        if other.current_position.is_some() {
            self.current_position = other.current_position;
        }
        self.extra.extend(other.extra);
    }
}

/// Optional construction parameters for a piece.
#[derive(Clone, Debug, Default)]
pub struct PieceConfig {
    pub central_anchor: Option<Vector>,
    pub size: Option<Size>,
    pub metadata: Metadata,
}

pub struct Piece {
    structure: Structure,
    central_anchor: Option<Anchor>,
    size: Option<Size>,
    connections: [Option<PieceId>; 4],
    metadata: Metadata,
    horizontal_connector: Option<Connector>,
    vertical_connector: Option<Connector>,
    translate_listeners: Vec<TranslateListener>,
    connect_listeners: Vec<ConnectionListener>,
    disconnect_listeners: Vec<ConnectionListener>,
}

impl Piece {
    pub fn new(structure: Structure) -> Self {
        Piece {
            structure,
            central_anchor: None,
            size: None,
            connections: [None; 4],
            metadata: Metadata::default(),
            horizontal_connector: None,
            vertical_connector: None,
            translate_listeners: Vec::new(),
            connect_listeners: Vec::new(),
            disconnect_listeners: Vec::new(),
        }
    }

    pub fn with_config(structure: Structure, config: PieceConfig) -> Self {
        let mut piece = Piece::new(structure);
        piece.central_anchor = config.central_anchor.map(Anchor::from);
        piece.size = config.size;
        piece.metadata = config.metadata;
        piece
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn central_anchor(&self) -> Option<Vector> {
        self.central_anchor.as_ref().map(Anchor::as_vector)
    }

    /// Place the piece for the first time. Use [`PieceMut::relocate_to`]
    /// to move it afterwards.
    pub fn center_around(&mut self, point: Vector) -> Result<()> {
        if self.central_anchor.is_some() {
            return Err(PuzzleError::AlreadyCentered);
        }
        self.central_anchor = Some(Anchor::from(point));
        Ok(())
    }

    /// Size override, if any. The puzzle default applies otherwise.
    pub fn own_size(&self) -> Option<Size> {
        self.size
    }

    pub fn resize(&mut self, size: Size) {
        self.size = Some(size);
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn annotate(&mut self, metadata: Metadata) {
        self.metadata.merge(metadata);
    }

    pub fn id(&self) -> Option<&str> {
        self.metadata.id.as_deref()
    }

    pub fn connection(&self, edge: Edge) -> Option<PieceId> {
        self.connections[edge.index()]
    }

    pub fn right_connection(&self) -> Option<PieceId> {
        self.connection(Edge::Right)
    }

    pub fn down_connection(&self) -> Option<PieceId> {
        self.connection(Edge::Down)
    }

    pub fn left_connection(&self) -> Option<PieceId> {
        self.connection(Edge::Left)
    }

    pub fn up_connection(&self) -> Option<PieceId> {
        self.connection(Edge::Up)
    }

    pub(crate) fn set_connection(&mut self, edge: Edge, neighbor: Option<PieceId>) {
        self.connections[edge.index()] = neighbor;
    }

    pub fn neighbors(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.connections.iter().flatten().copied()
    }

    pub fn connected(&self) -> bool {
        self.connections.iter().any(Option::is_some)
    }

    /// Midpoint of `edge` for a piece of the given size.
    pub fn edge_anchor(&self, edge: Edge, size: Size) -> Option<Vector> {
        let anchor = self.central_anchor.as_ref()?;
        let r = size.radius;
        Some(match edge {
            Edge::Right => anchor.translated(r.x, 0.0),
            Edge::Down => anchor.translated(0.0, r.y),
            Edge::Left => anchor.translated(-r.x, 0.0),
            Edge::Up => anchor.translated(0.0, -r.y),
        })
    }

    pub fn diff_to_target(&self) -> Option<Vector> {
        let target = self.metadata.target_position?;
        Some(self.central_anchor.as_ref()?.diff(target))
    }

    /// Whether the piece sits on its target position.
    pub fn solved(&self) -> bool {
        match (self.central_anchor(), self.metadata.target_position) {
            (Some(anchor), Some(target)) => same_position(anchor, target),
            _ => false,
        }
    }

    pub fn connector_override(&self, axis: Axis) -> Option<&Connector> {
        match axis {
            Axis::Horizontal => self.horizontal_connector.as_ref(),
            Axis::Vertical => self.vertical_connector.as_ref(),
        }
    }

    /// Use `connector` instead of the puzzle's one on its axis.
    pub fn override_connector(&mut self, connector: Connector) {
        match connector.axis() {
            Axis::Horizontal => self.horizontal_connector = Some(connector),
            Axis::Vertical => self.vertical_connector = Some(connector),
        }
    }

    pub fn on_translate(&mut self, listener: impl FnMut(PieceId, f64, f64) + 'static) {
        self.translate_listeners.push(Box::new(listener));
    }

    pub fn on_connect(&mut self, listener: impl FnMut(PieceId, PieceId) + 'static) {
        self.connect_listeners.push(Box::new(listener));
    }

    pub fn on_disconnect(&mut self, listener: impl FnMut(PieceId, PieceId) + 'static) {
        self.disconnect_listeners.push(Box::new(listener));
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Piece")
            .field("structure", &self.structure.serialize())
            .field("central_anchor", &self.central_anchor())
            .field("size", &self.size)
            .field("connections", &self.connections)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Mutable view of one piece that can reach its neighbours.
pub struct PieceMut<'a> {
    puzzle: &'a mut Puzzle,
    id: PieceId,
}

impl<'a> PieceMut<'a> {
    /// `id` must belong to `puzzle`.
    pub(crate) fn new(puzzle: &'a mut Puzzle, id: PieceId) -> Self {
        PieceMut { puzzle, id }
    }

    fn reborrow(&mut self, id: PieceId) -> PieceMut<'_> {
        PieceMut {
            puzzle: &mut *self.puzzle,
            id,
        }
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn size(&self) -> Size {
        self.puzzle.piece_size(self.id)
    }

    pub fn translate(&mut self, dx: f64, dy: f64, quiet: bool) {
        if Vector::new(dx, dy).is_null() {
            return;
        }
        let id = self.id;
        match self.puzzle.pieces[id.0].central_anchor.as_mut() {
            Some(anchor) => anchor.translate(dx, dy),
            None => {
                debug!(piece = %id, "ignoring translate of a piece without anchor");
                return;
            }
        }
        if !quiet {
            self.fire_translate(dx, dy);
        }
    }

    /// Move the piece so its centre lands exactly on `point`, centering it
    /// if it was never placed. Connected pieces stay where they are.
    pub fn relocate_to(&mut self, point: Vector, quiet: bool) {
        let id = self.id;
        let Some(anchor) = self.puzzle.pieces[id.0].central_anchor.as_mut() else {
            self.puzzle.pieces[id.0].central_anchor = Some(Anchor::from(point));
            return;
        };
        let delta = anchor.diff(point);
        if delta.is_null() {
            return;
        }
        anchor.relocate_to(point);
        if !quiet {
            self.fire_translate(delta.x, delta.y);
        }
    }

    fn fire_translate(&mut self, dx: f64, dy: f64) {
        let id = self.id;
        for listener in self.puzzle.pieces[id.0].translate_listeners.iter_mut() {
            listener(id, dx, dy);
        }
        for listener in self.puzzle.translate_listeners.iter_mut() {
            listener(id, dx, dy);
        }
    }

    /// Rigidly move the piece together with everything connected to it.
    pub fn push(&mut self, dx: f64, dy: f64, quiet: bool) {
        let mut visited = HashSet::new();
        self.push_visiting(dx, dy, quiet, &mut visited);
    }

    /// Like [`push`](Self::push), skipping pieces already in `visited`.
    /// `visited` keeps growing so callers can chain several pushes.
    pub fn push_visiting(
        &mut self,
        dx: f64,
        dy: f64,
        quiet: bool,
        visited: &mut HashSet<PieceId>,
    ) {
        visited.insert(self.id);
        let mut frontier = VecDeque::from([self.id]);
        while let Some(current) = frontier.pop_front() {
            trace!(piece = %current, dx, dy, "push");
            self.reborrow(current).translate(dx, dy, quiet);
            let neighbors: Vec<PieceId> = self.puzzle.pieces[current.0].neighbors().collect();
            for neighbor in neighbors {
                if visited.insert(neighbor) {
                    frontier.push_back(neighbor);
                }
            }
        }
    }

    /// Pointer drag entry point. The puzzle's drag mode decides whether the
    /// piece leaves its cluster or carries it along.
    pub fn drag(&mut self, dx: f64, dy: f64, quiet: bool) {
        if Vector::new(dx, dy).is_null() {
            return;
        }
        let mode = self.puzzle.drag_mode();
        if mode.drag_should_disconnect(self.puzzle, self.id, dx, dy) {
            self.disconnect();
            self.translate(dx, dy, quiet);
        } else {
            self.push(dx, dy, quiet);
        }
    }

    /// Pointer release: connect to whatever is close enough.
    pub fn drop(&mut self) {
        self.puzzle.autoconnect_with(self.id);
    }

    pub fn disconnect(&mut self) {
        let id = self.id;
        let mut former: Vec<PieceId> = Vec::new();
        for edge in Edge::ALL {
            let Some(neighbor) = self.puzzle.pieces[id.0].connection(edge) else {
                continue;
            };
            self.puzzle.pieces[id.0].set_connection(edge, None);
            let other = &mut self.puzzle.pieces[neighbor.0];
            if other.connection(edge.opposite()) == Some(id) {
                other.set_connection(edge.opposite(), None);
            }
            if !former.contains(&neighbor) {
                former.push(neighbor);
            }
        }
        if former.is_empty() {
            return;
        }
        debug!(piece = %id, count = former.len(), "disconnected");
        for neighbor in former {
            for listener in self.puzzle.pieces[id.0].disconnect_listeners.iter_mut() {
                listener(id, neighbor);
            }
            for listener in self.puzzle.disconnect_listeners.iter_mut() {
                listener(id, neighbor);
            }
        }
    }

    pub(crate) fn fire_connect(&mut self, other: PieceId) {
        let id = self.id;
        for listener in self.puzzle.pieces[id.0].connect_listeners.iter_mut() {
            listener(id, other);
        }
        for listener in self.puzzle.connect_listeners.iter_mut() {
            listener(id, other);
        }
    }

    pub fn can_connect_horizontally_with(&self, other: PieceId) -> bool {
        self.can_connect_along(Axis::Horizontal, other)
    }

    pub fn can_connect_vertically_with(&self, other: PieceId) -> bool {
        self.can_connect_along(Axis::Vertical, other)
    }

    fn can_connect_along(&self, axis: Axis, other: PieceId) -> bool {
        if !self.puzzle.contains(other) || other == self.id {
            return false;
        }
        let connector = self.puzzle.connector_for(self.id, axis);
        connector.can_connect_with(self.puzzle, self.id, other, self.puzzle.proximity())
    }

    /// Connect this piece's right edge to `other`'s left edge, failing if
    /// they are not close, matching and allowed.
    pub fn connect_horizontally_with(&mut self, other: PieceId, back: bool) -> Result<()> {
        self.connect_along(Axis::Horizontal, other, back)
    }

    /// Connect this piece's down edge to `other`'s up edge.
    pub fn connect_vertically_with(&mut self, other: PieceId, back: bool) -> Result<()> {
        self.connect_along(Axis::Vertical, other, back)
    }

    fn connect_along(&mut self, axis: Axis, other: PieceId, back: bool) -> Result<()> {
        if !self.puzzle.contains(other) {
            return Err(PuzzleError::UnknownPiece(other));
        }
        let connector = self.puzzle.connector_for(self.id, axis).clone();
        let proximity = self.puzzle.proximity();
        connector.connect_with(self.puzzle, self.id, other, proximity, back)
    }

    /// Best effort connection on both axes; silently does nothing when the
    /// pieces do not fit.
    pub fn try_connect_with(&mut self, other: PieceId, back: bool) {
        self.try_connect_horizontally_with(other, back);
        self.try_connect_vertically_with(other, back);
    }

    pub fn try_connect_horizontally_with(&mut self, other: PieceId, back: bool) {
        if self.can_connect_horizontally_with(other) {
            // already checked, the only failure mode is ruled out
            let _ = self.connect_horizontally_with(other, back);
        }
    }

    pub fn try_connect_vertically_with(&mut self, other: PieceId, back: bool) {
        if self.can_connect_vertically_with(other) {
            let _ = self.connect_vertically_with(other, back);
        }
    }
}

impl Deref for PieceMut<'_> {
    type Target = Piece;

    fn deref(&self) -> &Piece {
        &self.puzzle.pieces[self.id.0]
    }
}

impl DerefMut for PieceMut<'_> {
    fn deref_mut(&mut self) -> &mut Piece {
        &mut self.puzzle.pieces[self.id.0]
    }
}
