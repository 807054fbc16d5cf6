//! The puzzle aggregate: owns every piece and orchestrates connections,
//! shuffling and validation.

use std::fmt;
use std::rc::Rc;

use rand::RngCore;
use tracing::{debug, warn};

use crate::connector::{Connector, Requirement};
use crate::drag_mode::DragMode;
use crate::error::{PuzzleError, Result};
use crate::insert::Insert;
use crate::manufacturer::Manufacturer;
use crate::piece::{ConnectionListener, Piece, PieceConfig, PieceId, PieceMut, TranslateListener};
use crate::settings::{PuzzleSettings, Size};
use crate::shuffler::{self, Shuffler};
use crate::structure::{Edge, Structure};
use crate::validator::Validator;
use crate::vector::{Axis, Vector};

pub type ValidListener = Box<dyn FnMut()>;

pub struct Puzzle {
    pub(crate) pieces: Vec<Piece>,
    settings: PuzzleSettings,
    horizontal_connector: Connector,
    vertical_connector: Connector,
    drag_mode: DragMode,
    validator: Validator,
    max_pieces_count: Option<(usize, usize)>,
    pub(crate) translate_listeners: Vec<TranslateListener>,
    pub(crate) connect_listeners: Vec<ConnectionListener>,
    pub(crate) disconnect_listeners: Vec<ConnectionListener>,
    valid_listeners: Vec<ValidListener>,
}

impl Puzzle {
    pub fn new(settings: PuzzleSettings) -> Self {
        Puzzle {
            pieces: Vec::new(),
            settings,
            horizontal_connector: Connector::horizontal(),
            vertical_connector: Connector::vertical(),
            drag_mode: DragMode::default(),
            validator: Validator::null(),
            max_pieces_count: None,
            translate_listeners: Vec::new(),
            connect_listeners: Vec::new(),
            disconnect_listeners: Vec::new(),
            valid_listeners: Vec::new(),
        }
    }

    pub fn settings(&self) -> &PuzzleSettings {
        &self.settings
    }

    // ---- pieces ----

    pub fn new_piece(&mut self, structure: Structure, config: PieceConfig) -> PieceId {
        self.add_piece(Piece::with_config(structure, config))
    }

    pub fn add_piece(&mut self, piece: Piece) -> PieceId {
        let id = PieceId(self.pieces.len());
        self.pieces.push(piece);
        id
    }

    pub fn add_pieces(&mut self, pieces: impl IntoIterator<Item = Piece>) -> Vec<PieceId> {
        pieces.into_iter().map(|p| self.add_piece(p)).collect()
    }

    pub fn contains(&self, id: PieceId) -> bool {
        id.0 < self.pieces.len()
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.0)
    }

    pub fn piece_mut(&mut self, id: PieceId) -> Result<PieceMut<'_>> {
        if !self.contains(id) {
            return Err(PuzzleError::UnknownPiece(id));
        }
        Ok(PieceMut::new(self, id))
    }

    /// Look a piece up by its metadata id.
    pub fn piece_by_id(&self, id: &str) -> Option<PieceId> {
        self.pieces
            .iter()
            .position(|p| p.id() == Some(id))
            .map(PieceId)
    }

    /// First piece added, if any.
    pub fn head(&self) -> Option<PieceId> {
        (!self.pieces.is_empty()).then_some(PieceId(0))
    }

    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.iter()
    }

    pub fn piece_ids(&self) -> impl Iterator<Item = PieceId> + use<> {
        (0..self.pieces.len()).map(PieceId)
    }

    /// Central anchors of every placed piece, in insertion order.
    pub fn points(&self) -> Vec<Vector> {
        self.pieces.iter().filter_map(Piece::central_anchor).collect()
    }

    // ---- geometry ----

    pub fn proximity(&self) -> f64 {
        self.settings.proximity
    }

    pub fn piece_radius(&self) -> Vector {
        self.settings.piece_radius
    }

    pub fn piece_diameter(&self) -> Vector {
        self.settings.piece_size().diameter()
    }

    /// The piece's own size, or the puzzle default.
    pub fn piece_size(&self, id: PieceId) -> Size {
        self.piece(id)
            .and_then(Piece::own_size)
            .unwrap_or_else(|| self.settings.piece_size())
    }

    pub fn edge_anchor(&self, id: PieceId, edge: Edge) -> Option<Vector> {
        self.piece(id)?.edge_anchor(edge, self.piece_size(id))
    }

    /// Connector used by `id` along `axis`: its override, else the puzzle's.
    pub fn connector_for(&self, id: PieceId, axis: Axis) -> &Connector {
        self.piece(id)
            .and_then(|p| p.connector_override(axis))
            .unwrap_or(match axis {
                Axis::Horizontal => &self.horizontal_connector,
                Axis::Vertical => &self.vertical_connector,
            })
    }

    pub fn drag_mode(&self) -> DragMode {
        self.drag_mode
    }

    pub fn set_drag_mode(&mut self, mode: DragMode) {
        self.drag_mode = mode;
    }

    pub fn attach_connection_requirement(
        &mut self,
        requirement: impl Fn(&Piece, &Piece) -> bool + 'static,
    ) {
        let requirement: Requirement = Rc::new(requirement);
        self.horizontal_connector
            .attach_requirement(requirement.clone());
        self.vertical_connector.attach_requirement(requirement);
    }

    pub fn attach_horizontal_connection_requirement(
        &mut self,
        requirement: impl Fn(&Piece, &Piece) -> bool + 'static,
    ) {
        self.horizontal_connector
            .attach_requirement(Rc::new(requirement));
    }

    pub fn attach_vertical_connection_requirement(
        &mut self,
        requirement: impl Fn(&Piece, &Piece) -> bool + 'static,
    ) {
        self.vertical_connector
            .attach_requirement(Rc::new(requirement));
    }

    pub fn clear_connection_requirements(&mut self) {
        self.horizontal_connector.clear_requirement();
        self.vertical_connector.clear_requirement();
    }

    // ---- connections ----

    /// Let `id` both seek and be sought by every other piece. The piece
    /// being connected is the one that moves.
    pub fn autoconnect_with(&mut self, id: PieceId) {
        if !self.contains(id) {
            return;
        }
        for other in self.piece_ids() {
            if other == id {
                continue;
            }
            PieceMut::new(self, id).try_connect_with(other, false);
            PieceMut::new(self, other).try_connect_with(id, true);
        }
    }

    pub fn autoconnect(&mut self) {
        for id in self.piece_ids() {
            self.autoconnect_with(id);
        }
    }

    pub fn disconnect(&mut self) {
        for id in self.piece_ids() {
            PieceMut::new(self, id).disconnect();
        }
    }

    /// Every piece has at least one neighbour.
    pub fn connected(&self) -> bool {
        self.pieces.iter().all(Piece::connected)
    }

    // ---- placement ----

    /// Move every piece by the same delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for id in self.piece_ids() {
            PieceMut::new(self, id).translate(dx, dy, false);
        }
    }

    /// Translate the whole puzzle by the smallest delta that brings every
    /// central anchor inside `[min, max]`. When the layout is larger than the
    /// frame the top-left side wins.
    pub fn reframe(&mut self, min: Vector, max: Vector) {
        let points = self.points();
        let Some(&first) = points.first() else {
            return;
        };
        let (lo, hi) = points
            .iter()
            .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        let clamp = |lo: f64, hi: f64, min: f64, max: f64| {
            if lo < min {
                min - lo
            } else if hi > max {
                (max - hi).max(min - lo)
            } else {
                0.0
            }
        };
        let dx = clamp(lo.x, hi.x, min.x, max.x);
        let dy = clamp(lo.y, hi.y, min.y, max.y);
        self.translate(dx, dy);
    }

    /// Relocate pieces one to one onto `points`; extra pieces stay put.
    pub fn relocate_to(&mut self, points: &[Vector]) {
        for (id, &point) in self.piece_ids().zip(points) {
            PieceMut::new(self, id).relocate_to(point, false);
        }
    }

    pub fn shuffle_with(&mut self, shuffler: &dyn Shuffler) {
        self.shuffle_with_rng(shuffler, &mut rand::rng());
    }

    /// Disconnect everything, move pieces where `shuffler` says and
    /// reconnect whatever landed close to a match.
    pub fn shuffle_with_rng(&mut self, shuffler: &dyn Shuffler, rng: &mut dyn RngCore) {
        self.disconnect();
        let destinations = {
            let pieces: Vec<&Piece> = self.pieces.iter().collect();
            shuffler.shuffle(&pieces, rng)
        };
        if destinations.len() < self.pieces.len() {
            warn!(
                expected = self.pieces.len(),
                got = destinations.len(),
                "shuffler returned too few destinations"
            );
        }
        self.relocate_to(&destinations);
        self.autoconnect();
        debug!(pieces = self.pieces.len(), "shuffled");
    }

    /// Scatter pieces uniformly inside `[0, max_x] x [0, max_y]`.
    pub fn shuffle(&mut self, max_x: f64, max_y: f64) {
        self.shuffle_with(&shuffler::Random { max_x, max_y });
    }

    pub fn shuffle_grid(&mut self) {
        self.shuffle_with(&shuffler::Grid);
    }

    pub fn shuffle_columns(&mut self) {
        self.shuffle_with(&shuffler::Columns);
    }

    pub fn shuffle_line(&mut self) {
        let spacing = self.piece_diameter().x;
        self.shuffle_with(&shuffler::Line { spacing });
    }

    /// Put every piece with a target position back on it and reconnect.
    pub fn solve(&mut self) {
        self.disconnect();
        for id in self.piece_ids() {
            if let Some(target) = self.pieces[id.0].metadata().target_position {
                PieceMut::new(self, id).relocate_to(target, false);
            }
        }
        self.autoconnect();
        debug!(pieces = self.pieces.len(), "solved");
    }

    /// Manufacture a `width x height` grid into this puzzle.
    pub fn autogenerate(
        &mut self,
        width: usize,
        height: usize,
        generator: impl Fn(usize) -> Insert + 'static,
    ) -> Vec<PieceId> {
        Manufacturer::new()
            .with_dimensions(width, height)
            .with_inserts_generator(generator)
            .build(self)
    }

    /// Grid dimensions, set by the manufacturer or explicitly.
    pub fn max_pieces_count(&self) -> Result<(usize, usize)> {
        self.max_pieces_count.ok_or(PuzzleError::MaxPiecesCountUnset)
    }

    pub fn set_max_pieces_count(&mut self, width: usize, height: usize) {
        self.max_pieces_count = Some((width, height));
    }

    // ---- validation ----

    /// Replaces the current validator, forgetting its last outcome.
    pub fn attach_validator(&mut self, validator: Validator) {
        self.validator = validator;
    }

    pub fn attach_solved_validator(&mut self) {
        self.attach_validator(Validator::absolute_position());
    }

    pub fn attach_relative_position_validator(&mut self) {
        self.attach_validator(Validator::relative_position());
    }

    pub fn attach_connected_validator(&mut self) {
        self.attach_validator(Validator::connected());
    }

    /// Evaluate the validator now, without firing anything.
    pub fn is_valid(&self) -> bool {
        self.validator.is_valid(self)
    }

    /// Outcome of the last [`validate`](Self::validate).
    pub fn valid(&self) -> bool {
        self.validator.valid()
    }

    /// Re-evaluate the validator and notify `on_valid` listeners when the
    /// puzzle just became valid.
    pub fn validate(&mut self) -> bool {
        let valid = self.validator.is_valid(self);
        if self.validator.update(valid) {
            debug!("puzzle became valid");
            for listener in self.valid_listeners.iter_mut() {
                listener();
            }
        }
        valid
    }

    // ---- listeners ----

    pub fn on_translate(&mut self, listener: impl FnMut(PieceId, f64, f64) + 'static) {
        self.translate_listeners.push(Box::new(listener));
    }

    pub fn on_connect(&mut self, listener: impl FnMut(PieceId, PieceId) + 'static) {
        self.connect_listeners.push(Box::new(listener));
    }

    pub fn on_disconnect(&mut self, listener: impl FnMut(PieceId, PieceId) + 'static) {
        self.disconnect_listeners.push(Box::new(listener));
    }

    pub fn on_valid(&mut self, listener: impl FnMut() + 'static) {
        self.valid_listeners.push(Box::new(listener));
    }
}

impl Default for Puzzle {
    fn default() -> Self {
        Puzzle::new(PuzzleSettings::default())
    }
}

impl fmt::Debug for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Puzzle")
            .field("settings", &self.settings)
            .field("pieces", &self.pieces)
            .field("drag_mode", &self.drag_mode)
            .field("validator", &self.validator)
            .field("max_pieces_count", &self.max_pieces_count)
            .finish_non_exhaustive()
    }
}
