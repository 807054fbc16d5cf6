use tracing::debug;

use crate::insert::Insert;
use crate::piece::{Metadata, PieceConfig, PieceId};
use crate::puzzle::Puzzle;
use crate::sequence::{self, InsertSequence, InsertsGenerator};
use crate::structure::Structure;
use crate::vector::Vector;

/// Builds a rectangular grid of pieces into a puzzle.
///
/// Rows and columns each run their own [`InsertSequence`], so neighbouring
/// pieces always get complementary inserts and border edges stay flat.
pub struct Manufacturer {
    width: usize,
    height: usize,
    inserts_generator: Box<InsertsGenerator>,
    head_anchor: Option<Vector>,
    metadata: Vec<Metadata>,
}

impl Manufacturer {
    pub fn new() -> Self {
        Manufacturer {
            width: 1,
            height: 1,
            inserts_generator: Box::new(sequence::fixed),
            head_anchor: None,
            metadata: Vec::new(),
        }
    }

    pub fn with_dimensions(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_inserts_generator(mut self, generator: impl Fn(usize) -> Insert + 'static) -> Self {
        self.inserts_generator = Box::new(generator);
        self
    }

    pub fn with_boxed_inserts_generator(mut self, generator: Box<InsertsGenerator>) -> Self {
        self.inserts_generator = generator;
        self
    }

    /// Centre of the top-left piece. Defaults to one piece diameter away from
    /// the origin.
    pub fn with_head_at(mut self, head: Vector) -> Self {
        self.head_anchor = Some(head);
        self
    }

    /// Per-piece metadata in row-major order.
    pub fn with_metadata(mut self, metadata: Vec<Metadata>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn build(self, puzzle: &mut Puzzle) -> Vec<PieceId> {
        let diameter = puzzle.piece_diameter();
        let head = self.head_anchor.unwrap_or(diameter);
        let generator: &InsertsGenerator = &*self.inserts_generator;
        let mut columns: Vec<InsertSequence<'_>> = (0..self.width)
            .map(|_| InsertSequence::new(generator))
            .collect();
        let mut ids = Vec::with_capacity(self.width * self.height);

        for y in 0..self.height {
            let mut row = InsertSequence::new(generator);
            for (x, column) in columns.iter_mut().enumerate() {
                row.next();
                column.next();
                let structure = Structure {
                    up: column.previous_complement(),
                    down: column.current(self.height),
                    left: row.previous_complement(),
                    right: row.current(self.width),
                };
                let index = y * self.width + x;
                let natural =
                    head.plus(Vector::new(x as f64 * diameter.x, y as f64 * diameter.y));
                let mut metadata = self.metadata.get(index).cloned().unwrap_or_default();
                metadata.id.get_or_insert_with(|| (index + 1).to_string());
                metadata.target_position.get_or_insert(natural);
                let center = metadata.current_position.unwrap_or(natural);
                ids.push(puzzle.new_piece(
                    structure,
                    PieceConfig {
                        central_anchor: Some(center),
                        size: None,
                        metadata,
                    },
                ));
            }
        }
        puzzle.set_max_pieces_count(self.width, self.height);
        debug!(width = self.width, height = self.height, "manufactured grid");
        ids
    }
}

impl Default for Manufacturer {
    fn default() -> Self {
        Manufacturer::new()
    }
}
