use std::fmt;
use std::rc::Rc;

use crate::piece::Piece;
use crate::puzzle::Puzzle;
use crate::vector::Vector;

/// Distance under which two positions are considered the same.
pub const POSITION_TOLERANCE: f64 = 1e-6;

pub type PuzzleCondition = Rc<dyn Fn(&Puzzle) -> bool>;
pub type PieceCondition = Rc<dyn Fn(&Piece) -> bool>;

#[derive(Clone)]
enum Condition {
    Null,
    Puzzle(PuzzleCondition),
    Piece(PieceCondition),
}

/// Solved-state predicate with memory of its last outcome, so that
/// [`Puzzle::validate`] can report only the false to true transition.
#[derive(Clone)]
pub struct Validator {
    condition: Condition,
    valid: bool,
}

impl Validator {
    /// Never valid.
    pub fn null() -> Self {
        Validator::with(Condition::Null)
    }

    pub fn puzzle(condition: impl Fn(&Puzzle) -> bool + 'static) -> Self {
        Validator::with(Condition::Puzzle(Rc::new(condition)))
    }

    /// Valid when every piece satisfies `condition`.
    pub fn piece(condition: impl Fn(&Piece) -> bool + 'static) -> Self {
        Validator::with(Condition::Piece(Rc::new(condition)))
    }

    pub fn connected() -> Self {
        Validator::puzzle(|puzzle| puzzle.connected())
    }

    /// Pieces sit on their targets up to one shared offset.
    pub fn relative_position() -> Self {
        Validator::puzzle(|puzzle| {
            let mut offsets = puzzle.pieces().map(|p| p.diff_to_target());
            let Some(Some(first)) = offsets.next() else {
                return false;
            };
            offsets.all(|offset| offset.is_some_and(|o| o.equal(first, POSITION_TOLERANCE)))
        })
    }

    /// Every piece sits on its target.
    pub fn absolute_position() -> Self {
        Validator::piece(Piece::solved)
    }

    fn with(condition: Condition) -> Self {
        Validator {
            condition,
            valid: false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.condition, Condition::Null)
    }

    /// Evaluate the condition now without touching the remembered state.
    pub fn is_valid(&self, puzzle: &Puzzle) -> bool {
        match &self.condition {
            Condition::Null => false,
            Condition::Puzzle(condition) => condition(puzzle),
            Condition::Piece(condition) => puzzle.pieces().all(|p| condition(p)),
        }
    }

    /// Outcome of the last [`update`](Self::update).
    pub fn valid(&self) -> bool {
        self.valid
    }

    /// Store a new outcome; returns true when it just became valid.
    pub fn update(&mut self, valid: bool) -> bool {
        let became_valid = valid && !self.valid;
        self.valid = valid;
        became_valid
    }
}

impl Default for Validator {
    fn default() -> Self {
        Validator::null()
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.condition {
            Condition::Null => "null",
            Condition::Puzzle(_) => "puzzle",
            Condition::Piece(_) => "piece",
        };
        f.debug_struct("Validator")
            .field("condition", &kind)
            .field("valid", &self.valid)
            .finish()
    }
}

/// Whether two positions coincide for validation purposes.
pub fn same_position(a: Vector, b: Vector) -> bool {
    a.equal(b, POSITION_TOLERANCE)
}
