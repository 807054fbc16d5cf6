//! Jigsaw assembly engine: pieces with tab and slot edges that match,
//! connect and drag as rigid clusters, plus grid generation and outlines.
//!
//! ```
//! use puzzle_core::{sequence, Puzzle};
//!
//! let mut puzzle = Puzzle::default();
//! puzzle.autogenerate(3, 3, sequence::two_and_two);
//! puzzle.shuffle_grid();
//! puzzle.solve();
//! assert!(puzzle.pieces().all(|p| p.solved()));
//! ```

pub mod connector;
pub mod drag_mode;
pub mod error;
pub mod insert;
pub mod manufacturer;
pub mod outline;
pub mod painter;
pub mod piece;
pub mod puzzle;
pub mod sequence;
pub mod settings;
pub mod shuffler;
pub mod snapshot;
pub mod structure;
pub mod validator;
pub mod vector;

pub use connector::Connector;
pub use drag_mode::DragMode;
pub use error::{PuzzleError, Result};
pub use insert::Insert;
pub use manufacturer::Manufacturer;
pub use outline::{Outline, PathKind, Rounded, RoundedOptions, Squared};
pub use painter::Painter;
pub use piece::{Metadata, Piece, PieceConfig, PieceId, PieceMut};
pub use puzzle::Puzzle;
pub use sequence::InsertSequence;
pub use settings::{PuzzleSettings, Size};
pub use shuffler::Shuffler;
pub use snapshot::PuzzleDump;
pub use structure::{Edge, Structure};
pub use validator::Validator;
pub use vector::{Anchor, Axis, Vector};
