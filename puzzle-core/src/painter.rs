//! Contract with whatever draws the pieces.
//!
//! The engine never paints. A [`Painter`] turns outlines into figures and
//! keeps them in sync with piece anchors; pointer input comes back through
//! [`Painter::on_drag`] and [`Painter::on_drag_end`], which [`pump_drag`]
//! forwards to [`PieceMut::drag`](crate::PieceMut::drag) and
//! [`PieceMut::drop`](crate::PieceMut::drop).

use crate::error::Result;
use crate::outline::{Outline, PathKind};
use crate::piece::{Piece, PieceId, PieceMut};
use crate::puzzle::Puzzle;
use crate::settings::Size;
use crate::vector::Vector;

pub trait Painter {
    type Figure;

    /// Build a figure from an outline in the piece's local frame.
    fn sketch(&mut self, piece: &Piece, outline: &[f64], kind: PathKind) -> Self::Figure;

    fn fill(&mut self, piece: &Piece, figure: &mut Self::Figure);

    fn label(&mut self, piece: &Piece, figure: &mut Self::Figure);

    /// Move the figure to where the piece is.
    fn physical_translate(&mut self, figure: &mut Self::Figure, piece: &Piece, size: Size);

    /// Move the piece to where the figure is.
    fn logical_translate(&mut self, figure: &Self::Figure, piece: PieceMut<'_>);

    /// Pending pointer movement on `figure`, if any.
    fn on_drag(&mut self, _figure: &Self::Figure) -> Option<Vector> {
        None
    }

    /// Whether the pointer was released over `figure`.
    fn on_drag_end(&mut self, _figure: &Self::Figure) -> bool {
        false
    }
}

/// Sketch, fill, label and place a figure for every piece.
pub fn sketch_all<P: Painter>(
    painter: &mut P,
    puzzle: &Puzzle,
    outline: &dyn Outline,
    border_fill: f64,
) -> Vec<(PieceId, P::Figure)> {
    puzzle
        .piece_ids()
        .filter_map(|id| {
            let piece = puzzle.piece(id)?;
            let size = puzzle.piece_size(id);
            let path = outline.draw(piece, size.diameter(), border_fill);
            let mut figure = painter.sketch(piece, &path, outline.kind());
            painter.fill(piece, &mut figure);
            painter.label(piece, &mut figure);
            painter.physical_translate(&mut figure, piece, size);
            Some((id, figure))
        })
        .collect()
}

/// Forward pending pointer events to the pieces, then re-place every figure.
pub fn pump_drag<P: Painter>(
    painter: &mut P,
    puzzle: &mut Puzzle,
    figures: &mut [(PieceId, P::Figure)],
) -> Result<()> {
    for (id, figure) in figures.iter() {
        if let Some(delta) = painter.on_drag(figure) {
            puzzle.piece_mut(*id)?.drag(delta.x, delta.y, false);
        }
        if painter.on_drag_end(figure) {
            puzzle.piece_mut(*id)?.drop();
            puzzle.validate();
        }
    }
    for (id, figure) in figures.iter_mut() {
        let size = puzzle.piece_size(*id);
        if let Some(piece) = puzzle.piece(*id) {
            painter.physical_translate(figure, piece, size);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::Squared;
    use crate::sequence;
    use std::collections::VecDeque;

    #[derive(Debug, Default)]
    struct Figure {
        points: usize,
        fill: Option<String>,
        label: Option<String>,
        origin: Vector,
    }

    /// Replays a fixed script of pointer events on the first figure.
    #[derive(Default)]
    struct Scripted {
        moves: VecDeque<Vector>,
        release: bool,
    }

    impl Painter for Scripted {
        type Figure = Figure;

        fn sketch(&mut self, _piece: &Piece, outline: &[f64], kind: PathKind) -> Figure {
            assert_eq!(kind, PathKind::Polygon);
            Figure {
                points: outline.len() / 2,
                ..Default::default()
            }
        }

        fn fill(&mut self, piece: &Piece, figure: &mut Figure) {
            figure.fill = piece.metadata().color.clone();
        }

        fn label(&mut self, piece: &Piece, figure: &mut Figure) {
            figure.label = piece.id().map(str::to_owned);
        }

        fn physical_translate(&mut self, figure: &mut Figure, piece: &Piece, size: Size) {
            if let Some(center) = piece.central_anchor() {
                figure.origin = center.minus(size.radius);
            }
        }

        fn logical_translate(&mut self, figure: &Figure, mut piece: PieceMut<'_>) {
            let size = piece.size();
            piece.relocate_to(figure.origin.plus(size.radius), false);
        }

        fn on_drag(&mut self, _figure: &Figure) -> Option<Vector> {
            self.moves.pop_front()
        }

        fn on_drag_end(&mut self, _figure: &Figure) -> bool {
            std::mem::take(&mut self.release)
        }
    }

    #[test]
    fn every_piece_gets_a_placed_figure() {
        let mut puzzle = Puzzle::default();
        puzzle.autogenerate(2, 2, sequence::flipflop);
        let mut painter = Scripted::default();
        let figures = sketch_all(&mut painter, &puzzle, &Squared, 0.0);

        assert_eq!(figures.len(), 4);
        let (_, first) = &figures[0];
        assert_eq!(first.points, 16);
        assert_eq!(first.label.as_deref(), Some("1"));
        assert_eq!(first.origin, Vector::new(2.0, 2.0));
    }

    #[test]
    fn pointer_events_drive_drag_and_drop() {
        let mut puzzle = Puzzle::default();
        let ids = puzzle.autogenerate(2, 1, sequence::fixed);
        puzzle.attach_connected_validator();
        let mut painter = Scripted::default();
        let mut figures = sketch_all(&mut painter, &puzzle, &Squared, 0.0);

        // pull the first piece away, then bring it back close and release
        painter.moves = VecDeque::from([Vector::new(-10.0, 0.0)]);
        pump_drag(&mut painter, &mut puzzle, &mut figures).unwrap();
        assert!(!puzzle.piece(ids[0]).unwrap().connected());
        assert!(!puzzle.valid());

        painter.moves = VecDeque::from([Vector::new(9.5, 0.5)]);
        painter.release = true;
        pump_drag(&mut painter, &mut puzzle, &mut figures).unwrap();
        assert!(puzzle.connected());
        assert!(puzzle.valid());
        assert_eq!(figures[0].1.origin, Vector::new(2.0, 2.0));
    }

    #[test]
    fn logical_translate_follows_the_figure() {
        let mut puzzle = Puzzle::default();
        let ids = puzzle.autogenerate(1, 1, sequence::fixed);
        let mut painter = Scripted::default();
        let mut figures = sketch_all(&mut painter, &puzzle, &Squared, 0.0);
        figures[0].1.origin = Vector::new(10.0, 10.0);

        let figure = &figures[0].1;
        painter.logical_translate(figure, puzzle.piece_mut(ids[0]).unwrap());
        assert_eq!(
            puzzle.piece(ids[0]).unwrap().central_anchor(),
            Some(Vector::new(12.0, 12.0))
        );
    }
}
