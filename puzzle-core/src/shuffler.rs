//! Layout generators used by [`Puzzle::shuffle_with`](crate::Puzzle::shuffle_with).
//!
//! A shuffler looks at the current pieces and proposes one destination per
//! piece, in the same order. It never moves anything itself.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::piece::Piece;
use crate::vector::{Anchor, Vector};

pub trait Shuffler {
    fn shuffle(&self, pieces: &[&Piece], rng: &mut dyn RngCore) -> Vec<Vector>;
}

/// Adapts a closure into a [`Shuffler`].
pub struct FnShuffler<F>(pub F);

impl<F> Shuffler for FnShuffler<F>
where
    F: Fn(&[&Piece], &mut dyn RngCore) -> Vec<Vector>,
{
    fn shuffle(&self, pieces: &[&Piece], rng: &mut dyn RngCore) -> Vec<Vector> {
        (self.0)(pieces, rng)
    }
}

fn positions(pieces: &[&Piece]) -> Vec<Vector> {
    pieces
        .iter()
        .map(|p| p.central_anchor().unwrap_or_default())
        .collect()
}

/// Uniform positions inside `[0, max_x] x [0, max_y]`.
#[derive(Clone, Copy, Debug)]
pub struct Random {
    pub max_x: f64,
    pub max_y: f64,
}

impl Shuffler for Random {
    fn shuffle(&self, pieces: &[&Piece], rng: &mut dyn RngCore) -> Vec<Vector> {
        pieces
            .iter()
            .map(|_| Anchor::at_random(self.max_x, self.max_y, rng).as_vector())
            .collect()
    }
}

/// Permutes the current positions among all pieces.
#[derive(Clone, Copy, Debug, Default)]
pub struct Grid;

impl Shuffler for Grid {
    fn shuffle(&self, pieces: &[&Piece], rng: &mut dyn RngCore) -> Vec<Vector> {
        let mut destinations = positions(pieces);
        destinations.shuffle(rng);
        destinations
    }
}

/// Permutes positions only among pieces sharing a column.
#[derive(Clone, Copy, Debug, Default)]
pub struct Columns;

impl Shuffler for Columns {
    fn shuffle(&self, pieces: &[&Piece], rng: &mut dyn RngCore) -> Vec<Vector> {
        let mut destinations = positions(pieces);
        let mut columns: BTreeMap<u64, Vec<usize>> = BTreeMap::new();
        for (i, p) in destinations.iter().enumerate() {
            columns.entry(p.x.to_bits()).or_default().push(i);
        }
        for members in columns.values() {
            let mut column: Vec<Vector> = members.iter().map(|&i| destinations[i]).collect();
            column.shuffle(rng);
            for (&i, destination) in members.iter().zip(column) {
                destinations[i] = destination;
            }
        }
        destinations
    }
}

/// Lays every piece on one row at the topmost position, column by column,
/// with the row running through the median column.
///
/// Pieces are spaced by the smallest gap between columns, never less than
/// `spacing`. A single column falls back to the piece's own diameter.
#[derive(Clone, Copy, Debug)]
pub struct Line {
    pub spacing: f64,
}

impl Shuffler for Line {
    fn shuffle(&self, pieces: &[&Piece], _rng: &mut dyn RngCore) -> Vec<Vector> {
        let current = positions(pieces);
        if current.is_empty() {
            return current;
        }
        let mut xs: Vec<f64> = current.iter().map(|p| p.x).collect();
        xs.sort_by(f64::total_cmp);
        xs.dedup();
        let spacing = xs
            .windows(2)
            .map(|w| w[1] - w[0])
            .reduce(f64::min)
            .or_else(|| pieces[0].own_size().map(|s| s.diameter().x))
            .map_or(self.spacing, |gap| gap.max(self.spacing));
        let median = xs[xs.len() / 2];
        let min_y = current.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);

        let mut order: Vec<usize> = (0..current.len()).collect();
        order.sort_by(|&a, &b| {
            current[a]
                .x
                .total_cmp(&current[b].x)
                .then(current[a].y.total_cmp(&current[b].y))
        });
        let before_median = current.iter().filter(|p| p.x < median).count();

        let mut destinations = vec![Vector::ZERO; current.len()];
        for (rank, &i) in order.iter().enumerate() {
            let offset = rank as f64 - before_median as f64;
            destinations[i] = Vector::new(median + offset * spacing, min_y);
        }
        destinations
    }
}

/// Jitters every piece by at most `max_distance` on each axis.
#[derive(Clone, Copy, Debug)]
pub struct Noise {
    pub max_distance: f64,
}

impl Shuffler for Noise {
    fn shuffle(&self, pieces: &[&Piece], rng: &mut dyn RngCore) -> Vec<Vector> {
        let d = self.max_distance.abs();
        positions(pieces)
            .into_iter()
            .map(|p| {
                p.plus(Vector::new(
                    rng.random_range(-d..=d),
                    rng.random_range(-d..=d),
                ))
            })
            .collect()
    }
}

/// Spreads a `width x height` grid apart by `padding` per row and column,
/// usually before another shuffle.
#[derive(Clone, Copy, Debug)]
pub struct Padder {
    pub padding: f64,
    pub width: usize,
    pub height: usize,
}

impl Shuffler for Padder {
    fn shuffle(&self, pieces: &[&Piece], _rng: &mut dyn RngCore) -> Vec<Vector> {
        let mut destinations = positions(pieces);
        for y in 0..self.height {
            for x in 0..self.width {
                if let Some(destination) = destinations.get_mut(y * self.width + x) {
                    *destination = destination.plus(Vector::new(
                        x as f64 * self.padding,
                        y as f64 * self.padding,
                    ));
                }
            }
        }
        destinations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceConfig;
    use crate::structure::Structure;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn grid(w: usize, h: usize) -> Vec<Piece> {
        let mut pieces = Vec::new();
        for y in 0..h {
            for x in 0..w {
                pieces.push(Piece::with_config(
                    Structure::default(),
                    PieceConfig {
                        central_anchor: Some(Vector::new(x as f64 * 10.0, y as f64 * 10.0)),
                        ..Default::default()
                    },
                ));
            }
        }
        pieces
    }

    fn sorted(mut v: Vec<Vector>) -> Vec<Vector> {
        v.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        v
    }

    #[test]
    fn grid_is_a_permutation() {
        let pieces = grid(3, 3);
        let refs: Vec<&Piece> = pieces.iter().collect();
        let mut rng = StdRng::seed_from_u64(1);
        let out = Grid.shuffle(&refs, &mut rng);
        assert_eq!(sorted(out), sorted(positions(&refs)));
    }

    #[test]
    fn columns_keep_x() {
        let pieces = grid(3, 4);
        let refs: Vec<&Piece> = pieces.iter().collect();
        let mut rng = StdRng::seed_from_u64(2);
        let out = Columns.shuffle(&refs, &mut rng);
        for (before, after) in positions(&refs).iter().zip(&out) {
            assert_eq!(before.x, after.x);
        }
        assert_eq!(sorted(out), sorted(positions(&refs)));
    }

    #[test]
    fn line_collapses_into_one_row() {
        let pieces = grid(3, 2);
        let refs: Vec<&Piece> = pieces.iter().collect();
        let mut rng = StdRng::seed_from_u64(3);
        let out = Line { spacing: 4.0 }.shuffle(&refs, &mut rng);
        assert!(out.iter().all(|p| p.y == 0.0));
        let xs: Vec<f64> = sorted(out).iter().map(|p| p.x).collect();
        // two pieces per column, the median column starts at x = 10
        assert_eq!(xs, vec![-10.0, 0.0, 10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn line_spaces_a_single_column_by_the_given_spacing() {
        let pieces = grid(1, 3);
        let refs: Vec<&Piece> = pieces.iter().collect();
        let mut rng = StdRng::seed_from_u64(6);
        let out = Line { spacing: 4.0 }.shuffle(&refs, &mut rng);
        let xs: Vec<f64> = sorted(out).iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 4.0, 8.0]);
    }

    #[test]
    fn line_never_packs_tighter_than_the_spacing() {
        let pieces = grid(3, 1);
        let refs: Vec<&Piece> = pieces.iter().collect();
        let mut rng = StdRng::seed_from_u64(7);
        let out = Line { spacing: 15.0 }.shuffle(&refs, &mut rng);
        let xs: Vec<f64> = sorted(out).iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![-5.0, 10.0, 25.0]);
    }

    #[test]
    fn noise_is_bounded() {
        let pieces = grid(4, 4);
        let refs: Vec<&Piece> = pieces.iter().collect();
        let mut rng = StdRng::seed_from_u64(4);
        let out = Noise { max_distance: 2.0 }.shuffle(&refs, &mut rng);
        for (before, after) in positions(&refs).iter().zip(&out) {
            assert!(before.equal(*after, 2.0));
        }
    }

    #[test]
    fn padder_spreads_rows_and_columns() {
        let pieces = grid(2, 2);
        let refs: Vec<&Piece> = pieces.iter().collect();
        let mut rng = StdRng::seed_from_u64(5);
        let out = Padder {
            padding: 3.0,
            width: 2,
            height: 2,
        }
        .shuffle(&refs, &mut rng);
        assert_eq!(
            out,
            vec![
                Vector::new(0.0, 0.0),
                Vector::new(13.0, 0.0),
                Vector::new(0.0, 13.0),
                Vector::new(13.0, 13.0)
            ]
        );
    }
}
