//! Piece silhouettes.
//!
//! Outlines are flat `[x0, y0, x1, y1, ...]` lists in the piece's local frame:
//! the body square spans `0..size` on each axis and tabs stick out of it.

use serde::{Deserialize, Serialize};

use crate::insert::Insert;
use crate::piece::Piece;
use crate::structure::Edge;
use crate::vector::{Axis, Vector};

/// How a renderer should join the outline points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathKind {
    /// Straight segments between consecutive points.
    Polygon,
    /// A start point followed by cubic segments `(c1, c2, end)`.
    Bezier,
}

pub trait Outline {
    fn kind(&self) -> PathKind;

    /// `size` is the full extent of the body; `border_fill` grows the flat
    /// parts outwards so neighbouring figures overlap without seams.
    fn draw(&self, piece: &Piece, size: Vector, border_fill: f64) -> Vec<f64>;
}

/// Straight cuts with triangular notches on a 5x5 grid.
#[derive(Clone, Copy, Debug, Default)]
pub struct Squared;

impl Outline for Squared {
    fn kind(&self) -> PathKind {
        PathKind::Polygon
    }

    fn draw(&self, piece: &Piece, size: Vector, border_fill: f64) -> Vec<f64> {
        let s = piece.structure();
        let unit = size.scale(1.0 / 5.0);
        let o = Vector::cast(border_fill).divide(unit);
        let (lo_x, lo_y, hi_x, hi_y) = (-o.x, -o.y, 5.0 + o.x, 5.0 + o.y);
        let grid = [
            (lo_x, lo_y),
            (1.0, lo_y),
            (2.5, s.up.select(-1.0, 1.0, lo_y)),
            (4.0, lo_y),
            (hi_x, lo_y),
            (hi_x, 1.0),
            (s.right.select(6.0, 4.0, hi_x), 2.5),
            (hi_x, 4.0),
            (hi_x, hi_y),
            (4.0, hi_y),
            (2.5, s.down.select(6.0, 4.0, hi_y)),
            (1.0, hi_y),
            (lo_x, hi_y),
            (lo_x, 4.0),
            (s.left.select(-1.0, 1.0, lo_x), 2.5),
            (lo_x, 1.0),
        ];
        grid.iter()
            .flat_map(|&(x, y)| [x * unit.x, y * unit.y])
            .collect()
    }
}

/// Tuning knobs for [`Rounded`]. Depths are fractions of the reference
/// length: the size along `reference_insert_axis`, or the smaller side.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoundedOptions {
    /// Cut the corner between two flat border edges.
    pub bezelize: bool,
    pub bezel_depth: f64,
    pub insert_depth: f64,
    pub reference_insert_axis: Option<Axis>,
}

impl Default for RoundedOptions {
    fn default() -> Self {
        RoundedOptions {
            bezelize: false,
            bezel_depth: 0.1,
            insert_depth: 0.2,
            reference_insert_axis: None,
        }
    }
}

/// Classic bulb shaped tabs drawn with cubic curves.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rounded {
    pub options: RoundedOptions,
}

impl Rounded {
    pub fn new(options: RoundedOptions) -> Self {
        Rounded { options }
    }

    fn reference_length(&self, size: Vector) -> f64 {
        match self.options.reference_insert_axis {
            Some(axis) => axis.of(size),
            None => size.inner_min(),
        }
    }
}

struct Side {
    from: Vector,
    to: Vector,
    outward: Vector,
    insert: Insert,
}

fn lerp(a: Vector, b: Vector, t: f64) -> Vector {
    a.plus(a.diff(b).scale(t))
}

fn push_curve(out: &mut Vec<f64>, c1: Vector, c2: Vector, end: Vector) {
    out.extend_from_slice(&[c1.x, c1.y, c2.x, c2.y, end.x, end.y]);
}

fn push_line(out: &mut Vec<f64>, from: Vector, to: Vector) {
    push_curve(out, lerp(from, to, 1.0 / 3.0), lerp(from, to, 2.0 / 3.0), to);
}

impl Outline for Rounded {
    fn kind(&self) -> PathKind {
        PathKind::Bezier
    }

    fn draw(&self, piece: &Piece, size: Vector, border_fill: f64) -> Vec<f64> {
        let s = piece.structure();
        let reference = self.reference_length(size);
        let depth = self.options.insert_depth * reference;
        let neck = 0.1 * reference;
        let head = 0.18 * reference;

        let o = border_fill;
        let top_left = Vector::new(-o, -o);
        let top_right = Vector::new(size.x + o, -o);
        let bottom_right = Vector::new(size.x + o, size.y + o);
        let bottom_left = Vector::new(-o, size.y + o);
        let sides = [
            Side {
                from: top_left,
                to: top_right,
                outward: Vector::new(0.0, -1.0),
                insert: s.insert(Edge::Up),
            },
            Side {
                from: top_right,
                to: bottom_right,
                outward: Vector::new(1.0, 0.0),
                insert: s.insert(Edge::Right),
            },
            Side {
                from: bottom_right,
                to: bottom_left,
                outward: Vector::new(0.0, 1.0),
                insert: s.insert(Edge::Down),
            },
            Side {
                from: bottom_left,
                to: top_left,
                outward: Vector::new(-1.0, 0.0),
                insert: s.insert(Edge::Left),
            },
        ];

        // corner i sits at the start of side i
        let bezel: Vec<f64> = (0..4)
            .map(|i| {
                let previous = &sides[(i + 3) % 4];
                let flat = previous.insert.is_none() && sides[i].insert.is_none();
                if self.options.bezelize && flat {
                    self.options.bezel_depth * reference
                } else {
                    0.0
                }
            })
            .collect();

        let start_of = |i: usize| {
            let side = &sides[i];
            let u = side.from.diff(side.to).scale(1.0 / side_length(side));
            side.from.plus(u.scale(bezel[i]))
        };

        let first = start_of(0);
        let mut out = vec![first.x, first.y];
        for (i, side) in sides.iter().enumerate() {
            let length = side_length(side);
            let u = side.from.diff(side.to).scale(1.0 / length);
            let start = start_of(i);
            let end = side.to.minus(u.scale(bezel[(i + 1) % 4]));
            match side.insert {
                Insert::None => push_line(&mut out, start, end),
                insert => {
                    let sign = insert.select(1.0, -1.0, 0.0);
                    let n = side.outward.scale(sign);
                    let middle = side.from.plus(u.scale(length / 2.0));
                    let neck_in = middle.minus(u.scale(neck));
                    let neck_out = middle.plus(u.scale(neck));
                    let tip = middle.plus(n.scale(depth));
                    push_line(&mut out, start, neck_in);
                    push_curve(
                        &mut out,
                        neck_in.plus(n.scale(depth * 0.5)).minus(u.scale(head - neck)),
                        tip.minus(u.scale(head)),
                        tip,
                    );
                    push_curve(
                        &mut out,
                        tip.plus(u.scale(head)),
                        neck_out.plus(n.scale(depth * 0.5)).plus(u.scale(head - neck)),
                        neck_out,
                    );
                    push_line(&mut out, neck_out, end);
                }
            }
            let next = (i + 1) % 4;
            if bezel[next] > 0.0 {
                push_line(&mut out, end, start_of(next));
            }
        }
        out
    }
}

fn side_length(side: &Side) -> f64 {
    let d = side.from.diff(side.to);
    (d.x * d.x + d.y * d.y).sqrt()
}

/// Split a flat outline into points.
pub fn points(outline: &[f64]) -> Vec<Vector> {
    outline
        .chunks_exact(2)
        .map(|c| Vector::new(c[0], c[1]))
        .collect()
}
