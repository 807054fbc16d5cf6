use png::{BitDepth, ColorType, Encoder};
use puzzle_core::painter::{self, Painter};
use puzzle_core::{Outline, PathKind, Piece, PieceMut, Puzzle, Size, Vector};
use serde::{Deserialize, Serialize};

pub fn piece_color(i: usize) -> String {
    // Fixed 16-color categorical palette with easily describable hues.
    // Colors are stable and cycle by index%16.
    const PALETTE: [&str; 16] = [
        "red",            // 0
        "orangered",      // 1
        "orange",         // 2
        "gold",           // 3
        "yellowgreen",    // 4
        "green",          // 5
        "mediumseagreen", // 6
        "teal",           // 7
        "deepskyblue",    // 8
        "dodgerblue",     // 9
        "blueviolet",     // 10
        "purple",         // 11
        "fuchsia",        // 12
        "hotpink",        // 13
        "peru",           // 14
        "slategray",      // 15
    ];
    PALETTE[i % PALETTE.len()].to_string()
}

// Shared PNG encoder: RGBA -> PNG bytes (deterministic for same input)
pub fn encode_rgba_to_png_bytes(
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<Vec<u8>, png::EncodingError> {
    let mut buf = Vec::new();
    {
        let mut enc = Encoder::new(&mut buf, width, height);
        enc.set_color(ColorType::Rgba);
        enc.set_depth(BitDepth::Eight);
        {
            let mut writer = enc.write_header()?;
            writer.write_image_data(rgba)?;
        }
    }
    Ok(buf)
}

fn svg_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// One piece on the sheet, in pixels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SvgFigure {
    /// Path data relative to `origin`.
    pub d: String,
    pub fill: String,
    pub label: Option<String>,
    /// Top-left corner of the piece body.
    pub origin: Vector,
    /// Body size, used to centre the label.
    pub extent: Vector,
}

impl SvgFigure {
    pub fn to_svg(&self) -> String {
        let mut s = format!(
            "<g transform=\"translate({:.2} {:.2})\">\n<path d=\"{}\" fill=\"{}\"/>\n",
            self.origin.x, self.origin.y, self.d, self.fill
        );
        if let Some(label) = &self.label {
            s.push_str(&format!(
                "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" fill=\"#333\" stroke=\"none\">{}</text>\n",
                self.extent.x / 2.0,
                self.extent.y / 2.0,
                svg_escape(label)
            ));
        }
        s.push_str("</g>\n");
        s
    }
}

/// Paints pieces as SVG fragments on a static sheet.
///
/// Puzzle units are scaled by `px_per_unit` after shifting by `offset`, so
/// the whole layout can be moved into the positive quadrant.
#[derive(Clone, Debug)]
pub struct SvgPainter {
    pub px_per_unit: f64,
    pub offset: Vector,
    painted: usize,
}

impl SvgPainter {
    pub fn new(px_per_unit: f64) -> Self {
        SvgPainter {
            px_per_unit,
            offset: Vector::ZERO,
            painted: 0,
        }
    }

    pub fn with_offset(mut self, offset: Vector) -> Self {
        self.offset = offset;
        self
    }

    fn to_px(&self, v: Vector) -> Vector {
        v.plus(self.offset).scale(self.px_per_unit)
    }

    fn from_px(&self, v: Vector) -> Vector {
        v.scale(1.0 / self.px_per_unit).minus(self.offset)
    }
}

fn path_data(outline: &[f64], kind: PathKind, scale: f64) -> String {
    let pts: Vec<(f64, f64)> = outline
        .chunks_exact(2)
        .map(|c| (c[0] * scale, c[1] * scale))
        .collect();
    let Some(&(x0, y0)) = pts.first() else {
        return String::new();
    };
    let mut out = format!("M {:.2} {:.2}", x0, y0);
    match kind {
        PathKind::Polygon => {
            for (x, y) in &pts[1..] {
                out.push_str(&format!(" L {:.2} {:.2}", x, y));
            }
        }
        PathKind::Bezier => {
            for seg in pts[1..].chunks_exact(3) {
                out.push_str(&format!(
                    " C {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
                    seg[0].0, seg[0].1, seg[1].0, seg[1].1, seg[2].0, seg[2].1
                ));
            }
        }
    }
    out.push_str(" Z");
    out
}

impl Painter for SvgPainter {
    type Figure = SvgFigure;

    fn sketch(&mut self, _piece: &Piece, outline: &[f64], kind: PathKind) -> SvgFigure {
        SvgFigure {
            d: path_data(outline, kind, self.px_per_unit),
            ..Default::default()
        }
    }

    fn fill(&mut self, piece: &Piece, figure: &mut SvgFigure) {
        figure.fill = piece
            .metadata()
            .color
            .clone()
            .unwrap_or_else(|| piece_color(self.painted));
        self.painted += 1;
    }

    fn label(&mut self, piece: &Piece, figure: &mut SvgFigure) {
        let metadata = piece.metadata();
        figure.label = metadata.label.clone().or_else(|| metadata.id.clone());
    }

    fn physical_translate(&mut self, figure: &mut SvgFigure, piece: &Piece, size: Size) {
        if let Some(center) = piece.central_anchor() {
            figure.origin = self.to_px(center.minus(size.radius));
            figure.extent = size.diameter().scale(self.px_per_unit);
        }
    }

    fn logical_translate(&mut self, figure: &SvgFigure, mut piece: PieceMut<'_>) {
        let size = piece.size();
        let center = self.from_px(figure.origin).plus(size.radius);
        piece.relocate_to(center, false);
    }
}

/// Sheet options for [`build_puzzle_svg`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetOptions {
    pub px_per_unit: f64,
    pub border_fill: f64,
    /// Margin around the layout, in puzzle units.
    pub padding: f64,
}

impl Default for SheetOptions {
    fn default() -> Self {
        SheetOptions {
            px_per_unit: 10.0,
            border_fill: 0.0,
            padding: 2.0,
        }
    }
}

/// Render every placed piece onto one SVG sheet; returns the document and
/// its pixel size.
pub fn build_puzzle_svg(
    puzzle: &Puzzle,
    outline: &dyn Outline,
    options: &SheetOptions,
) -> (String, u32, u32) {
    // tabs reach at most a fifth of the diameter outside the body
    let mut lo = Vector::cast(f64::INFINITY);
    let mut hi = Vector::cast(f64::NEG_INFINITY);
    for id in puzzle.piece_ids() {
        let Some(center) = puzzle.piece(id).and_then(Piece::central_anchor) else {
            continue;
        };
        let size = puzzle.piece_size(id);
        let reach = size
            .radius
            .plus(size.diameter().scale(0.2))
            .plus(Vector::cast(options.border_fill));
        lo = lo.min(center.minus(reach));
        hi = hi.max(center.plus(reach));
    }
    if lo.x > hi.x {
        lo = Vector::ZERO;
        hi = Vector::ZERO;
    }
    let pad = Vector::cast(options.padding);
    let extent = lo.diff(hi).plus(pad.scale(2.0));
    let w_px = (extent.x * options.px_per_unit).ceil().max(1.0) as u32;
    let h_px = (extent.y * options.px_per_unit).ceil().max(1.0) as u32;

    let mut painter =
        SvgPainter::new(options.px_per_unit).with_offset(pad.minus(lo));
    let figures = painter::sketch_all(&mut painter, puzzle, outline, options.border_fill);

    let mut s = String::new();
    s.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    s.push_str(&format!("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" stroke=\"#333\" stroke-width=\"1.2\" stroke-linejoin=\"round\" font-family=\"sans-serif\" font-size=\"{:.0}\">\n", w_px, h_px, w_px, h_px, options.px_per_unit));
    s.push_str("<rect x=\"0\" y=\"0\" width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");
    for (id, figure) in &figures {
        s.push_str(&format!("<!-- piece {} -->\n", id));
        s.push_str(&figure.to_svg());
    }
    s.push_str("</svg>\n");
    (s, w_px, h_px)
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzle_core::{Rounded, Squared, sequence};

    #[test]
    fn palette_cycles() {
        assert_eq!(piece_color(0), "red");
        assert_eq!(piece_color(16), "red");
        assert_eq!(piece_color(15), "slategray");
    }

    #[test]
    fn png_encoding_is_deterministic() {
        let rgba = vec![255u8; 2 * 2 * 4];
        let a = encode_rgba_to_png_bytes(2, 2, &rgba).unwrap();
        let b = encode_rgba_to_png_bytes(2, 2, &rgba).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[1..4], b"PNG");
    }

    #[test]
    fn squared_sheet_has_one_polygon_per_piece() {
        let mut puzzle = Puzzle::default();
        puzzle.autogenerate(2, 2, sequence::flipflop);
        let (svg, w, h) = build_puzzle_svg(&puzzle, &Squared, &SheetOptions::default());

        assert_eq!(svg.matches("<path").count(), 4);
        assert!(svg.contains(" L "));
        assert!(!svg.contains(" C "));
        assert!(svg.contains("fill=\"red\""));
        assert!(svg.contains(">4</text>"));
        // two diameters plus tab reach on both sides plus padding
        assert_eq!(w, h);
        assert!((136..=137).contains(&w));
    }

    #[test]
    fn rounded_sheet_uses_curves() {
        let mut puzzle = Puzzle::default();
        puzzle.autogenerate(1, 2, sequence::fixed);
        let (svg, _, _) = build_puzzle_svg(&puzzle, &Rounded::default(), &SheetOptions::default());
        assert!(svg.contains(" C "));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn figures_and_pieces_stay_in_sync() {
        let mut puzzle = Puzzle::default();
        let ids = puzzle.autogenerate(1, 1, sequence::fixed);
        let mut painter = SvgPainter::new(10.0).with_offset(Vector::new(1.0, 1.0));
        let mut figures = painter::sketch_all(&mut painter, &puzzle, &Squared, 0.0);
        assert_eq!(figures[0].1.origin, Vector::new(30.0, 30.0));

        figures[0].1.origin = Vector::new(50.0, 30.0);
        let figure = figures[0].1.clone();
        painter.logical_translate(&figure, puzzle.piece_mut(ids[0]).unwrap());
        assert_eq!(
            puzzle.piece(ids[0]).unwrap().central_anchor(),
            Some(Vector::new(6.0, 4.0))
        );
    }

    #[test]
    fn sheet_options_fill_missing_fields() {
        let options: SheetOptions = serde_json::from_str(r#"{"pxPerUnit": 4.0}"#).unwrap();
        assert_eq!(options.px_per_unit, 4.0);
        assert_eq!(options.padding, 2.0);
        assert_eq!(options.border_fill, 0.0);
    }

    #[test]
    fn labels_are_escaped() {
        let figure = SvgFigure {
            label: Some("a<b".into()),
            ..Default::default()
        };
        assert!(figure.to_svg().contains("a&lt;b"));
    }
}
