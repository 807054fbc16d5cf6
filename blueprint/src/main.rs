use blueprint_core::{SheetOptions, build_puzzle_svg, encode_rgba_to_png_bytes};
use puzzle_core::shuffler::{self, Shuffler};
use puzzle_core::{
    Manufacturer, Outline, Puzzle, PuzzleSettings, Rounded, RoundedOptions, Squared, Vector,
    sequence,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use std::env;
use std::fs;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
enum InsertsKind {
    #[default]
    Fixed,
    Flipflop,
    TwoAndTwo,
    Random,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
enum OutlineKind {
    #[default]
    Squared,
    Rounded,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
enum ShuffleKind {
    #[default]
    None,
    Random,
    Grid,
    Columns,
    Line,
    Noise,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Request {
    width: usize,
    height: usize,
    piece_radius: Vector,
    proximity: f64,
    inserts: InsertsKind,
    seed: Option<u64>,
    outline: OutlineKind,
    rounded: RoundedOptions,
    shuffle: ShuffleKind,
    #[serde(flatten)]
    sheet: SheetOptions,
}

impl Default for Request {
    fn default() -> Self {
        let settings = PuzzleSettings::default();
        Request {
            width: 3,
            height: 3,
            piece_radius: settings.piece_radius,
            proximity: settings.proximity,
            inserts: InsertsKind::default(),
            seed: None,
            outline: OutlineKind::default(),
            rounded: RoundedOptions::default(),
            shuffle: ShuffleKind::default(),
            sheet: SheetOptions::default(),
        }
    }
}

fn build(req: &Request) -> Puzzle {
    let mut puzzle = Puzzle::new(
        PuzzleSettings::default()
            .with_piece_radius(req.piece_radius)
            .with_proximity(req.proximity),
    );
    let manufacturer = Manufacturer::new().with_dimensions(req.width, req.height);
    let manufacturer = match (req.inserts, req.seed) {
        (InsertsKind::Fixed, _) => manufacturer.with_inserts_generator(sequence::fixed),
        (InsertsKind::Flipflop, _) => manufacturer.with_inserts_generator(sequence::flipflop),
        (InsertsKind::TwoAndTwo, _) => manufacturer.with_inserts_generator(sequence::two_and_two),
        (InsertsKind::Random, Some(seed)) => {
            manufacturer.with_boxed_inserts_generator(sequence::seeded(seed))
        }
        (InsertsKind::Random, None) => manufacturer.with_boxed_inserts_generator(sequence::random()),
    };
    manufacturer.build(&mut puzzle);
    puzzle.autoconnect();
    puzzle
}

fn shuffle(puzzle: &mut Puzzle, req: &Request) {
    let diameter = puzzle.piece_diameter();
    let chosen: Box<dyn Shuffler> = match req.shuffle {
        ShuffleKind::None => return,
        ShuffleKind::Random => Box::new(shuffler::Random {
            max_x: req.width as f64 * diameter.x * 2.0,
            max_y: req.height as f64 * diameter.y * 2.0,
        }),
        ShuffleKind::Grid => Box::new(shuffler::Grid),
        ShuffleKind::Columns => Box::new(shuffler::Columns),
        ShuffleKind::Line => Box::new(shuffler::Line {
            spacing: diameter.x,
        }),
        ShuffleKind::Noise => Box::new(shuffler::Noise {
            max_distance: diameter.inner_min() / 4.0,
        }),
    };
    match req.seed {
        Some(seed) => puzzle.shuffle_with_rng(chosen.as_ref(), &mut StdRng::seed_from_u64(seed)),
        None => puzzle.shuffle_with(chosen.as_ref()),
    }
}

fn render_svg(puzzle: &Puzzle, req: &Request) -> (String, u32, u32) {
    let outline: Box<dyn Outline> = match req.outline {
        OutlineKind::Squared => Box::new(Squared),
        OutlineKind::Rounded => Box::new(Rounded::new(req.rounded)),
    };
    build_puzzle_svg(puzzle, outline.as_ref(), &req.sheet)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: blueprint <request.json> <output.(json|svg|png)>");
        std::process::exit(2);
    }
    let input = &args[1];
    let output = &args[2];
    let txt = fs::read_to_string(input)?;
    let req: Request = serde_json::from_str(&txt)?;
    if req.width == 0 || req.height == 0 {
        warn!(width = req.width, height = req.height, "empty grid requested");
    }

    let mut puzzle = build(&req);
    shuffle(&mut puzzle, &req);
    info!(pieces = puzzle.len(), connected = puzzle.connected(), "puzzle ready");

    if output.ends_with(".json") {
        fs::write(output, puzzle.to_json(false)?)?;
    } else if output.ends_with(".svg") {
        let (svg, _, _) = render_svg(&puzzle, &req);
        fs::write(output, svg)?;
    } else {
        let (svg, w_px, h_px) = render_svg(&puzzle, &req);
        let png = rasterize(&svg, w_px, h_px)?;
        fs::write(output, png)?;
    }
    info!(output = %output, "written");
    Ok(())
}

// PNG only: render SVG -> RGBA (deterministic for a given font set)
fn rasterize(svg: &str, w_px: u32, h_px: u32) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut opt = usvg::Options::default();
    let mut fontdb = usvg::fontdb::Database::new();
    fontdb.load_system_fonts();
    if fontdb.faces().next().is_none() {
        warn!("no system fonts found, labels will not be rendered");
    }
    opt.fontdb = std::sync::Arc::new(fontdb);
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| format!("SVG parse error: {e:?}"))?;
    let mut pixmap = tiny_skia::Pixmap::new(w_px, h_px).ok_or("pixmap alloc failed")?;
    let mut pm = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pm);
    Ok(encode_rgba_to_png_bytes(w_px, h_px, pixmap.data())?)
}
