//! End to end assembly scenarios.

use std::cell::RefCell;
use std::rc::Rc;

use puzzle_core::shuffler::{self, FnShuffler};
use puzzle_core::{
    DragMode, Manufacturer, PieceConfig, PieceId, Puzzle, PuzzleSettings, Structure, Vector,
    sequence,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn grid_at(puzzle: &Puzzle, ids: &[PieceId], width: usize, x: usize, y: usize) -> Structure {
    *puzzle.piece(ids[y * width + x]).unwrap().structure()
}

#[test]
fn two_and_two_grid_shuffles_and_solves() {
    let mut puzzle = Puzzle::default();
    let ids = Manufacturer::new()
        .with_dimensions(3, 3)
        .with_inserts_generator(sequence::two_and_two)
        .build(&mut puzzle);

    assert!(grid_at(&puzzle, &ids, 3, 0, 0).right.is_tab());
    assert!(grid_at(&puzzle, &ids, 3, 1, 0).left.is_slot());

    puzzle.shuffle_with_rng(&shuffler::Grid, &mut StdRng::seed_from_u64(3));
    puzzle.solve();

    for piece in puzzle.pieces() {
        assert_eq!(piece.central_anchor(), piece.metadata().target_position);
    }
    assert!(puzzle.connected());
}

#[test]
fn distant_pieces_connect_within_a_large_proximity() {
    let mut puzzle = Puzzle::new(PuzzleSettings::default().with_proximity(10.0));
    let a = puzzle.new_piece(
        "T---".parse().unwrap(),
        PieceConfig {
            central_anchor: Some(Vector::ZERO),
            ..Default::default()
        },
    );
    // adjacent edges are three units apart
    let b = puzzle.new_piece(
        "--S-".parse().unwrap(),
        PieceConfig {
            central_anchor: Some(Vector::new(7.0, 0.0)),
            ..Default::default()
        },
    );

    puzzle.autoconnect();

    assert!(puzzle.piece(a).unwrap().connected());
    assert!(puzzle.piece(b).unwrap().connected());
    let pa = puzzle.piece(a).unwrap().central_anchor().unwrap();
    let pb = puzzle.piece(b).unwrap().central_anchor().unwrap();
    assert_eq!(pa.diff(pb), Vector::new(4.0, 0.0));
}

#[test]
fn dragging_a_piece_out_and_back_reassembles_the_puzzle() {
    let mut puzzle = Puzzle::default();
    let ids = puzzle.autogenerate(3, 3, sequence::flipflop);
    puzzle.autoconnect();
    puzzle.attach_solved_validator();

    let solved = Rc::new(RefCell::new(0));
    let counter = solved.clone();
    puzzle.on_valid(move || *counter.borrow_mut() += 1);

    let center = ids[4];
    puzzle.set_drag_mode(DragMode::ForceDisconnection);
    {
        let mut piece = puzzle.piece_mut(center).unwrap();
        piece.drag(20.0, 20.0, false);
        piece.drop();
    }
    puzzle.validate();
    assert!(!puzzle.piece(center).unwrap().connected());
    assert_eq!(*solved.borrow(), 0);

    {
        let mut piece = puzzle.piece_mut(center).unwrap();
        piece.drag(-19.6, -20.3, false);
        piece.drop();
    }
    assert!(puzzle.validate());
    assert_eq!(*solved.borrow(), 1);
    assert!(puzzle.valid());
    let center_piece = puzzle.piece(center).unwrap();
    assert!(center_piece.solved());
    assert_eq!(center_piece.neighbors().count(), 4);
}

#[test]
fn force_connection_drags_the_whole_cluster() {
    let mut puzzle = Puzzle::default();
    let ids = puzzle.autogenerate(2, 2, sequence::fixed);
    puzzle.autoconnect();
    puzzle.set_drag_mode(DragMode::ForceConnection);
    let before = puzzle.points();

    puzzle.piece_mut(ids[3]).unwrap().drag(3.0, -1.0, false);

    let after = puzzle.points();
    for (b, a) in before.iter().zip(&after) {
        assert_eq!(*a, *b + Vector::new(3.0, -1.0));
    }
    assert!(puzzle.connected());
}

#[test]
fn listeners_see_connects_and_disconnects() {
    let mut puzzle = Puzzle::default();
    let events = Rc::new(RefCell::new(Vec::new()));
    let (on_connect, on_disconnect) = (events.clone(), events.clone());
    puzzle.on_connect(move |p, o| on_connect.borrow_mut().push(("connect", p, o)));
    puzzle.on_disconnect(move |p, o| on_disconnect.borrow_mut().push(("disconnect", p, o)));

    let ids = puzzle.autogenerate(2, 1, sequence::fixed);
    puzzle.autoconnect();
    puzzle.piece_mut(ids[1]).unwrap().disconnect();

    assert_eq!(
        *events.borrow(),
        vec![("connect", ids[0], ids[1]), ("disconnect", ids[1], ids[0])]
    );
}

#[test]
fn custom_shufflers_can_be_closures() {
    let mut puzzle = Puzzle::default();
    puzzle.autogenerate(2, 2, sequence::flipflop);
    let spread = FnShuffler(
        |pieces: &[&puzzle_core::Piece], _: &mut dyn rand::RngCore| -> Vec<Vector> {
            (0..pieces.len())
                .map(|i| Vector::new(i as f64 * 100.0, 0.0))
                .collect()
        },
    );

    puzzle.shuffle_with_rng(&spread, &mut StdRng::seed_from_u64(0));

    assert_eq!(puzzle.points()[3], Vector::new(300.0, 0.0));
    assert!(puzzle.pieces().all(|p| !p.connected()));
}

#[test]
fn line_shuffle_lays_pieces_on_one_row() {
    let mut puzzle = Puzzle::default();
    puzzle.autogenerate(3, 2, sequence::flipflop);
    puzzle.shuffle_line();

    let points = puzzle.points();
    assert!(points.iter().all(|p| p.y == 4.0));
    let mut xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    xs.sort_by(f64::total_cmp);
    assert_eq!(xs, vec![0.0, 4.0, 8.0, 12.0, 16.0, 20.0]);
}

#[test]
fn line_shuffle_keeps_a_single_column_apart() {
    let mut puzzle = Puzzle::default();
    puzzle.autogenerate(1, 3, sequence::flipflop);
    puzzle.shuffle_line();

    let diameter = puzzle.piece_diameter();
    let mut xs: Vec<f64> = puzzle.points().iter().map(|p| p.x).collect();
    xs.sort_by(f64::total_cmp);
    for pair in xs.windows(2) {
        assert!(pair[1] - pair[0] >= diameter.x);
    }
}
