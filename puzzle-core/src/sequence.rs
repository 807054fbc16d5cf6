use std::cell::RefCell;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::insert::Insert;

/// Maps a position in a row or column to the insert placed after it.
pub type InsertsGenerator = dyn Fn(usize) -> Insert;

pub fn fixed(_index: usize) -> Insert {
    Insert::Tab
}

pub fn flipflop(index: usize) -> Insert {
    if index % 2 == 0 { Insert::Tab } else { Insert::Slot }
}

pub fn two_and_two(index: usize) -> Insert {
    if index % 4 < 2 { Insert::Tab } else { Insert::Slot }
}

/// Tab or slot with equal odds, drawn from the thread rng.
pub fn random() -> Box<InsertsGenerator> {
    Box::new(|_| {
        if rand::rng().random_bool(0.5) {
            Insert::Tab
        } else {
            Insert::Slot
        }
    })
}

/// Reproducible variant of [`random`].
pub fn seeded(seed: u64) -> Box<InsertsGenerator> {
    let rng = RefCell::new(StdRng::seed_from_u64(seed));
    Box::new(move |_| {
        if rng.borrow_mut().random_bool(0.5) {
            Insert::Tab
        } else {
            Insert::Slot
        }
    })
}

/// Stream of inserts along one row or column.
///
/// Remembers the previous value so that the edge facing back gets its
/// complement, and clamps the last edge to [`Insert::None`].
pub struct InsertSequence<'a> {
    generator: &'a InsertsGenerator,
    index: usize,
    previous: Insert,
    current: Insert,
}

impl<'a> InsertSequence<'a> {
    pub fn new(generator: &'a InsertsGenerator) -> Self {
        InsertSequence {
            generator,
            index: 0,
            previous: Insert::None,
            current: Insert::None,
        }
    }

    pub fn next(&mut self) -> Insert {
        self.previous = self.current;
        self.current = (self.generator)(self.index);
        self.index += 1;
        self.current
    }

    /// Insert for the edge facing the previous element.
    pub fn previous_complement(&self) -> Insert {
        self.previous.complement()
    }

    /// Insert for the edge facing the next element; `None` once `max`
    /// elements have been produced.
    pub fn current(&self, max: usize) -> Insert {
        if self.index >= max {
            Insert::None
        } else {
            self.current
        }
    }
}
