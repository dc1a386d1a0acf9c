use rand::Rng;
use rand::rngs::StdRng;

use crate::direction::{Bounds, Position};

/// Places food on a free cell, picked uniformly over the whole board.
#[derive(Clone, Debug)]
pub struct FoodSpawner<R = StdRng> {
    rng: R,
}

impl<R: Rng> FoodSpawner<R> {
    pub fn new(rng: R) -> Self {
        FoodSpawner { rng }
    }

    /// Keeps drawing random cells until one is not in `occupied`. Returns
    /// `None` only when `occupied` already covers the whole board.
    pub fn spawn<'a, I>(&mut self, bounds: Bounds, occupied: I) -> Option<Position>
    where
        I: IntoIterator<Item = &'a Position> + Clone,
    {
        let taken = occupied.clone().into_iter()
            .filter(|pos| bounds.contains(**pos))
            .count();
        if bounds.area() == 0 || taken >= bounds.area() {
            return None;
        }

        loop {
            let candidate = Position::new(
                self.rng.gen_range(0..bounds.cols),
                self.rng.gen_range(0..bounds.rows),
            );

            if !occupied.clone().into_iter().any(|pos| *pos == candidate) {
                return Some(candidate);
            }
        }
    }
}
