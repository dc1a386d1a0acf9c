use std::cmp::max;

use crate::direction::{Direction, Position};

/// The cells covered by the snake, head first. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    body: Vec<Position>,
}

impl Snake {
    /// Lays out `size` segments in a straight line behind `head`, so the snake
    /// starts out facing `direction`.
    pub fn new(head: Position, size: usize, direction: Direction) -> Self {
        let size = max(size, 1);
        let behind = direction.opposite();
        let mut body = Vec::with_capacity(size);
        let mut pos = head;

        for _ in 0..size {
            body.push(pos);
            pos = pos.step(behind);
        }

        Snake { body }
    }

    pub fn from_segments(body: Vec<Position>) -> Option<Self> {
        if body.is_empty() {
            return None;
        }
        Some(Snake { body })
    }

    pub fn body(&self) -> &[Position] {
        &self.body
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Moves the snake onto `new_head`. Unless it `grew`, the tail cell is
    /// freed and returned.
    ///
    /// Callers must have checked `new_head` against the body first; this is
    /// what keeps every cell of the snake distinct.
    pub fn advance(&mut self, new_head: Position, grew: bool) -> Option<Position> {
        self.body.insert(0, new_head);

        if grew {
            None
        } else {
            self.body.pop()
        }
    }
}

pub fn contains_food(head: Position, food: Position) -> bool {
    head == food
}
