use crate::direction::Direction;

/// Holds the direction the snake will take on its next step.
///
/// Requests are checked against the direction the snake is actually moving
/// in, not the one that is pending, so two quick turns can't fold the head
/// back onto the neck between steps.
#[derive(Clone, Debug)]
pub struct InputBuffer {
    committed: Direction,
    pending: Direction,
}

impl InputBuffer {
    pub fn new(initial: Direction) -> Self {
        InputBuffer { committed: initial, pending: initial }
    }

    /// Records `direction` for the next step. A 180 degree turn is dropped
    /// and whatever was pending stays pending.
    pub fn request(&mut self, direction: Direction) -> bool {
        if direction.is_opposite(self.committed) {
            return false;
        }

        self.pending = direction;
        true
    }

    /// Commits the pending direction and returns it. It stays pending, so the
    /// snake keeps going the same way until a new request arrives.
    pub fn consume(&mut self) -> Direction {
        self.committed = self.pending;
        self.committed
    }

    pub fn committed(&self) -> Direction {
        self.committed
    }

    pub fn pending(&self) -> Direction {
        self.pending
    }
}
