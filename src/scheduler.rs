use std::cmp::max;

pub const DEFAULT_MOVE_DELAY: u32 = 5;

/// Counts frame units and tells the game when the snake should take a step,
/// so the grid advances at the same pace no matter how often the screen is
/// redrawn.
#[derive(Clone, Debug)]
pub struct TickScheduler {
    move_delay: u32,
    elapsed: u32,
}

impl TickScheduler {
    pub fn new(move_delay: u32) -> Self {
        TickScheduler { move_delay: max(move_delay, 1), elapsed: 0 }
    }

    /// Adds `frames` to the accumulator. Returns true when a step is due, in
    /// which case the accumulator starts over from zero. Fires at most once
    /// per call, even for a large frame delta.
    pub fn advance(&mut self, frames: u32) -> bool {
        self.elapsed = self.elapsed.saturating_add(frames);
        if self.elapsed < self.move_delay {
            return false;
        }

        self.elapsed = 0;
        true
    }

    pub fn set_delay(&mut self, move_delay: u32) {
        self.move_delay = max(move_delay, 1);
    }

    pub fn delay(&self) -> u32 {
        self.move_delay
    }

    pub fn reset(&mut self) {
        self.elapsed = 0;
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        TickScheduler::new(DEFAULT_MOVE_DELAY)
    }
}
