use crate::direction::{Bounds, Position};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Collision {
    Ok,
    Wall,
    SelfCollision,
}

/// Checks a candidate head against the board edges and the current body.
///
/// The body is the one from before the move, tail included: stepping into
/// the cell the tail is about to leave still counts as hitting yourself.
pub fn check(head: Position, bounds: Bounds, body: &[Position]) -> Collision {
    if !bounds.contains(head) {
        Collision::Wall
    } else if body.contains(&head) {
        Collision::SelfCollision
    } else {
        Collision::Ok
    }
}
