use Direction::*;

pub type GridInt = i32;

/// A cell on the board, `(col, row)` with the origin at the top-left corner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub col: GridInt,
    pub row: GridInt,
}

impl Position {
    pub const fn new(col: GridInt, row: GridInt) -> Self {
        Position { col, row }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Position::new(self.col + dx, self.row + dy)
    }
}

/// Board dimensions. A position is on the board when it lies in `[0, cols) x [0, rows)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub cols: GridInt,
    pub rows: GridInt,
}

impl Bounds {
    pub const fn new(cols: GridInt, rows: GridInt) -> Self {
        Bounds { cols, rows }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.col >= 0 && pos.col < self.cols && pos.row >= 0 && pos.row < self.rows
    }

    pub fn area(&self) -> usize {
        self.cols.max(0) as usize * self.rows.max(0) as usize
    }

    pub fn center(&self) -> Position {
        Position::new(self.cols / 2, self.rows / 2)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn offset(&self) -> (GridInt, GridInt) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    /// Two directions are opposite when their offsets cancel out.
    pub fn is_opposite(&self, other: Direction) -> bool {
        let (ax, ay) = self.offset();
        let (bx, by) = other.offset();
        ax + bx == 0 && ay + by == 0
    }
}
