//! Grid storage and win/draw evaluation.
//!
//! Evaluation only looks at the lines through the cell just played, in a
//! fixed priority order: column, row, main diagonal, anti-diagonal. The
//! first complete line wins; a draw is only reported once every cell has
//! been played without completing a line.

use gridduel_protocol::Side;

/// One cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Owned(Side),
}

/// A `width × height` grid of cells, addressed by `(x, y)` with `x` as the
/// column and `y` as the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an empty grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Returns the cell at `(x, y)`, or `None` if out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        self.in_bounds(x, y).then(|| self.cells[y * self.width + x])
    }

    /// Marks `(x, y)` for `side`, overwriting any previous owner.
    /// Returns `false` without touching the grid if out of bounds.
    pub fn set(&mut self, x: usize, y: usize, side: Side) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.cells[y * self.width + x] = Cell::Owned(side);
        true
    }

    fn owned_by(&self, x: usize, y: usize, side: Side) -> bool {
        self.get(x, y) == Some(Cell::Owned(side))
    }
}

/// The line that completed a win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Column(usize),
    Row(usize),
    Diagonal,
    AntiDiagonal,
}

/// Result of evaluating a single accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win(Side, Line),
    Draw,
    Continue,
}

/// Evaluates the move `side` just made at `(x, y)`.
///
/// `move_count` is the cumulative number of accepted moves, including
/// this one. Diagonals are only considered on square grids.
pub fn evaluate(grid: &Grid, side: Side, x: usize, y: usize, move_count: usize) -> Outcome {
    if (0..grid.height()).all(|row| grid.owned_by(x, row, side)) {
        return Outcome::Win(side, Line::Column(x));
    }
    if (0..grid.width()).all(|col| grid.owned_by(col, y, side)) {
        return Outcome::Win(side, Line::Row(y));
    }

    let size = grid.width();
    if size == grid.height() {
        if x == y && (0..size).all(|i| grid.owned_by(i, i, side)) {
            return Outcome::Win(side, Line::Diagonal);
        }
        if x + y == size - 1 && (0..size).all(|i| grid.owned_by(i, size - 1 - i, side)) {
            return Outcome::Win(side, Line::AntiDiagonal);
        }
    }

    if move_count == grid.width() * grid.height() {
        Outcome::Draw
    } else {
        Outcome::Continue
    }
}
