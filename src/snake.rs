use serde::{Deserialize, Serialize};
use Direction::*;

/// A grid position, in cells rather than pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    pub fn shifted(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Cell { x: self.x + dx, y: self.y + dy }
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Cell { x, y }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

/// Ordered body segments, head first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    body: Vec<Cell>,
}

impl Snake {
    /// Builds a snake from explicit cells. Panics on an empty body, a snake
    /// always has a head.
    pub fn from_cells<I: IntoIterator<Item = Cell>>(cells: I) -> Self {
        let body: Vec<Cell> = cells.into_iter().collect();
        assert!(!body.is_empty(), "a snake needs at least one segment");
        Snake { body }
    }

    /// A straight snake with its head at `head`, trailing away from `direction`.
    pub fn straight(head: Cell, size: usize, direction: Direction) -> Self {
        let back = direction.opposite();
        let mut body = Vec::with_capacity(size.max(1));
        let mut pos = head;
        for _ in 0..size.max(1) {
            body.push(pos);
            pos = pos.shifted(back);
        }
        Snake { body }
    }

    pub fn body(&self) -> &[Cell] {
        &self.body
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn tail(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// True if `cell` hits a segment that stays put this tick. The head can't
    /// be reached in one step and the current tail is about to move, so only
    /// indices `1..len-1` count, whether or not the snake grows.
    pub fn bites(&self, cell: Cell) -> bool {
        let end = self.body.len().saturating_sub(1);
        self.body.get(1..end).map_or(false, |mid| mid.contains(&cell))
    }

    pub fn push_head(&mut self, cell: Cell) {
        self.body.insert(0, cell);
    }

    pub fn pop_tail(&mut self) -> Option<Cell> {
        if self.body.len() > 1 {
            self.body.pop()
        } else {
            None
        }
    }
}
