use std::collections::{HashSet, VecDeque};

use crate::constants::TILE;
use crate::error::EngineError;
use crate::types::{ActorKind, Cell, Vec2};

/// Tile grid of one level. Fixed size; only pickups mutate it.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn parse(rows: &[&str]) -> Result<Self, EngineError> {
        let height = rows.len();
        if height < 3 {
            return Err(EngineError::InvalidLevel(format!(
                "expected at least 3 rows, got {height}"
            )));
        }
        let width = rows[0].chars().count();
        if width < 3 {
            return Err(EngineError::InvalidLevel(format!(
                "expected at least 3 columns, got {width}"
            )));
        }

        let mut cells = Vec::with_capacity(height);
        for (row_idx, raw) in rows.iter().enumerate() {
            let mut row = Vec::with_capacity(width);
            for (col_idx, ch) in raw.chars().enumerate() {
                let Some(cell) = Cell::from_char(ch) else {
                    return Err(EngineError::InvalidLevel(format!(
                        "unknown cell {ch:?} at ({col_idx},{row_idx})"
                    )));
                };
                row.push(cell);
            }
            if row.len() != width {
                return Err(EngineError::InvalidLevel(format!(
                    "row {row_idx} has {} columns, expected {width}",
                    row.len()
                )));
            }
            cells.push(row);
        }

        Ok(Self {
            width: width as i32,
            height: height as i32,
            cells,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * TILE
    }

    pub fn in_bounds(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && col < self.width && row < self.height
    }

    pub fn cell(&self, col: i32, row: i32) -> Option<Cell> {
        if !self.in_bounds(col, row) {
            return None;
        }
        Some(self.cells[row as usize][col as usize])
    }

    /// Turns a dot or power pellet into an empty cell and returns what was there.
    pub fn consume(&mut self, col: i32, row: i32) -> Option<Cell> {
        let cell = self.cell(col, row)?;
        if !matches!(cell, Cell::Dot | Cell::PowerPellet) {
            return None;
        }
        self.cells[row as usize][col as usize] = Cell::Empty;
        Some(cell)
    }

    /// A row wraps horizontally when neither edge cell is a wall.
    pub fn is_tunnel_row(&self, row: i32) -> bool {
        if row < 0 || row >= self.height {
            return false;
        }
        let cells = &self.cells[row as usize];
        cells[0] != Cell::Wall && cells[(self.width - 1) as usize] != Cell::Wall
    }

    pub fn is_walkable(&self, col: i32, row: i32, kind: ActorKind) -> bool {
        if row < 0 || row >= self.height {
            return false;
        }
        if col < 0 || col >= self.width {
            return match kind {
                ActorKind::Player | ActorKind::Ghost { .. } => self.is_tunnel_row(row),
                ActorKind::Mushroom => false,
            };
        }
        match self.cells[row as usize][col as usize] {
            Cell::Wall => false,
            Cell::GhostDoor => matches!(kind, ActorKind::Ghost { exited: false }),
            Cell::Empty | Cell::Dot | Cell::PowerPellet => true,
        }
    }

    pub fn count(&self, target: Cell) -> u32 {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| **cell == target)
            .count() as u32
    }

    pub fn cells_matching(&self, predicate: impl Fn(Cell) -> bool) -> Vec<Vec2> {
        let mut out = Vec::new();
        for (row_idx, row) in self.cells.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                if predicate(*cell) {
                    out.push(Vec2::new(col_idx as i32, row_idx as i32));
                }
            }
        }
        out
    }

    /// Flee targets: the four inner corners.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(1, 1),
            Vec2::new(self.width - 2, 1),
            Vec2::new(1, self.height - 2),
            Vec2::new(self.width - 2, self.height - 2),
        ]
    }

    pub fn tiles(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_char()).collect())
            .collect()
    }

    /// Neighbour of `tile` at offset `(dx, dy)`, folding tunnel exits back onto the grid.
    pub fn wrapped_neighbor(&self, tile: Vec2, dx: i32, dy: i32) -> Vec2 {
        let mut x = tile.x + dx;
        let y = tile.y + dy;
        if self.is_tunnel_row(y) {
            x = x.rem_euclid(self.width);
        }
        Vec2::new(x, y)
    }

    pub fn reachable_from(&self, start: Vec2, kind: ActorKind) -> HashSet<Vec2> {
        let mut out = HashSet::new();
        if !self.in_bounds(start.x, start.y) || !self.is_walkable(start.x, start.y, kind) {
            return out;
        }

        let mut queue = VecDeque::new();
        out.insert(start);
        queue.push_back(start);

        while let Some(tile) = queue.pop_front() {
            for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                let next = self.wrapped_neighbor(tile, dx, dy);
                if !self.in_bounds(next.x, next.y) || !self.is_walkable(next.x, next.y, kind) {
                    continue;
                }
                if out.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        out
    }
}
