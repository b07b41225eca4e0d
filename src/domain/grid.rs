/// Randomized grid generation for the maze family of games.
///
/// ## Layout
///   - Border cells are always `Wall`.
///   - `obstacles` interior cells become walls (never start or exit).
///   - `items` collectibles land on reachable floor cells, no overlap.
///   - Start at `(1, 1)`; exactly one `Exit`, at the far corner `(n-2, n-2)`.
///
/// ## Solvability
///   Obstacle layouts are re-rolled until the exit is reachable from the
///   start (4-connected flood fill). After `MAX_ATTEMPTS` failed rolls the
///   obstacle count is halved; with zero obstacles the open interior is
///   always connected, so generation terminates.
///
/// Callers own all mutation after generation (`take_item`).

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::cell::Cell;

pub const MIN_SIZE: usize = 5;
const MAX_ATTEMPTS: u32 = 32;

#[derive(Clone, Debug)]
pub struct GridSpec {
    pub size: usize,
    pub obstacles: usize,
    pub items: usize,
    pub item_cell: Cell,
}

impl GridSpec {
    pub fn new(size: usize, obstacles: usize, items: usize) -> Self {
        GridSpec {
            size,
            obstacles,
            items,
            item_cell: Cell::Item,
        }
    }

    /// Code-maze variant: collectibles are `Code` fragments.
    pub fn with_item_cell(mut self, cell: Cell) -> Self {
        self.item_cell = cell;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Vec<Cell>>,
    size: usize,
    start: (usize, usize),
    exit: (usize, usize),
}

impl Grid {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn start(&self) -> (usize, usize) {
        self.start
    }

    pub fn exit(&self) -> (usize, usize) {
        self.exit
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    /// Cell at (x, y). Out of bounds reads as wall.
    #[inline]
    pub fn cell_at(&self, x: usize, y: usize) -> Cell {
        if x < self.size && y < self.size {
            self.cells[y][x]
        } else {
            Cell::Wall
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.size && y < self.size {
            self.cells[y][x] = cell;
        }
    }

    /// Pick up the collectible at (x, y), turning it back into floor.
    /// Returns false if there was nothing to collect.
    pub fn take_item(&mut self, x: usize, y: usize) -> bool {
        if self.cell_at(x, y).is_collectible() {
            self.set(x, y, Cell::Floor);
            true
        } else {
            false
        }
    }

    pub fn items_remaining(&self) -> usize {
        self.cells.iter()
            .flat_map(|row| row.iter())
            .filter(|c| c.is_collectible())
            .count()
    }

    /// Flood fill over walkable cells, starting at `from`.
    pub fn reachable_from(&self, from: (usize, usize)) -> Vec<Vec<bool>> {
        let mut seen = vec![vec![false; self.size]; self.size];
        if !self.cell_at(from.0, from.1).is_walkable() {
            return seen;
        }
        let mut queue = VecDeque::new();
        seen[from.1][from.0] = true;
        queue.push_back(from);

        while let Some((x, y)) = queue.pop_front() {
            for (nx, ny) in neighbors(x, y, self.size) {
                if !seen[ny][nx] && self.cells[ny][nx].is_walkable() {
                    seen[ny][nx] = true;
                    queue.push_back((nx, ny));
                }
            }
        }
        seen
    }

    pub fn is_reachable(&self, from: (usize, usize), to: (usize, usize)) -> bool {
        if to.0 >= self.size || to.1 >= self.size { return false; }
        self.reachable_from(from)[to.1][to.0]
    }

    /// Build a grid from a text diagram (see `Cell::from_glyph`).
    /// The start is (1, 1); the exit is the first `E` found.
    pub fn from_rows(rows: &[&str]) -> Grid {
        let size = rows.len();
        let mut cells = vec![vec![Cell::Wall; size]; size];
        let mut exit = (size.saturating_sub(2), size.saturating_sub(2));
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().take(size).enumerate() {
                let cell = Cell::from_glyph(ch);
                if cell == Cell::Exit { exit = (x, y); }
                cells[y][x] = cell;
            }
        }
        Grid { cells, size, start: (1, 1), exit }
    }

    fn blank(size: usize, start: (usize, usize), exit: (usize, usize)) -> Grid {
        let mut cells = vec![vec![Cell::Floor; size]; size];
        for (y, row) in cells.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                if x == 0 || y == 0 || x == size - 1 || y == size - 1 {
                    *cell = Cell::Wall;
                }
            }
        }
        cells[exit.1][exit.0] = Cell::Exit;
        Grid { cells, size, start, exit }
    }
}

/// 4-connected in-bounds neighbors of (x, y).
fn neighbors(x: usize, y: usize, size: usize) -> impl Iterator<Item = (usize, usize)> {
    let mut out = Vec::with_capacity(4);
    if x > 0 { out.push((x - 1, y)); }
    if y > 0 { out.push((x, y - 1)); }
    if x + 1 < size { out.push((x + 1, y)); }
    if y + 1 < size { out.push((x, y + 1)); }
    out.into_iter()
}

/// Produce an independent, solvable grid for one level/attempt.
pub fn generate<R: Rng + ?Sized>(spec: &GridSpec, rng: &mut R) -> Grid {
    let size = spec.size.max(MIN_SIZE);
    let start = (1, 1);
    let exit = (size - 2, size - 2);

    let mut candidates: Vec<(usize, usize)> = (1..size - 1)
        .flat_map(|y| (1..size - 1).map(move |x| (x, y)))
        .filter(|&p| p != start && p != exit)
        .collect();

    let mut obstacles = spec.obstacles.min(candidates.len());
    let mut attempts = 0;

    let mut grid = loop {
        let mut grid = Grid::blank(size, start, exit);
        candidates.shuffle(rng);
        for &(x, y) in candidates.iter().take(obstacles) {
            grid.set(x, y, Cell::Wall);
        }
        if grid.is_reachable(start, exit) {
            break grid;
        }

        attempts += 1;
        if attempts >= MAX_ATTEMPTS {
            debug!(size, obstacles, "exit sealed off repeatedly, halving obstacles");
            obstacles /= 2;
            attempts = 0;
        }
    };

    // Collectibles only on floor the player can actually reach.
    let reach = grid.reachable_from(start);
    let mut floor: Vec<(usize, usize)> = candidates.iter()
        .copied()
        .filter(|&(x, y)| grid.cell_at(x, y) == Cell::Floor && reach[y][x])
        .collect();
    floor.shuffle(rng);
    for &(x, y) in floor.iter().take(spec.items) {
        grid.set(x, y, spec.item_cell);
    }

    debug!(size, obstacles, items = grid.items_remaining(), "grid generated");
    grid
}
