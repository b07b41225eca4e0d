/// Maze run: collect every item, then reach the exit before time runs out.
///
/// Each level gets an independent grid from the generator. Clearing the
/// last level is a victory; the countdown running out is a defeat.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::grid::{self, Grid, GridSpec};
use super::event::GameEvent;
use super::lifecycle::{GameHooks, Outcome};

const ITEM_POINTS: u32 = 10;
const LEVEL_POINTS: u32 = 100;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    /// Neighbor of `pos` in this direction. Stepping off the top or left
    /// edge wraps to `usize::MAX`, which every grid reads as out of bounds.
    pub fn step(self, (x, y): (usize, usize)) -> (usize, usize) {
        match self {
            Dir::Up => (x, y.wrapping_sub(1)),
            Dir::Down => (x, y + 1),
            Dir::Left => (x.wrapping_sub(1), y),
            Dir::Right => (x + 1, y),
        }
    }
}

pub struct MazeGame {
    spec: GridSpec,
    levels: u32,
    rng: StdRng,
    pub grid: Grid,
    pub player: (usize, usize),
    pub level: u32,
    pub collected: usize,
    pub moves: u32,
    pub score: u32,
}

impl MazeGame {
    pub fn new(spec: GridSpec, levels: u32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let grid = grid::generate(&spec, &mut rng);
        let player = grid.start();
        MazeGame {
            spec,
            levels: levels.max(1),
            rng,
            grid,
            player,
            level: 1,
            collected: 0,
            moves: 0,
            score: 0,
        }
    }

    /// Replace the grid with a hand-built one (tests, fixed puzzles).
    pub fn with_grid(mut self, grid: Grid) -> Self {
        self.player = grid.start();
        self.grid = grid;
        self
    }

    pub fn levels(&self) -> u32 {
        self.levels
    }

    fn load_level(&mut self) {
        self.grid = grid::generate(&self.spec, &mut self.rng);
        self.player = self.grid.start();
    }

    pub fn move_player(&mut self, dir: Dir, events: &mut Vec<GameEvent>) -> Option<Outcome> {
        let (nx, ny) = dir.step(self.player);
        let target = self.grid.cell_at(nx, ny);
        if !target.is_walkable() {
            return None;
        }
        self.player = (nx, ny);
        self.moves += 1;

        if self.grid.take_item(nx, ny) {
            self.collected += 1;
            self.score += ITEM_POINTS;
            events.push(GameEvent::ItemCollected { x: nx, y: ny });
        }

        if target.is_exit() {
            let remaining = self.grid.items_remaining();
            if remaining > 0 {
                events.push(GameEvent::ExitLocked { remaining });
                return None;
            }
            self.score += LEVEL_POINTS;
            if self.level >= self.levels {
                return Some(Outcome::Victory);
            }
            self.level += 1;
            self.load_level();
            events.push(GameEvent::Toast(format!("Level {} of {}", self.level, self.levels)));
        }
        None
    }
}

impl GameHooks for MazeGame {
    fn on_start(&mut self, _events: &mut Vec<GameEvent>) {
        self.level = 1;
        self.collected = 0;
        self.moves = 0;
        self.score = 0;
        self.load_level();
    }

    fn on_expire(&mut self) -> Outcome {
        Outcome::Defeat
    }
}
