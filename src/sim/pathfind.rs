/// Graph navigation: walk a weighted grid from corner to corner as
/// cheaply as possible.
///
/// Stepping back onto the previous node undoes the last move. Reaching
/// the goal on an optimal route is a victory; any other route finishes
/// the run with the cost difference reported.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::graph::WeightGrid;
use super::event::GameEvent;
use super::lifecycle::{GameHooks, Outcome};
use super::maze::Dir;

pub struct GraphWalk {
    size: usize,
    max_weight: u32,
    rng: StdRng,
    pub grid: WeightGrid,
    pub path: Vec<(usize, usize)>,
    pub cost: u32,
    pub optimal: u32,
}

impl GraphWalk {
    pub fn new(size: usize, max_weight: u32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let grid = WeightGrid::generate(size, max_weight, &mut rng);
        GraphWalk {
            size,
            max_weight,
            rng,
            optimal: grid.cheapest_path_cost(),
            path: vec![grid.start()],
            grid,
            cost: 0,
        }
    }

    pub fn with_grid(mut self, grid: WeightGrid) -> Self {
        self.optimal = grid.cheapest_path_cost();
        self.grid = grid;
        self.reset_path();
        self
    }

    pub fn position(&self) -> (usize, usize) {
        self.path.last().copied().unwrap_or_else(|| self.grid.start())
    }

    pub fn visited(&self, x: usize, y: usize) -> bool {
        self.path.contains(&(x, y))
    }

    fn reset_path(&mut self) {
        self.path = vec![self.grid.start()];
        self.cost = 0;
    }

    fn recost(&mut self) {
        self.cost = self.grid.path_cost(&self.path).unwrap_or(self.cost);
    }

    pub fn step(&mut self, dir: Dir, events: &mut Vec<GameEvent>) -> Option<Outcome> {
        let (nx, ny) = dir.step(self.position());
        self.grid.node(nx, ny)?;

        if self.path.len() >= 2 && self.path[self.path.len() - 2] == (nx, ny) {
            self.path.pop();
            self.recost();
            return None;
        }
        if self.visited(nx, ny) {
            return None;
        }

        self.path.push((nx, ny));
        self.recost();

        if (nx, ny) != self.grid.goal() {
            return None;
        }
        if self.cost <= self.optimal {
            events.push(GameEvent::Toast(format!("Optimal route! Cost {}", self.cost)));
            Some(Outcome::Victory)
        } else {
            events.push(GameEvent::Toast(format!(
                "Route cost {} (best possible {})", self.cost, self.optimal,
            )));
            Some(Outcome::Finished)
        }
    }
}

impl GameHooks for GraphWalk {
    fn on_start(&mut self, _events: &mut Vec<GameEvent>) {
        self.grid = WeightGrid::generate(self.size, self.max_weight, &mut self.rng);
        self.optimal = self.grid.cheapest_path_cost();
        self.reset_path();
    }

    fn on_expire(&mut self) -> Outcome {
        Outcome::Defeat
    }
}
