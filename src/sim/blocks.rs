/// Block drop: the falling-tetromino game, and the only pausable one.
///
/// Gravity runs off frame time. Every ten cleared lines shave
/// `SPEEDUP_PER_LEVEL` off the drop interval, down to `MIN_GRAVITY`.
/// A piece that cannot spawn ends the game.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::tetromino::{Board, Kind, Landing};
use super::event::GameEvent;
use super::lifecycle::{GameHooks, Outcome};

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;
const LINES_PER_LEVEL: u32 = 10;
const SPEEDUP_PER_LEVEL: Duration = Duration::from_millis(60);
const MIN_GRAVITY: Duration = Duration::from_millis(100);

pub struct BlockDrop {
    pub board: Board,
    pub next: Kind,
    base_gravity: Duration,
    accum: Duration,
    rng: StdRng,
}

impl BlockDrop {
    pub fn new(base_gravity: Duration, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let next = Kind::random(&mut rng);
        BlockDrop {
            board: Board::new(BOARD_WIDTH, BOARD_HEIGHT),
            next,
            base_gravity,
            accum: Duration::ZERO,
            rng,
        }
    }

    pub fn level(&self) -> u32 {
        self.board.lines_cleared / LINES_PER_LEVEL + 1
    }

    pub fn gravity(&self) -> Duration {
        let speedup = SPEEDUP_PER_LEVEL * (self.level() - 1);
        self.base_gravity.saturating_sub(speedup).max(MIN_GRAVITY)
    }

    fn spawn_next(&mut self) -> bool {
        let kind = self.next;
        self.next = Kind::random(&mut self.rng);
        self.board.spawn(kind)
    }

    fn settle(&mut self, landing: Landing, events: &mut Vec<GameEvent>) -> Option<Outcome> {
        match landing {
            Landing::Moved => None,
            Landing::Locked { lines } => {
                if lines > 0 {
                    events.push(GameEvent::LinesCleared { lines });
                }
                if self.spawn_next() { None } else { Some(Outcome::Finished) }
            }
            Landing::GameOver => Some(Outcome::Finished),
        }
    }

    pub fn shift_left(&mut self, _events: &mut Vec<GameEvent>) -> Option<Outcome> {
        self.board.move_left();
        None
    }

    pub fn shift_right(&mut self, _events: &mut Vec<GameEvent>) -> Option<Outcome> {
        self.board.move_right();
        None
    }

    pub fn rotate(&mut self, _events: &mut Vec<GameEvent>) -> Option<Outcome> {
        self.board.rotate();
        None
    }

    pub fn soft_drop(&mut self, events: &mut Vec<GameEvent>) -> Option<Outcome> {
        self.accum = Duration::ZERO;
        let landing = self.board.step_down();
        self.settle(landing, events)
    }

    pub fn hard_drop(&mut self, events: &mut Vec<GameEvent>) -> Option<Outcome> {
        self.accum = Duration::ZERO;
        let landing = self.board.hard_drop();
        self.settle(landing, events)
    }
}

impl GameHooks for BlockDrop {
    fn on_start(&mut self, _events: &mut Vec<GameEvent>) {
        self.board = Board::new(BOARD_WIDTH, BOARD_HEIGHT);
        self.accum = Duration::ZERO;
        self.spawn_next();
    }

    fn on_update(&mut self, dt: Duration, events: &mut Vec<GameEvent>) -> Option<Outcome> {
        self.accum += dt;
        while self.accum >= self.gravity() {
            self.accum -= self.gravity();
            let landing = self.board.step_down();
            if let Some(outcome) = self.settle(landing, events) {
                return Some(outcome);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::lifecycle::{GameSession, Phase};

    #[test]
    fn gravity_moves_the_piece_down() {
        let mut s = GameSession::new(BlockDrop::new(Duration::from_millis(500), 1), None).pausable();
        s.start();
        let y0 = s.hooks().board.active.map(|p| p.y);
        s.advance(Duration::from_millis(500));
        let y1 = s.hooks().board.active.map(|p| p.y);
        assert_eq!(y1, y0.map(|y| y + 1));
    }

    #[test]
    fn pause_freezes_gravity() {
        let mut s = GameSession::new(BlockDrop::new(Duration::from_millis(500), 1), None).pausable();
        s.start();
        s.pause();
        let before = s.hooks().board.active;
        s.advance(Duration::from_secs(5));
        assert_eq!(s.hooks().board.active, before);
        assert_eq!(s.phase(), Phase::Paused);
        // input is ignored while paused too
        s.act(|g, ev| g.hard_drop(ev));
        assert_eq!(s.hooks().board.active, before);
    }

    #[test]
    fn stacking_to_the_top_finishes() {
        let mut s = GameSession::new(BlockDrop::new(Duration::from_millis(500), 3), None);
        s.start();
        for _ in 0..200 {
            s.act(|g, ev| g.hard_drop(ev));
            if s.phase() != Phase::Playing { break; }
        }
        assert_eq!(s.phase(), Phase::Finished(Outcome::Finished));
    }

    #[test]
    fn gravity_speeds_up_with_level() {
        let mut g = BlockDrop::new(Duration::from_millis(500), 1);
        assert_eq!(g.gravity(), Duration::from_millis(500));
        g.board.lines_cleared = 20;
        assert_eq!(g.level(), 3);
        assert_eq!(g.gravity(), Duration::from_millis(380));
        g.board.lines_cleared = 500;
        assert_eq!(g.gravity(), MIN_GRAVITY);
    }
}
