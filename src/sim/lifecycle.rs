/// Shared game lifecycle.
///
/// ```text
///   Menu ──start──▶ Playing ──finish──▶ Finished(outcome)
///                    │   ▲                  │
///              pause │   │ resume           ├──start──▶ Playing
///                    ▼   │                  └──back_to_menu──▶ Menu
///                   Paused  (pausable games only)
/// ```
///
/// Each game supplies a `GameHooks` type; `GameSession<H>` owns the hooks
/// and, while `Playing` or `Paused`, the countdown timer. Every transition
/// out of those two phases drops the timer, so nothing keeps ticking after
/// the game ends or the screen is left.

use std::time::Duration;

use tracing::debug;

use super::event::GameEvent;
use super::timer::{CountdownTimer, TimerEvent};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Finished,
    Victory,
    Defeat,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Menu,
    Playing,
    Paused,
    Finished(Outcome),
}

/// Per-game behavior plugged into the shared lifecycle.
/// Returning `Some(outcome)` from a hook ends the game.
pub trait GameHooks {
    fn on_start(&mut self, _events: &mut Vec<GameEvent>) {}

    /// Once per countdown second while playing.
    fn on_tick(&mut self, _remaining: u32, _events: &mut Vec<GameEvent>) -> Option<Outcome> {
        None
    }

    /// Once per frame while playing.
    fn on_update(&mut self, _dt: Duration, _events: &mut Vec<GameEvent>) -> Option<Outcome> {
        None
    }

    /// The countdown reached zero.
    fn on_expire(&mut self) -> Outcome {
        Outcome::Finished
    }

    fn on_end(&mut self, _outcome: Outcome) {}

    /// A run in progress was left without an outcome.
    fn on_abandon(&mut self) {}
}

pub struct GameSession<H: GameHooks> {
    hooks: H,
    phase: Phase,
    timer: Option<CountdownTimer>,
    duration: Option<i64>,
    pausable: bool,
}

impl<H: GameHooks> GameSession<H> {
    /// `duration` in seconds; `None` = untimed.
    pub fn new(hooks: H, duration: Option<i64>) -> Self {
        GameSession { hooks, phase: Phase::Menu, timer: None, duration, pausable: false }
    }

    pub fn pausable(mut self) -> Self {
        self.pausable = true;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn remaining(&self) -> Option<u32> {
        self.timer.as_ref().map(CountdownTimer::remaining)
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// Menu/Finished → Playing. No-op while a game is in progress.
    pub fn start(&mut self) -> Vec<GameEvent> {
        if matches!(self.phase, Phase::Playing | Phase::Paused) {
            return vec![];
        }
        let mut events = vec![GameEvent::Started];
        self.timer = self.duration.map(CountdownTimer::start);
        self.phase = Phase::Playing;
        self.hooks.on_start(&mut events);
        debug!(duration = ?self.duration, "game started");
        events
    }

    /// Abandon the current run (if any) and start a fresh one.
    pub fn restart(&mut self) -> Vec<GameEvent> {
        self.abandon();
        self.start()
    }

    pub fn pause(&mut self) -> Vec<GameEvent> {
        if !self.pausable || self.phase != Phase::Playing {
            return vec![];
        }
        if let Some(t) = self.timer.as_mut() { t.pause(); }
        self.phase = Phase::Paused;
        vec![GameEvent::Paused]
    }

    pub fn resume(&mut self) -> Vec<GameEvent> {
        if self.phase != Phase::Paused {
            return vec![];
        }
        if let Some(t) = self.timer.as_mut() { t.resume(); }
        self.phase = Phase::Playing;
        vec![GameEvent::Resumed]
    }

    pub fn toggle_pause(&mut self) -> Vec<GameEvent> {
        match self.phase {
            Phase::Playing => self.pause(),
            Phase::Paused => self.resume(),
            _ => vec![],
        }
    }

    /// Feed elapsed frame time. Only does work while `Playing`.
    pub fn advance(&mut self, dt: Duration) -> Vec<GameEvent> {
        if self.phase != Phase::Playing {
            return vec![];
        }
        let mut events = Vec::new();
        let mut outcome = None;

        // Seconds after a hook ends the game are never reported.
        let timer_events = self.timer.as_mut().map(|t| t.advance(dt)).unwrap_or_default();
        for e in timer_events {
            match e {
                TimerEvent::Tick { remaining } => {
                    events.push(GameEvent::TimerTick { remaining });
                    outcome = self.hooks.on_tick(remaining, &mut events);
                }
                TimerEvent::Expired => {
                    events.push(GameEvent::TimerExpired);
                    outcome = Some(self.hooks.on_expire());
                }
            }
            if outcome.is_some() {
                break;
            }
        }

        if outcome.is_none() {
            outcome = self.hooks.on_update(dt, &mut events);
        }
        if let Some(o) = outcome {
            events.extend(self.finish(o));
        }
        events
    }

    /// Run a player action against the hooks. Ignored unless `Playing`.
    pub fn act<F>(&mut self, f: F) -> Vec<GameEvent>
    where
        F: FnOnce(&mut H, &mut Vec<GameEvent>) -> Option<Outcome>,
    {
        if self.phase != Phase::Playing {
            return vec![];
        }
        let mut events = Vec::new();
        if let Some(o) = f(&mut self.hooks, &mut events) {
            events.extend(self.finish(o));
        }
        events
    }

    /// Playing/Paused → Finished(outcome).
    pub fn finish(&mut self, outcome: Outcome) -> Vec<GameEvent> {
        if !matches!(self.phase, Phase::Playing | Phase::Paused) {
            return vec![];
        }
        self.release();
        self.phase = Phase::Finished(outcome);
        self.hooks.on_end(outcome);
        debug!(?outcome, "game ended");
        vec![GameEvent::Ended { outcome }]
    }

    pub fn back_to_menu(&mut self) {
        self.abandon();
    }

    fn abandon(&mut self) {
        if matches!(self.phase, Phase::Playing | Phase::Paused) {
            self.hooks.on_abandon();
            debug!("game abandoned");
        }
        self.release();
        self.phase = Phase::Menu;
    }

    fn release(&mut self) {
        if let Some(mut t) = self.timer.take() {
            t.cancel();
        }
    }
}
