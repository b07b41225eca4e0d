/// Events emitted while a game session runs.
/// The presentation layer consumes these for messages and HUD updates.

use super::lifecycle::Outcome;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Started,
    Paused,
    Resumed,
    TimerTick { remaining: u32 },
    TimerExpired,
    Ended { outcome: Outcome },
    ItemCollected { x: usize, y: usize },
    /// Player reached the exit with collectibles left.
    ExitLocked { remaining: usize },
    PlayerHit { damage: u32 },
    OpponentHit { damage: u32 },
    SubmissionRejected,
    RaceProgress { name: String, progress: u32 },
    LinesCleared { lines: u32 },
    Toast(String),
}
