/// Code battle: trade evaluated submissions against a simulated opponent.
///
/// A submission scoring at or above the pass threshold hits the opponent
/// for a score-proportional amount; a failing one costs the player a
/// fixed penalty. The opponent strikes on its own every few seconds.
/// Either health reaching zero ends the battle; so does the clock, which
/// counts as a defeat.

use tracing::debug;

use crate::config::BattleConfig;
use crate::domain::score::{self, Evaluator};
use super::event::GameEvent;
use super::lifecycle::{GameHooks, Outcome};

pub const PLAYER_MAX_HEALTH: u32 = 100;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BattlePhase {
    Lobby,
    Fighting,
    Victory,
    Defeat,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BattleState {
    pub player_health: u32,
    pub opponent_health: u32,
    pub opponent_max_health: u32,
    pub time_remaining: u32,
    pub phase: BattlePhase,
}

impl BattleState {
    pub fn new(opponent_max_health: u32, duration: u32) -> Self {
        BattleState {
            player_health: PLAYER_MAX_HEALTH,
            opponent_health: opponent_max_health,
            opponent_max_health,
            time_remaining: duration,
            phase: BattlePhase::Lobby,
        }
    }

    fn hit_player(&mut self, damage: u32) {
        self.player_health = self.player_health.saturating_sub(damage);
    }

    fn hit_opponent(&mut self, damage: u32) {
        self.opponent_health = self.opponent_health.saturating_sub(damage);
    }

    /// Terminal outcome implied by the current health values, if any.
    fn resolved(&self) -> Option<Outcome> {
        if self.opponent_health == 0 {
            Some(Outcome::Victory)
        } else if self.player_health == 0 {
            Some(Outcome::Defeat)
        } else {
            None
        }
    }
}

pub struct CodeBattle<E: Evaluator> {
    pub state: BattleState,
    rules: BattleConfig,
    evaluator: E,
    pub submissions: u32,
}

impl<E: Evaluator> CodeBattle<E> {
    pub fn new(rules: BattleConfig, evaluator: E) -> Self {
        CodeBattle {
            state: BattleState::new(rules.opponent_health, rules.duration_secs),
            rules,
            evaluator,
            submissions: 0,
        }
    }

    pub fn submit(&mut self, code: &str, events: &mut Vec<GameEvent>) -> Option<Outcome> {
        if self.state.phase != BattlePhase::Fighting {
            return None;
        }
        let Some(s) = score::evaluate_submission(&mut self.evaluator, code) else {
            events.push(GameEvent::SubmissionRejected);
            return None;
        };
        self.submissions += 1;
        debug!(score = s.value(), "submission evaluated");

        if score::passes(s, self.rules.pass_threshold) {
            let damage = score::damage(s, self.rules.max_damage);
            self.state.hit_opponent(damage);
            events.push(GameEvent::OpponentHit { damage });
        } else {
            let damage = self.rules.fail_penalty;
            self.state.hit_player(damage);
            events.push(GameEvent::PlayerHit { damage });
        }
        self.state.resolved()
    }

    fn opponent_strike(&mut self, events: &mut Vec<GameEvent>) -> Option<Outcome> {
        let s = self.evaluator.evaluate("opponent");
        let damage = score::damage(s, self.rules.opponent_max_damage);
        self.state.hit_player(damage);
        events.push(GameEvent::PlayerHit { damage });
        self.state.resolved()
    }
}

impl<E: Evaluator> GameHooks for CodeBattle<E> {
    fn on_start(&mut self, events: &mut Vec<GameEvent>) {
        self.state = BattleState::new(self.rules.opponent_health, self.rules.duration_secs);
        self.state.phase = BattlePhase::Fighting;
        self.submissions = 0;
        events.push(GameEvent::Toast("Battle started! Submit your solution.".into()));
    }

    fn on_tick(&mut self, remaining: u32, events: &mut Vec<GameEvent>) -> Option<Outcome> {
        self.state.time_remaining = remaining;
        let interval = self.rules.opponent_interval_secs.max(1);
        let elapsed = self.rules.duration_secs.saturating_sub(remaining);
        if remaining > 0 && elapsed % interval == 0 {
            return self.opponent_strike(events);
        }
        None
    }

    fn on_expire(&mut self) -> Outcome {
        Outcome::Defeat
    }

    fn on_end(&mut self, outcome: Outcome) {
        self.state.phase = match outcome {
            Outcome::Victory => BattlePhase::Victory,
            Outcome::Defeat | Outcome::Finished => BattlePhase::Defeat,
        };
    }

    fn on_abandon(&mut self) {
        self.state = BattleState::new(self.rules.opponent_health, self.rules.duration_secs);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::score::{FixedEvaluator, Score};
    use crate::sim::lifecycle::{GameSession, Phase};

    fn rules() -> BattleConfig {
        BattleConfig {
            duration_secs: 60,
            opponent_health: 100,
            max_damage: 40,
            pass_threshold: 60,
            fail_penalty: 15,
            opponent_interval_secs: 10,
            opponent_max_damage: 20,
        }
    }

    fn session(score: u8) -> GameSession<CodeBattle<FixedEvaluator>> {
        let battle = CodeBattle::new(rules(), FixedEvaluator(Score::new(score)));
        GameSession::new(battle, Some(60))
    }

    #[test]
    fn lobby_until_started() {
        let mut s = session(100);
        assert_eq!(s.hooks().state.phase, BattlePhase::Lobby);
        let mut ev = vec![];
        assert_eq!(s.hooks_mut().submit("fn x() {}", &mut ev), None);
        assert_eq!(s.hooks().state.opponent_health, 100);
        s.start();
        assert_eq!(s.hooks().state.phase, BattlePhase::Fighting);
    }

    #[test]
    fn strong_submissions_win() {
        let mut s = session(100);
        s.start();
        for _ in 0..2 {
            s.act(|b, ev| b.submit("solve()", ev));
        }
        assert_eq!(s.hooks().state.opponent_health, 20);
        let events = s.act(|b, ev| b.submit("solve()", ev));
        assert!(events.contains(&GameEvent::Ended { outcome: Outcome::Victory }));
        assert_eq!(s.hooks().state.phase, BattlePhase::Victory);
        assert_eq!(s.phase(), Phase::Finished(Outcome::Victory));
    }

    #[test]
    fn weak_submissions_hurt_the_player() {
        let mut s = session(10);
        s.start();
        for _ in 0..6 {
            s.act(|b, ev| b.submit("??", ev));
        }
        assert_eq!(s.hooks().state.player_health, 10);
        s.act(|b, ev| b.submit("??", ev));
        assert_eq!(s.hooks().state.phase, BattlePhase::Defeat);
    }

    #[test]
    fn blank_submission_is_rejected() {
        let mut s = session(100);
        s.start();
        let events = s.act(|b, ev| b.submit("   ", ev));
        assert_eq!(events, vec![GameEvent::SubmissionRejected]);
        assert_eq!(s.hooks().submissions, 0);
    }

    #[test]
    fn opponent_strikes_on_interval_and_clock_defeats() {
        // score 50: opponent hits for 10 every 10s
        let mut s = session(50);
        s.start();
        s.advance(Duration::from_secs(10));
        assert_eq!(s.hooks().state.player_health, 90);
        assert_eq!(s.hooks().state.time_remaining, 50);
        s.advance(Duration::from_secs(50));
        assert_eq!(s.phase(), Phase::Finished(Outcome::Defeat));
        assert_eq!(s.hooks().state.phase, BattlePhase::Defeat);
    }

    #[test]
    fn abandoned_battle_returns_to_lobby() {
        let mut s = session(100);
        s.start();
        s.act(|b, ev| b.submit("solve()", ev));
        s.back_to_menu();
        assert_eq!(s.hooks().state.phase, BattlePhase::Lobby);
        assert_eq!(s.hooks().state.opponent_health, 100);

        let mut ev = vec![];
        assert_eq!(s.hooks_mut().submit("solve()", &mut ev), None);
        assert!(ev.is_empty());
        assert_eq!(s.hooks().state.opponent_health, 100);
    }

    #[test]
    fn early_knockout_hides_the_rest_of_the_clock() {
        // opponent hits for 20 every 10s; the player is gone at t=50
        let mut s = session(100);
        s.start();
        let events = s.advance(Duration::from_secs(60));
        assert_eq!(s.phase(), Phase::Finished(Outcome::Defeat));
        assert_eq!(s.hooks().state.time_remaining, 10);
        assert!(!events.contains(&GameEvent::TimerExpired));
    }
}
