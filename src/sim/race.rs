/// Algorithm race: pick a difficulty, a topic and a battle type, then
/// out-solve the other racers.
///
/// ## Start sequence
///   1. `on_start` posts the first toast (matchmaking / room created).
///   2. After `match_delay_ms` the second toast posts and racing opens.
///      Quick and ranked races gain one opponent at that moment; room
///      races keep their participant list at exactly `["You"]`.
///
/// Progress comes from evaluated submissions for the player and from the
/// evaluator on every countdown second for opponents. First to 100 wins;
/// at time-out the strict leader wins.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::info;

use crate::config::RaceConfig;
use crate::domain::score::{self, Evaluator};
use super::event::GameEvent;
use super::lifecycle::{GameHooks, Outcome};

pub const PLAYER_NAME: &str = "You";
pub const ROOM_CODE_LEN: usize = 6;
const ROOM_CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const OPPONENTS: [&str; 4] = ["ByteNinja", "AlgoAce", "StackSmasher", "RecursiveRex"];
const FINISH_LINE: u32 = 100;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Topic {
    Arrays,
    Strings,
    Trees,
    Graphs,
    DynamicProgramming,
    Sorting,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::Arrays, Topic::Strings, Topic::Trees,
        Topic::Graphs, Topic::DynamicProgramming, Topic::Sorting,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Topic::Arrays => "Arrays",
            Topic::Strings => "Strings",
            Topic::Trees => "Trees",
            Topic::Graphs => "Graphs",
            Topic::DynamicProgramming => "Dynamic Programming",
            Topic::Sorting => "Sorting",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BattleType {
    Quick,
    Ranked,
    Room,
}

impl BattleType {
    pub const ALL: [BattleType; 3] = [BattleType::Quick, BattleType::Ranked, BattleType::Room];

    pub fn label(self) -> &'static str {
        match self {
            BattleType::Quick => "Quick Match",
            BattleType::Ranked => "Ranked",
            BattleType::Room => "Private Room",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RaceError {
    #[error("Select a difficulty first")]
    MissingDifficulty,
    #[error("Select a topic first")]
    MissingTopic,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Racer {
    pub name: String,
    pub progress: u32,
}

impl Racer {
    fn new(name: &str) -> Self {
        Racer { name: name.to_string(), progress: 0 }
    }
}

/// Generate a room code: `ROOM_CODE_LEN` uppercase alphanumerics.
pub fn room_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_CHARS[rng.gen_range(0..ROOM_CODE_CHARS.len())] as char)
        .collect()
}

pub struct AlgorithmRace<E: Evaluator> {
    pub difficulty: Option<Difficulty>,
    pub topic: Option<Topic>,
    pub battle_type: BattleType,
    pub room_code: Option<String>,
    pub participants: Vec<Racer>,
    pub racing: bool,
    match_countdown: Option<Duration>,
    rules: RaceConfig,
    evaluator: E,
    rng: StdRng,
}

impl<E: Evaluator> AlgorithmRace<E> {
    pub fn new(rules: RaceConfig, evaluator: E, seed: u64) -> Self {
        AlgorithmRace {
            difficulty: None,
            topic: None,
            battle_type: BattleType::Quick,
            room_code: None,
            participants: vec![],
            racing: false,
            match_countdown: None,
            rules,
            evaluator,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Both a difficulty and a topic are needed before starting.
    pub fn validate(&self) -> Result<(Difficulty, Topic), RaceError> {
        let difficulty = self.difficulty.ok_or(RaceError::MissingDifficulty)?;
        let topic = self.topic.ok_or(RaceError::MissingTopic)?;
        Ok((difficulty, topic))
    }

    pub fn player(&self) -> Option<&Racer> {
        self.participants.iter().find(|r| r.name == PLAYER_NAME)
    }

    pub fn submit(&mut self, code: &str, events: &mut Vec<GameEvent>) -> Option<Outcome> {
        if !self.racing {
            return None;
        }
        let Some(s) = score::evaluate_submission(&mut self.evaluator, code) else {
            events.push(GameEvent::SubmissionRejected);
            return None;
        };
        let gain = score::progress(s, self.rules.progress_step);
        self.advance_racer(0, gain, events)
    }

    fn advance_racer(&mut self, idx: usize, gain: u32, events: &mut Vec<GameEvent>) -> Option<Outcome> {
        let racer = self.participants.get_mut(idx)?;
        racer.progress = racer.progress.saturating_add(gain).min(FINISH_LINE);
        events.push(GameEvent::RaceProgress { name: racer.name.clone(), progress: racer.progress });
        if racer.progress < FINISH_LINE {
            return None;
        }
        if idx == 0 { Some(Outcome::Victory) } else { Some(Outcome::Defeat) }
    }

    fn open_race(&mut self, events: &mut Vec<GameEvent>) {
        self.racing = true;
        if self.battle_type != BattleType::Room {
            let name = OPPONENTS[self.rng.gen_range(0..OPPONENTS.len())];
            self.participants.push(Racer::new(name));
        }
        events.push(GameEvent::Toast("Race started! Submit solutions to move ahead.".into()));
    }
}

impl<E: Evaluator> GameHooks for AlgorithmRace<E> {
    fn on_start(&mut self, events: &mut Vec<GameEvent>) {
        self.participants = vec![Racer::new(PLAYER_NAME)];
        self.racing = false;
        self.match_countdown = Some(Duration::from_millis(self.rules.match_delay_ms));

        let label = match self.validate() {
            Ok((d, t)) => format!("{} · {}", d.label(), t.label()),
            Err(_) => String::from("open"),
        };
        let toast = if self.battle_type == BattleType::Room {
            let code = room_code(&mut self.rng);
            let msg = format!("Room {} created ({})", code, label);
            self.room_code = Some(code);
            msg
        } else {
            self.room_code = None;
            format!("Finding an opponent ({})...", label)
        };
        info!(battle_type = ?self.battle_type, room = ?self.room_code, "race lobby opened");
        events.push(GameEvent::Toast(toast));
    }

    fn on_update(&mut self, dt: Duration, events: &mut Vec<GameEvent>) -> Option<Outcome> {
        if let Some(left) = self.match_countdown {
            if dt >= left {
                self.match_countdown = None;
                self.open_race(events);
            } else {
                self.match_countdown = Some(left - dt);
            }
        }
        None
    }

    fn on_tick(&mut self, _remaining: u32, events: &mut Vec<GameEvent>) -> Option<Outcome> {
        if !self.racing {
            return None;
        }
        for idx in 1..self.participants.len() {
            let s = self.evaluator.evaluate("opponent");
            let gain = score::progress(s, self.rules.opponent_step);
            if let Some(outcome) = self.advance_racer(idx, gain, events) {
                return Some(outcome);
            }
        }
        None
    }

    fn on_abandon(&mut self) {
        self.racing = false;
        self.match_countdown = None;
        self.room_code = None;
        self.participants.clear();
    }

    fn on_expire(&mut self) -> Outcome {
        let mine = self.participants.first().map_or(0, |r| r.progress);
        let best_other = self.participants.iter().skip(1).map(|r| r.progress).max().unwrap_or(0);
        if mine > best_other { Outcome::Victory } else { Outcome::Defeat }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::score::{FixedEvaluator, Score};
    use crate::sim::lifecycle::{GameSession, Phase};

    fn rules() -> RaceConfig {
        RaceConfig {
            duration_secs: 120,
            match_delay_ms: 2000,
            progress_step: 25,
            opponent_step: 5,
        }
    }

    fn race(bt: BattleType, score: u8) -> AlgorithmRace<FixedEvaluator> {
        let mut r = AlgorithmRace::new(rules(), FixedEvaluator(Score::new(score)), 77);
        r.difficulty = Some(Difficulty::Medium);
        r.topic = Some(Topic::Graphs);
        r.battle_type = bt;
        r
    }

    fn toasts(events: &[GameEvent]) -> usize {
        events.iter().filter(|e| matches!(e, GameEvent::Toast(_))).count()
    }

    #[test]
    fn selection_is_required() {
        let mut r = AlgorithmRace::new(rules(), FixedEvaluator(Score::new(1)), 1);
        assert_eq!(r.validate(), Err(RaceError::MissingDifficulty));
        r.difficulty = Some(Difficulty::Easy);
        assert_eq!(r.validate(), Err(RaceError::MissingTopic));
        r.topic = Some(Topic::Arrays);
        assert!(r.validate().is_ok());
    }

    #[test]
    fn every_selection_pair_posts_two_toasts() {
        for d in Difficulty::ALL {
            for t in Topic::ALL {
                let mut r = race(BattleType::Quick, 50);
                r.difficulty = Some(d);
                r.topic = Some(t);
                let mut s = GameSession::new(r, Some(120));
                assert_eq!(toasts(&s.start()), 1);
                assert_eq!(toasts(&s.advance(Duration::from_millis(1500))), 0);
                assert_eq!(toasts(&s.advance(Duration::from_millis(500))), 1);
                assert!(s.hooks().racing);
                assert_eq!(s.hooks().participants.len(), 2);
            }
        }
    }

    #[test]
    fn room_race_has_code_and_only_the_player() {
        let mut s = GameSession::new(race(BattleType::Room, 50), Some(120));
        s.start();
        let code = s.hooks().room_code.clone().unwrap_or_default();
        assert_eq!(code.len(), ROOM_CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        let names: Vec<&str> = s.hooks().participants.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["You"]);
        s.advance(Duration::from_secs(3));
        assert_eq!(s.hooks().participants.len(), 1);
    }

    #[test]
    fn submissions_before_match_are_ignored() {
        let mut s = GameSession::new(race(BattleType::Quick, 100), Some(120));
        s.start();
        s.act(|r, ev| r.submit("code", ev));
        assert_eq!(s.hooks().player().map(|r| r.progress), Some(0));
    }

    #[test]
    fn player_reaching_the_line_wins() {
        let mut s = GameSession::new(race(BattleType::Quick, 100), Some(120));
        s.start();
        s.advance(Duration::from_secs(2));
        for _ in 0..3 {
            s.act(|r, ev| r.submit("code", ev));
        }
        assert_eq!(s.hooks().player().map(|r| r.progress), Some(75));
        s.act(|r, ev| r.submit("code", ev));
        assert_eq!(s.phase(), Phase::Finished(Outcome::Victory));
    }

    #[test]
    fn faster_opponent_wins() {
        // opponent gains 5 per second
        let mut s = GameSession::new(race(BattleType::Ranked, 100), Some(120));
        s.start();
        s.advance(Duration::from_secs(2));
        s.advance(Duration::from_secs(20));
        assert_eq!(s.phase(), Phase::Finished(Outcome::Defeat));
    }

    #[test]
    fn room_codes_vary() {
        let mut rng = StdRng::seed_from_u64(5);
        let a = room_code(&mut rng);
        let b = room_code(&mut rng);
        assert_ne!(a, b);
    }

    #[test]
    fn abandoned_race_stops_racing() {
        let mut s = GameSession::new(race(BattleType::Room, 100), Some(120));
        s.start();
        s.back_to_menu();
        let r = s.hooks();
        assert!(!r.racing);
        assert_eq!(r.room_code, None);
        assert!(r.participants.is_empty());

        // a pending match never opens once the run is gone
        let mut q = GameSession::new(race(BattleType::Quick, 100), Some(120));
        q.start();
        q.back_to_menu();
        let mut ev = vec![];
        assert_eq!(q.hooks_mut().submit("code", &mut ev), None);
        q.start();
        assert!(!q.hooks().racing);
        assert_eq!(q.hooks().participants.len(), 1);
    }
}
