/// Application state: the current route, its screen, the session gate
/// and the transient message line.
///
/// Key handling runs once per frame; `tick` runs at the configured tick
/// rate and feeds elapsed time into whichever game is on screen. A
/// screen's sessions and timers live inside `Screen`, so navigating away
/// drops them.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use codemaster::config::GameConfig;
use codemaster::domain::cell::Cell;
use codemaster::domain::regex_trainer::{Attempt, RegexTrainer};
use codemaster::domain::score::RandomEvaluator;
use codemaster::domain::sort::{self, Algorithm};
use codemaster::domain::stack::StackModel;
use codemaster::export::{ComponentKind, DesignGraph};
use codemaster::routes::{GameId, Route};
use codemaster::session::gate::{GateView, SessionContext, SessionGate, PREMIUM_ROLE};
use codemaster::session::store::KeyValueStore;
use codemaster::sim::battle::CodeBattle;
use codemaster::sim::blocks::BlockDrop;
use codemaster::sim::event::GameEvent;
use codemaster::sim::lifecycle::{GameHooks, GameSession, Outcome, Phase};
use codemaster::sim::maze::{Dir, MazeGame};
use codemaster::sim::pathfind::GraphWalk;
use codemaster::sim::playback::Playback;
use codemaster::sim::race::{AlgorithmRace, BattleType, Difficulty, Topic};

use crate::ui::input::{EditAction, LineEditor};

pub type Eval = RandomEvaluator<StdRng>;

/// Message lifetime in ticks.
pub const MESSAGE_TICKS: u32 = 60;
const VICTORY_XP: u32 = 100;
const FINISH_XP: u32 = 25;
const EDITOR_LEN: usize = 120;
const FREE_ROLE: &str = "free";
pub const EXPORT_FILE: &str = "system-design.json";

// ══════════════════════════════════════════════════════════════
// Screens
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuEntry {
    Game(GameId),
    Sorting,
    SystemDesign,
    Store,
    Logout,
}

impl MenuEntry {
    pub fn label(self) -> &'static str {
        match self {
            MenuEntry::Game(g) => g.title(),
            MenuEntry::Sorting => "Sorting Visualizer",
            MenuEntry::SystemDesign => "System Design",
            MenuEntry::Store => "Store",
            MenuEntry::Logout => "Log out",
        }
    }
}

pub fn menu_entries() -> Vec<MenuEntry> {
    GameId::ALL.iter()
        .map(|g| MenuEntry::Game(*g))
        .chain([MenuEntry::Sorting, MenuEntry::SystemDesign, MenuEntry::Store, MenuEntry::Logout])
        .collect()
}

pub struct SortingView {
    pub input: Vec<i32>,
    pub algorithm: Algorithm,
    pub playback: Playback,
}

impl SortingView {
    fn new(input: Vec<i32>, algorithm: Algorithm, interval: Duration) -> Self {
        let playback = Playback::record(&input, algorithm, interval);
        SortingView { input, algorithm, playback }
    }

    fn rerecord(&mut self, interval: Duration) {
        self.playback = Playback::record(&self.input, self.algorithm, interval);
    }
}

#[derive(Default)]
pub struct DesignView {
    pub graph: DesignGraph,
    pub selected: usize,
    pub link_from: Option<u32>,
}

impl DesignView {
    pub fn selected_id(&self) -> Option<u32> {
        self.graph.components.get(self.selected).map(|c| c.id)
    }
}

pub struct RaceView {
    pub session: GameSession<AlgorithmRace<Eval>>,
    pub editor: LineEditor,
    /// Setup row: 0 difficulty, 1 topic, 2 battle type.
    pub row: usize,
}

pub enum Screen {
    Landing,
    Auth { signup: bool, email: LineEditor },
    Dashboard { cursor: usize },
    Store,
    Sorting(SortingView),
    Design(DesignView),
    Maze(GameSession<MazeGame>),
    Graph(GameSession<GraphWalk>),
    Battle(GameSession<CodeBattle<Eval>>, LineEditor),
    Race(RaceView),
    Regex(RegexTrainer, LineEditor),
    Stack(StackModel, LineEditor),
    Blocks(GameSession<BlockDrop>),
    Missing,
}

/// What the renderer should draw for the current route.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Visible {
    Blank,
    LoginPrompt,
    Screen,
}

/// Deferred effect of a key press, applied once the screen borrow ends.
enum Action {
    None,
    Go(Route),
    Quit,
    Message(String),
    Events(Vec<GameEvent>),
    Login { email: String, signup: bool },
    Upgrade,
    Logout,
    AwardXp(u32, String),
    Export,
}

// ══════════════════════════════════════════════════════════════
// App
// ══════════════════════════════════════════════════════════════

pub struct App<S: KeyValueStore> {
    pub route: Route,
    pub screen: Screen,
    pub gate: SessionGate,
    pub ctx: SessionContext<S>,
    pub config: GameConfig,
    pub message: String,
    pub message_timer: u32,
    pub quit: bool,
    rng: StdRng,
}

/// Landing and not-found pages are public; everything else is gated.
fn gated(route: &Route) -> bool {
    !matches!(route, Route::Root | Route::NotFound(_))
}

impl<S: KeyValueStore> App<S> {
    pub fn new(ctx: SessionContext<S>, config: GameConfig, seed: u64) -> Self {
        App {
            route: Route::Root,
            screen: Screen::Landing,
            gate: SessionGate::mount(),
            ctx,
            config,
            message: String::new(),
            message_timer: 0,
            quit: false,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    pub fn navigate(&mut self, route: Route) {
        info!(path = %route.path(), "navigate");
        self.screen = self.build_screen(&route);
        self.route = route;
        self.gate = SessionGate::mount();
    }

    pub fn visible(&self) -> Visible {
        if !gated(&self.route) {
            return Visible::Screen;
        }
        match self.gate.view(&self.route) {
            GateView::Nothing if self.route.is_auth() && !self.gate.is_loading() => Visible::Screen,
            GateView::Nothing => Visible::Blank,
            GateView::LoginPrompt => Visible::LoginPrompt,
            GateView::Content => Visible::Screen,
        }
    }

    fn evaluator(&mut self) -> Eval {
        RandomEvaluator::new(StdRng::seed_from_u64(self.rng.gen()))
    }

    fn build_screen(&mut self, route: &Route) -> Screen {
        let cfg = self.config.clone();
        match route {
            Route::Root => Screen::Landing,
            Route::Login => Screen::Auth { signup: false, email: LineEditor::new(EDITOR_LEN) },
            Route::Signup => Screen::Auth { signup: true, email: LineEditor::new(EDITOR_LEN) },
            Route::Dashboard => Screen::Dashboard { cursor: 0 },
            Route::Store => Screen::Store,
            Route::SystemDesign => Screen::Design(DesignView::default()),
            Route::DsaVisualization(topic) if topic == "sorting" => {
                let input = sort::random_input(cfg.sorting.array_len, &mut self.rng);
                Screen::Sorting(SortingView::new(input, cfg.sorting.algorithm, cfg.sorting.interval))
            }
            Route::DsaVisualization(_) | Route::NotFound(_) => Screen::Missing,
            Route::Game(game) => {
                let seed = self.rng.gen();
                match game {
                    GameId::Maze => Screen::Maze(GameSession::new(
                        MazeGame::new(cfg.grid.spec(), cfg.grid.levels, seed),
                        Some(cfg.timer.maze_secs),
                    )),
                    GameId::CodeMaze => Screen::Maze(GameSession::new(
                        MazeGame::new(cfg.grid.spec().with_item_cell(Cell::Code), cfg.grid.levels, seed),
                        Some(cfg.timer.code_maze_secs),
                    )),
                    GameId::GraphNav => Screen::Graph(GameSession::new(
                        GraphWalk::new(cfg.grid.graph_size, cfg.grid.graph_max_weight, seed),
                        Some(cfg.timer.graph_secs),
                    )),
                    GameId::CodeBattle => {
                        let battle = CodeBattle::new(cfg.battle.clone(), self.evaluator());
                        Screen::Battle(
                            GameSession::new(battle, Some(i64::from(cfg.battle.duration_secs))),
                            LineEditor::new(EDITOR_LEN),
                        )
                    }
                    GameId::AlgorithmRace => {
                        let race = AlgorithmRace::new(cfg.race.clone(), self.evaluator(), seed);
                        Screen::Race(RaceView {
                            session: GameSession::new(race, Some(i64::from(cfg.race.duration_secs))),
                            editor: LineEditor::new(EDITOR_LEN),
                            row: 0,
                        })
                    }
                    GameId::RegexTrainer => Screen::Regex(RegexTrainer::default(), LineEditor::new(EDITOR_LEN)),
                    GameId::StackAttack => Screen::Stack(StackModel::new(cfg.stack_capacity), LineEditor::new(EDITOR_LEN)),
                    GameId::BlockDrop => Screen::Blocks(GameSession::new(
                        BlockDrop::new(Duration::from_millis(cfg.timer.block_gravity_ms), seed),
                        None,
                    ).pausable()),
                }
            }
        }
    }

    // ── Input ──

    pub fn handle_keys(&mut self, keys: &[KeyEvent]) {
        for key in keys {
            if self.quit {
                break;
            }
            let action = match self.visible() {
                Visible::Blank => Action::None,
                Visible::LoginPrompt => match key.code {
                    KeyCode::Enter => Action::Go(Route::Login),
                    KeyCode::Esc => Action::Go(Route::Root),
                    _ => Action::None,
                },
                Visible::Screen => self.screen_key(key),
            };
            self.apply(action);
        }
    }

    fn screen_key(&mut self, key: &KeyEvent) -> Action {
        match &mut self.screen {
            Screen::Landing => landing_key(key),
            Screen::Auth { signup, email } => auth_key(signup, email, key),
            Screen::Dashboard { cursor } => dashboard_key(cursor, key),
            Screen::Store => match key.code {
                KeyCode::Enter => Action::Upgrade,
                KeyCode::Esc => Action::Go(Route::Dashboard),
                _ => Action::None,
            },
            Screen::Sorting(view) => sorting_key(view, key, &self.config, &mut self.rng),
            Screen::Design(view) => design_key(view, key),
            Screen::Maze(session) => lobby_key(session, key).unwrap_or_else(|| match dir_of(key) {
                Some(d) => Action::Events(session.act(|g, ev| g.move_player(d, ev))),
                None => Action::None,
            }),
            Screen::Graph(session) => lobby_key(session, key).unwrap_or_else(|| match dir_of(key) {
                Some(d) => Action::Events(session.act(|g, ev| g.step(d, ev))),
                None => Action::None,
            }),
            Screen::Battle(session, editor) => lobby_key(session, key).unwrap_or_else(|| {
                match editor.handle(key) {
                    EditAction::Submit => {
                        let code = editor.take();
                        Action::Events(session.act(|g, ev| g.submit(&code, ev)))
                    }
                    _ => Action::None,
                }
            }),
            Screen::Race(view) => race_key(view, key),
            Screen::Regex(trainer, editor) => regex_key(trainer, editor, key),
            Screen::Stack(model, editor) => stack_key(model, editor, key),
            Screen::Blocks(session) => blocks_key(session, key),
            Screen::Missing => match key.code {
                KeyCode::Enter | KeyCode::Esc => Action::Go(Route::Dashboard),
                _ => Action::None,
            },
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Go(route) => self.navigate(route),
            Action::Quit => self.quit = true,
            Action::Message(m) => self.set_message(&m, MESSAGE_TICKS),
            Action::Events(events) => self.handle_events(events),
            Action::Login { email, signup } => match self.ctx.login(&email, FREE_ROLE) {
                Ok(_) => {
                    self.navigate(Route::Dashboard);
                    let msg = if signup { "Account created. Welcome!" } else { "Welcome back!" };
                    self.set_message(msg, MESSAGE_TICKS);
                }
                Err(e) => {
                    warn!(error = %e, "login failed");
                    self.set_message(&format!("Login failed: {e}"), MESSAGE_TICKS);
                }
            },
            Action::Upgrade => {
                let mut session = self.ctx.get_session();
                session.role = Some(PREMIUM_ROLE.to_string());
                match self.ctx.set_session(&session) {
                    Ok(()) => self.set_message("Premium unlocked!", MESSAGE_TICKS),
                    Err(e) => {
                        warn!(error = %e, "upgrade failed");
                        self.set_message(&format!("Upgrade failed: {e}"), MESSAGE_TICKS);
                    }
                }
            }
            Action::Logout => {
                let home = self.ctx.logout();
                self.navigate(home);
                self.set_message("Logged out", MESSAGE_TICKS);
            }
            Action::AwardXp(points, msg) => self.award(points, &msg),
            Action::Export => {
                let result = match &self.screen {
                    Screen::Design(view) => view.graph.export(&self.config.general.data_dir, EXPORT_FILE),
                    _ => return,
                };
                match result {
                    Ok(path) => self.set_message(&format!("Exported to {}", path.display()), MESSAGE_TICKS),
                    Err(e) => {
                        warn!(error = %e, "export failed");
                        self.set_message(&format!("Export failed: {e}"), MESSAGE_TICKS);
                    }
                }
            }
        }
    }

    fn award(&mut self, points: u32, msg: &str) {
        match self.ctx.award_xp(points) {
            Ok(total) => self.set_message(&format!("{msg} +{points} XP ({total} total)"), MESSAGE_TICKS),
            Err(e) => {
                warn!(error = %e, "could not store xp");
                self.set_message(msg, MESSAGE_TICKS);
            }
        }
    }

    /// Turn game events into the message line and XP.
    fn handle_events(&mut self, events: Vec<GameEvent>) {
        let mut lines: Vec<String> = vec![];
        let mut xp = 0;
        for event in events {
            match event {
                GameEvent::Toast(text) => lines.push(text),
                GameEvent::Paused => lines.push("Paused".into()),
                GameEvent::TimerExpired => lines.push("Time's up!".into()),
                GameEvent::SubmissionRejected => lines.push("Write some code before submitting".into()),
                GameEvent::ExitLocked { remaining } => lines.push(format!("Collect {remaining} more first")),
                GameEvent::LinesCleared { lines: n } => lines.push(format!("{n} line(s) cleared")),
                GameEvent::PlayerHit { damage } => lines.push(format!("You took {damage} damage")),
                GameEvent::OpponentHit { damage } => lines.push(format!("Hit for {damage}!")),
                GameEvent::Ended { outcome } => match outcome {
                    Outcome::Victory => { xp += VICTORY_XP; lines.push("Victory!".into()); }
                    Outcome::Finished => { xp += FINISH_XP; lines.push("Finished.".into()); }
                    Outcome::Defeat => lines.push("Defeat. Press Enter to retry".into()),
                },
                _ => {}
            }
        }
        let text = lines.join("  ");
        if xp > 0 {
            self.award(xp, &text);
        } else if !text.is_empty() {
            self.set_message(&text, MESSAGE_TICKS);
        }
    }

    // ── Tick ──

    pub fn tick(&mut self, dt: Duration) {
        if self.gate.is_loading() {
            self.gate.resolve(&self.ctx);
        }
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 { self.message.clear(); }
        }
        let events = match &mut self.screen {
            Screen::Maze(s) => s.advance(dt),
            Screen::Graph(s) => s.advance(dt),
            Screen::Battle(s, _) => s.advance(dt),
            Screen::Race(v) => v.session.advance(dt),
            Screen::Blocks(s) => s.advance(dt),
            Screen::Sorting(v) => {
                v.playback.advance(dt);
                vec![]
            }
            _ => vec![],
        };
        if !events.is_empty() {
            self.handle_events(events);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Per-screen key handlers
// ══════════════════════════════════════════════════════════════

fn dir_of(key: &KeyEvent) -> Option<Dir> {
    match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') => Some(Dir::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => Some(Dir::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => Some(Dir::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => Some(Dir::Right),
        _ => None,
    }
}

/// Enter/Esc handling shared by every game. `None` = key belongs to play.
fn lobby_key<H: GameHooks>(session: &mut GameSession<H>, key: &KeyEvent) -> Option<Action> {
    match session.phase() {
        Phase::Menu | Phase::Finished(_) => Some(match key.code {
            KeyCode::Enter => Action::Events(session.start()),
            KeyCode::Esc => Action::Go(Route::Dashboard),
            _ => Action::None,
        }),
        Phase::Playing | Phase::Paused => match key.code {
            KeyCode::Esc => {
                session.back_to_menu();
                Some(Action::Message("Run abandoned".into()))
            }
            _ => None,
        },
    }
}

fn landing_key(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter => Action::Go(Route::Dashboard),
        KeyCode::Char('l') => Action::Go(Route::Login),
        KeyCode::Char('s') => Action::Go(Route::Signup),
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        _ => Action::None,
    }
}

fn valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((user, domain)) => !user.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'),
        None => false,
    }
}

fn auth_key(signup: &mut bool, email: &mut LineEditor, key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc => return Action::Go(Route::Root),
        KeyCode::Tab => {
            *signup = !*signup;
            return Action::None;
        }
        _ => {}
    }
    if email.handle(key) != EditAction::Submit {
        return Action::None;
    }
    let text = email.text().trim().to_string();
    if !valid_email(&text) {
        return Action::Message("Enter a valid email address".into());
    }
    email.clear();
    Action::Login { email: text, signup: *signup }
}

fn dashboard_key(cursor: &mut usize, key: &KeyEvent) -> Action {
    let entries = menu_entries();
    match key.code {
        KeyCode::Up => { *cursor = cursor.checked_sub(1).unwrap_or(entries.len() - 1); Action::None }
        KeyCode::Down => { *cursor = (*cursor + 1) % entries.len(); Action::None }
        KeyCode::Esc => Action::Go(Route::Root),
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Enter => match entries.get(*cursor) {
            Some(MenuEntry::Game(g)) => Action::Go(Route::Game(*g)),
            Some(MenuEntry::Sorting) => Action::Go(Route::DsaVisualization("sorting".into())),
            Some(MenuEntry::SystemDesign) => Action::Go(Route::SystemDesign),
            Some(MenuEntry::Store) => Action::Go(Route::Store),
            Some(MenuEntry::Logout) => Action::Logout,
            None => Action::None,
        },
        _ => Action::None,
    }
}

fn sorting_key(view: &mut SortingView, key: &KeyEvent, config: &GameConfig, rng: &mut StdRng) -> Action {
    let interval = config.sorting.interval;
    match key.code {
        KeyCode::Left => { view.playback.stop(); view.playback.prev(); }
        KeyCode::Right => { view.playback.stop(); view.playback.next(); }
        KeyCode::Char(' ') => view.playback.toggle(),
        KeyCode::Home => view.playback.reset(),
        KeyCode::End => { view.playback.stop(); view.playback.seek(usize::MAX); }
        KeyCode::Tab => {
            view.algorithm = view.algorithm.next();
            view.rerecord(interval);
        }
        KeyCode::Char('r') => {
            view.input = sort::random_input(config.sorting.array_len, rng);
            view.rerecord(interval);
        }
        KeyCode::Esc => return Action::Go(Route::Dashboard),
        _ => {}
    }
    Action::None
}

fn design_key(view: &mut DesignView, key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Char(c @ '1'..='7') => {
            let idx = c as usize - '1' as usize;
            view.graph.add(ComponentKind::ALL[idx]);
            view.selected = view.graph.components.len() - 1;
        }
        KeyCode::Up => view.selected = view.selected.saturating_sub(1),
        KeyCode::Down => {
            view.selected = (view.selected + 1).min(view.graph.components.len().saturating_sub(1));
        }
        KeyCode::Enter => {
            let Some(id) = view.selected_id() else { return Action::None };
            match view.link_from.take() {
                None => view.link_from = Some(id),
                Some(from) => {
                    if !view.graph.connect(from, id) {
                        return Action::Message("Those components cannot be linked".into());
                    }
                }
            }
        }
        KeyCode::Char('x') => {
            if let Some(id) = view.selected_id() {
                view.graph.remove(id);
                if view.link_from == Some(id) { view.link_from = None; }
                view.selected = view.selected.min(view.graph.components.len().saturating_sub(1));
            }
        }
        KeyCode::Char('c') => {
            view.graph.clear();
            view.selected = 0;
            view.link_from = None;
            return Action::Message("Board cleared".into());
        }
        KeyCode::Char('e') => return Action::Export,
        KeyCode::Esc => return Action::Go(Route::Dashboard),
        _ => {}
    }
    Action::None
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: Option<T>, forward: bool) -> T {
    let n = all.len();
    let idx = match current.and_then(|c| all.iter().position(|x| *x == c)) {
        None => 0,
        Some(i) if forward => (i + 1) % n,
        Some(i) => (i + n - 1) % n,
    };
    all[idx]
}

fn race_key(view: &mut RaceView, key: &KeyEvent) -> Action {
    if matches!(view.session.phase(), Phase::Menu | Phase::Finished(_)) {
        let race = view.session.hooks_mut();
        match key.code {
            KeyCode::Up => view.row = view.row.saturating_sub(1),
            KeyCode::Down => view.row = (view.row + 1).min(2),
            KeyCode::Left | KeyCode::Right => {
                let fwd = key.code == KeyCode::Right;
                match view.row {
                    0 => race.difficulty = Some(cycle(&Difficulty::ALL, race.difficulty, fwd)),
                    1 => race.topic = Some(cycle(&Topic::ALL, race.topic, fwd)),
                    _ => race.battle_type = cycle(&BattleType::ALL, Some(race.battle_type), fwd),
                }
            }
            KeyCode::Enter => {
                return match race.validate() {
                    Ok(_) => Action::Events(view.session.start()),
                    Err(e) => Action::Message(e.to_string()),
                };
            }
            KeyCode::Esc => return Action::Go(Route::Dashboard),
            _ => {}
        }
        return Action::None;
    }
    if let Some(action) = lobby_key(&mut view.session, key) {
        return action;
    }
    match view.editor.handle(key) {
        EditAction::Submit => {
            let code = view.editor.take();
            Action::Events(view.session.act(|g, ev| g.submit(&code, ev)))
        }
        _ => Action::None,
    }
}

fn regex_key(trainer: &mut RegexTrainer, editor: &mut LineEditor, key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc => return Action::Go(Route::Dashboard),
        KeyCode::Tab => {
            trainer.next_challenge();
            editor.clear();
            return Action::None;
        }
        _ => {}
    }
    if editor.handle(key) != EditAction::Submit {
        return Action::None;
    }
    let title = trainer.current().map(|c| c.title).unwrap_or_default();
    match trainer.submit(editor.text()) {
        Attempt::Solved { points } => {
            editor.clear();
            Action::AwardXp(points, format!("{title} solved!"))
        }
        Attempt::AlreadySolved => Action::Message("Already solved; try the next one (Tab)".into()),
        Attempt::Failed { passed, total } => Action::Message(format!("{passed}/{total} cases pass")),
        Attempt::Rejected { error } => Action::Message(format!("Pattern rejected: {error}")),
    }
}

fn stack_key(model: &mut StackModel, editor: &mut LineEditor, key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc => return Action::Go(Route::Dashboard),
        KeyCode::Down => {
            return match model.pop() {
                Ok(v) => Action::Message(format!("Popped \"{v}\"")),
                Err(e) => Action::Message(e.to_string()),
            };
        }
        KeyCode::Up => {
            return Action::Message(match model.peek() {
                Some(v) => format!("Top: \"{v}\""),
                None => "Stack is empty".into(),
            });
        }
        KeyCode::PageDown => {
            model.clear();
            return Action::Message("Stack cleared".into());
        }
        _ => {}
    }
    if editor.handle(key) != EditAction::Submit {
        return Action::None;
    }
    match model.push(editor.text()) {
        Ok(size) => {
            editor.clear();
            Action::Message(format!("Pushed ({size}/{})", model.capacity()))
        }
        Err(e) => Action::Message(e.to_string()),
    }
}

fn blocks_key(session: &mut GameSession<BlockDrop>, key: &KeyEvent) -> Action {
    if let Some(action) = lobby_key(session, key) {
        return action;
    }
    let events = match key.code {
        KeyCode::Char('p') => session.toggle_pause(),
        KeyCode::Left => session.act(|g, ev| g.shift_left(ev)),
        KeyCode::Right => session.act(|g, ev| g.shift_right(ev)),
        KeyCode::Up => session.act(|g, ev| g.rotate(ev)),
        KeyCode::Down => session.act(|g, ev| g.soft_drop(ev)),
        KeyCode::Char(' ') => session.act(|g, ev| g.hard_drop(ev)),
        _ => vec![],
    };
    Action::Events(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemaster::session::store::{MemoryStore, KEY_LOGGED_IN};
    use crossterm::event::KeyModifiers;

    const TICK: Duration = Duration::from_millis(50);

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn typed(s: &str) -> Vec<KeyEvent> {
        s.chars().map(|c| key(KeyCode::Char(c))).collect()
    }

    fn app(logged_in: bool) -> App<MemoryStore> {
        let mut store = MemoryStore::new();
        if logged_in {
            store.set(KEY_LOGGED_IN, "true").expect("memory write");
        }
        let config = GameConfig::parse("[general]\ndata_dir = \".\"\n").expect("config");
        App::new(SessionContext::new(store), config, 7)
    }

    fn go(app: &mut App<MemoryStore>, route: Route) {
        app.navigate(route);
        app.tick(TICK);
    }

    #[test]
    fn gated_screen_is_blank_until_first_tick() {
        let mut a = app(true);
        a.navigate(Route::Dashboard);
        assert_eq!(a.visible(), Visible::Blank);
        a.tick(TICK);
        assert_eq!(a.visible(), Visible::Screen);
    }

    #[test]
    fn logged_out_user_is_prompted_and_can_log_in() {
        let mut a = app(false);
        go(&mut a, Route::Dashboard);
        assert_eq!(a.visible(), Visible::LoginPrompt);

        a.handle_keys(&[key(KeyCode::Enter)]);
        assert_eq!(a.route, Route::Login);
        a.tick(TICK);
        assert_eq!(a.visible(), Visible::Screen);

        let mut keys = typed("dev@example.com");
        keys.push(key(KeyCode::Enter));
        a.handle_keys(&keys);
        assert_eq!(a.route, Route::Dashboard);
        assert!(a.ctx.get_session().is_logged_in);
        assert_eq!(a.ctx.get_session().email.as_deref(), Some("dev@example.com"));
    }

    #[test]
    fn bad_email_stays_on_login() {
        let mut a = app(false);
        go(&mut a, Route::Login);
        let mut keys = typed("nope");
        keys.push(key(KeyCode::Enter));
        a.handle_keys(&keys);
        assert_eq!(a.route, Route::Login);
        assert!(!a.ctx.get_session().is_logged_in);
        assert!(!a.message.is_empty());
    }

    #[test]
    fn logout_entry_clears_session_and_goes_home() {
        let mut a = app(true);
        go(&mut a, Route::Dashboard);
        a.handle_keys(&[key(KeyCode::Up), key(KeyCode::Enter)]);
        assert_eq!(a.route, Route::Root);
        assert!(!a.ctx.get_session().is_logged_in);
    }

    #[test]
    fn stack_screen_pushes_and_pops() {
        let mut a = app(true);
        go(&mut a, Route::Game(GameId::StackAttack));
        let mut keys = typed("alpha");
        keys.push(key(KeyCode::Enter));
        a.handle_keys(&keys);
        match &a.screen {
            Screen::Stack(model, _) => assert_eq!(model.items(), ["alpha".to_string()]),
            _ => panic!("expected stack screen"),
        }
        a.handle_keys(&[key(KeyCode::Down), key(KeyCode::Down)]);
        assert!(a.message.contains("underflow"));
    }

    #[test]
    fn solving_a_regex_awards_xp() {
        let mut a = app(true);
        go(&mut a, Route::Game(GameId::RegexTrainer));
        let mut keys = typed(r"^[\w.]+@\w+\.\w+$");
        keys.push(key(KeyCode::Enter));
        a.handle_keys(&keys);
        assert_eq!(a.ctx.xp(), 100);
        match &a.screen {
            Screen::Regex(t, _) => assert_eq!(t.challenges_completed, 1),
            _ => panic!("expected regex screen"),
        }
    }

    #[test]
    fn rejected_regex_shows_the_reason() {
        let mut a = app(true);
        go(&mut a, Route::Game(GameId::RegexTrainer));
        let mut keys = typed(r"(\w+)\1@");
        keys.push(key(KeyCode::Enter));
        a.handle_keys(&keys);
        assert!(a.message.starts_with("Pattern rejected:"), "{}", a.message);
        assert_eq!(a.ctx.xp(), 0);
    }

    #[test]
    fn race_needs_selections_before_starting() {
        let mut a = app(true);
        go(&mut a, Route::Game(GameId::AlgorithmRace));
        a.handle_keys(&[key(KeyCode::Enter)]);
        assert_eq!(a.message, "Select a difficulty first");

        // difficulty, topic, then room battle type
        a.handle_keys(&[
            key(KeyCode::Right),
            key(KeyCode::Down), key(KeyCode::Right),
            key(KeyCode::Down), key(KeyCode::Right), key(KeyCode::Right),
            key(KeyCode::Enter),
        ]);
        match &a.screen {
            Screen::Race(v) => {
                assert_eq!(v.session.phase(), Phase::Playing);
                assert_eq!(v.session.hooks().battle_type, BattleType::Room);
                assert_eq!(v.session.hooks().room_code.as_ref().map(String::len), Some(6));
            }
            _ => panic!("expected race screen"),
        }
    }

    #[test]
    fn leaving_a_game_drops_its_session() {
        let mut a = app(true);
        go(&mut a, Route::Game(GameId::Maze));
        a.handle_keys(&[key(KeyCode::Enter)]);
        assert!(matches!(&a.screen, Screen::Maze(s) if s.has_timer()));
        a.handle_keys(&[key(KeyCode::Esc)]);
        assert!(matches!(&a.screen, Screen::Maze(s) if !s.has_timer()));
        a.handle_keys(&[key(KeyCode::Esc)]);
        assert_eq!(a.route, Route::Dashboard);
    }

    #[test]
    fn sorting_screen_jumps_to_the_sorted_end() {
        let mut a = app(true);
        go(&mut a, Route::DsaVisualization("sorting".into()));
        a.handle_keys(&[key(KeyCode::End)]);
        match &a.screen {
            Screen::Sorting(v) => {
                assert!(v.playback.at_end());
                let mut sorted = v.input.clone();
                sorted.sort();
                assert_eq!(v.playback.current().map(|s| s.array.clone()), Some(sorted));
            }
            _ => panic!("expected sorting screen"),
        }
        a.handle_keys(&[key(KeyCode::Home)]);
        assert!(matches!(&a.screen, Screen::Sorting(v) if v.playback.position() == 0));
    }

    #[test]
    fn unknown_topic_is_missing_page() {
        let mut a = app(true);
        go(&mut a, Route::DsaVisualization("heaps".into()));
        assert!(matches!(a.screen, Screen::Missing));
        go(&mut a, Route::NotFound("/nope".into()));
        assert_eq!(a.visible(), Visible::Screen);
    }

    #[test]
    fn design_board_links_components() {
        let mut a = app(true);
        go(&mut a, Route::SystemDesign);
        a.handle_keys(&typed("13"));
        // select first, mark as source, select second, link
        a.handle_keys(&[key(KeyCode::Up), key(KeyCode::Enter), key(KeyCode::Down), key(KeyCode::Enter)]);
        match &a.screen {
            Screen::Design(v) => {
                assert_eq!(v.graph.components.len(), 2);
                assert_eq!(v.graph.connections.len(), 1);
            }
            _ => panic!("expected design screen"),
        }
    }

    #[test]
    fn design_board_clears() {
        let mut a = app(true);
        go(&mut a, Route::SystemDesign);
        a.handle_keys(&typed("125"));
        a.handle_keys(&[key(KeyCode::Enter), key(KeyCode::Char('c'))]);
        match &a.screen {
            Screen::Design(v) => {
                assert!(v.graph.components.is_empty());
                assert_eq!(v.link_from, None);
                assert_eq!(v.selected, 0);
            }
            _ => panic!("expected design screen"),
        }
        // ids keep counting from scratch after a clear
        a.handle_keys(&typed("1"));
        match &a.screen {
            Screen::Design(v) => assert_eq!(v.selected_id(), Some(1)),
            _ => panic!("expected design screen"),
        }
    }

    #[test]
    fn email_shape() {
        assert!(valid_email("a@b.co"));
        assert!(!valid_email("@b.co"));
        assert!(!valid_email("a@bco"));
        assert!(!valid_email("a@.co"));
    }
}
