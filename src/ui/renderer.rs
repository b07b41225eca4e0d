/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Every screen has one `compose_*` method; the HUD, message bar and
/// help line are shared.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use codemaster::domain::cell::Cell as MapCell;
use codemaster::domain::regex_trainer::RegexTrainer;
use codemaster::domain::stack::StackModel;
use codemaster::domain::tetromino::Kind;
use codemaster::session::store::KeyValueStore;
use codemaster::sim::battle::{CodeBattle, PLAYER_MAX_HEALTH};
use codemaster::sim::blocks::BlockDrop;
use codemaster::sim::lifecycle::{GameHooks, GameSession, Outcome, Phase};
use codemaster::sim::maze::MazeGame;
use codemaster::sim::pathfind::GraphWalk;

use crate::app::{menu_entries, App, DesignView, Eval, RaceView, Screen, SortingView, Visible};
use crate::ui::input::LineEditor;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// terminal's own default never shows between rows.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    /// Horizontal meter: `filled` of `width` cells in `fg`, the rest dim.
    fn bar(&mut self, x: usize, y: usize, width: usize, value: u32, max: u32, fg: Color) {
        let filled = if max == 0 { 0 } else { (value.min(max) as usize * width) / max as usize };
        for i in 0..width {
            let (ch, c) = if i < filled { ('█', fg) } else { ('░', DIM) };
            self.set(x + i, y, Cell::new(ch, c, Color::Reset));
        }
    }
}

// ── Palette ──

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const TITLE: Color = Color::Rgb { r: 255, g: 220, b: 50 };
const KEY: Color = Color::Rgb { r: 100, g: 200, b: 255 };
const TEXT: Color = Color::Rgb { r: 200, g: 200, b: 200 };
const DIM: Color = Color::Rgb { r: 90, g: 90, b: 100 };
const GOOD: Color = Color::Rgb { r: 80, g: 220, b: 120 };
const BAD: Color = Color::Rgb { r: 240, g: 80, b: 80 };
const SELECT_BG: Color = Color::Rgb { r: 50, g: 50, b: 90 };

/// Each map cell = 2 terminal columns.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const BODY_ROW: usize = 2;
const LEFT: usize = 2;

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render<S: KeyValueStore>(&mut self, app: &App<S>) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        self.compose_hud(app);
        let help = match app.visible() {
            Visible::Blank => "",
            Visible::LoginPrompt => {
                self.compose_login_prompt();
                "Enter:Log in  Esc:Home"
            }
            Visible::Screen => self.compose_screen(app),
        };
        self.compose_footer(&app.message, help);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: shared chrome ──

    fn compose_hud<S: KeyValueStore>(&mut self, app: &App<S>) {
        let session = app.ctx.get_session();
        let who = match (&session.email, session.is_logged_in) {
            (Some(email), true) if session.is_premium() => format!("{email} ★"),
            (Some(email), true) => email.clone(),
            _ => "guest".into(),
        };
        let hud = format!(" CodeMaster OS │ {} │ {} │ XP {} ", app.route.path(), who, app.ctx.xp());
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    fn compose_footer(&mut self, message: &str, help: &str) {
        let h = self.front.height;
        if h < 4 { return; }
        if !message.is_empty() {
            self.front.fill_row(h - 3, MSG_BG);
            self.front.put_str(0, h - 3, &format!(" ◈ {} ", message), Color::Black, MSG_BG);
        }
        self.front.put_str(1, h - 1, help, DIM, Color::Reset);
    }

    fn compose_login_prompt(&mut self) {
        let y = BODY_ROW + 2;
        self.front.put_str(LEFT, y, "╔════════════════════════════╗", TITLE, Color::Reset);
        self.front.put_str(LEFT, y + 1, "║   Please log in first.     ║", TITLE, Color::Reset);
        self.front.put_str(LEFT, y + 2, "╚════════════════════════════╝", TITLE, Color::Reset);
        self.front.put_str(LEFT, y + 4, "This page needs an account.", TEXT, Color::Reset);
    }

    fn compose_editor(&mut self, y: usize, label: &str, editor: &LineEditor) {
        self.front.put_str(LEFT, y, label, KEY, Color::Reset);
        let x0 = LEFT + label.chars().count() + 1;
        self.front.put_str(x0, y, editor.text(), Color::White, SELECT_BG);
        let cursor_ch = editor.text().chars().nth(editor.cursor()).unwrap_or(' ');
        self.front.set(x0 + editor.cursor(), y, Cell::new(cursor_ch, Color::Black, Color::White));
    }

    fn compose_phase(&mut self, y: usize, phase: Phase, start_hint: &str) {
        let (text, color) = match phase {
            Phase::Menu => (format!("Press Enter to {start_hint}"), KEY),
            Phase::Playing => return,
            Phase::Paused => ("▶ PAUSED ◀  (p to resume)".to_string(), TITLE),
            Phase::Finished(Outcome::Victory) => ("VICTORY!  Enter: play again".to_string(), GOOD),
            Phase::Finished(Outcome::Defeat) => ("DEFEAT.  Enter: try again".to_string(), BAD),
            Phase::Finished(Outcome::Finished) => ("FINISHED.  Enter: play again".to_string(), TITLE),
        };
        self.front.put_str(LEFT, y, &text, color, Color::Reset);
    }

    fn timer_text<H: GameHooks>(session: &GameSession<H>) -> String {
        match session.remaining() {
            Some(s) => format!("⏱ {}:{:02}", s / 60, s % 60),
            None => String::new(),
        }
    }

    // ── Compose: screens ──

    /// Draw the current screen; returns its help line.
    fn compose_screen<S: KeyValueStore>(&mut self, app: &App<S>) -> &'static str {
        match &app.screen {
            Screen::Landing => {
                self.compose_landing();
                "Enter:Dashboard  l:Log in  s:Sign up  q:Quit"
            }
            Screen::Auth { signup, email } => {
                let title = if *signup { "Create your account" } else { "Welcome back" };
                self.front.put_str(LEFT, BODY_ROW, title, TITLE, Color::Reset);
                self.compose_editor(BODY_ROW + 2, "Email:", email);
                "Enter:Submit  Tab:Switch log in/sign up  Esc:Home"
            }
            Screen::Dashboard { cursor } => {
                self.compose_dashboard(*cursor);
                "↑↓:Select  Enter:Open  Esc:Home  q:Quit"
            }
            Screen::Store => {
                let premium = app.ctx.get_session().is_premium();
                self.front.put_str(LEFT, BODY_ROW, "Store", TITLE, Color::Reset);
                let line = if premium { "You are a premium member." } else { "Premium: every game, every topic." };
                self.front.put_str(LEFT, BODY_ROW + 2, line, TEXT, Color::Reset);
                "Enter:Upgrade  Esc:Back"
            }
            Screen::Sorting(view) => {
                self.compose_sorting(view);
                "←→:Step  Space:Play/Pause  Tab:Algorithm  r:New array  Home/End:Jump  Esc:Back"
            }
            Screen::Design(view) => {
                self.compose_design(view);
                "1-7:Add  ↑↓:Select  Enter:Link  x:Remove  c:Clear  e:Export  Esc:Back"
            }
            Screen::Maze(session) => {
                self.compose_maze(session);
                "Arrows/WASD:Move  Enter:Start  Esc:Back"
            }
            Screen::Graph(session) => {
                self.compose_graph(session);
                "Arrows/WASD:Move (back to undo)  Enter:Start  Esc:Back"
            }
            Screen::Battle(session, editor) => {
                self.compose_battle(session, editor);
                "Type code, Enter:Submit  Esc:Back"
            }
            Screen::Race(view) => {
                self.compose_race(view);
                "↑↓←→:Setup  Enter:Start/Submit  Esc:Back"
            }
            Screen::Regex(trainer, editor) => {
                self.compose_regex(trainer, editor);
                "Type a pattern, Enter:Check  Tab:Next challenge  Esc:Back"
            }
            Screen::Stack(model, editor) => {
                self.compose_stack(model, editor);
                "Enter:Push  ↓:Pop  ↑:Peek  PgDn:Clear  Esc:Back"
            }
            Screen::Blocks(session) => {
                self.compose_blocks(session);
                "←→:Move  ↑:Rotate  ↓:Soft drop  Space:Hard drop  p:Pause  Esc:Back"
            }
            Screen::Missing => {
                self.front.put_str(LEFT, BODY_ROW, "404 · Nothing here", BAD, Color::Reset);
                self.front.put_str(LEFT, BODY_ROW + 2, "That page does not exist.", TEXT, Color::Reset);
                "Enter/Esc:Dashboard"
            }
        }
    }

    fn compose_landing(&mut self) {
        let art = [
            "  ____          _      __  __           _            ",
            " / ___|___   __| | ___|  \\/  | __ _ ___| |_ ___ _ __ ",
            "| |   / _ \\ / _` |/ _ \\ |\\/| |/ _` / __| __/ _ \\ '__|",
            "| |__| (_) | (_| |  __/ |  | | (_| \\__ \\ ||  __/ |   ",
            " \\____\\___/ \\__,_|\\___|_|  |_|\\__,_|___/\\__\\___|_|   ",
        ];
        for (i, line) in art.iter().enumerate() {
            self.front.put_str(LEFT, BODY_ROW + i, line, TITLE, Color::Reset);
        }
        self.front.put_str(LEFT, BODY_ROW + art.len() + 1, "Learn algorithms by playing.", TEXT, Color::Reset);
    }

    fn compose_dashboard(&mut self, cursor: usize) {
        self.front.put_str(LEFT, BODY_ROW, "Dashboard", TITLE, Color::Reset);
        for (i, entry) in menu_entries().iter().enumerate() {
            let y = BODY_ROW + 2 + i;
            let selected = i == cursor;
            let bg = if selected { SELECT_BG } else { Color::Reset };
            let marker = if selected { "▶ " } else { "  " };
            self.front.put_str(LEFT, y, &format!("{marker}{:<24}", entry.label()), Color::White, bg);
        }
    }

    fn compose_sorting(&mut self, view: &SortingView) {
        let pb = &view.playback;
        let status = if pb.is_playing() { "playing" } else { "paused" };
        let header = format!("{}  step {}/{}  [{}]", view.algorithm.name(), pb.position() + 1, pb.len().max(1), status);
        self.front.put_str(LEFT, BODY_ROW, &header, TITLE, Color::Reset);

        let Some(step) = pb.current() else {
            self.front.put_str(LEFT, BODY_ROW + 2, "Nothing to sort.", TEXT, Color::Reset);
            return;
        };
        let max = step.array.iter().copied().max().unwrap_or(1).max(1);
        let chart_h = self.front.height.saturating_sub(BODY_ROW + 7).max(1);
        let base = BODY_ROW + 2 + chart_h;
        for (i, &v) in step.array.iter().enumerate() {
            let color = match step.comparing {
                Some((a, b)) if i == a || i == b => if step.swapping { BAD } else { TITLE },
                _ if pb.at_end() => GOOD,
                _ => KEY,
            };
            let h = ((v.max(0) as usize) * chart_h / max as usize).max(1);
            let x = LEFT + i * 3;
            for dy in 0..h {
                self.front.set(x, base - dy, Cell::new('█', color, Color::Reset));
                self.front.set(x + 1, base - dy, Cell::new('█', color, Color::Reset));
            }
            self.front.put_str(x, base + 1, &format!("{v:<3}"), DIM, Color::Reset);
        }
    }

    fn compose_design(&mut self, view: &DesignView) {
        self.front.put_str(LEFT, BODY_ROW, "System Design", TITLE, Color::Reset);
        let palette: Vec<String> = codemaster::export::ComponentKind::ALL.iter()
            .enumerate()
            .map(|(i, k)| format!("{}:{}", i + 1, k.label()))
            .collect();
        self.front.put_str(LEFT, BODY_ROW + 1, &palette.join("  "), DIM, Color::Reset);

        for (i, c) in view.graph.components.iter().enumerate() {
            let y = BODY_ROW + 3 + i;
            let bg = if i == view.selected { SELECT_BG } else { Color::Reset };
            let link = if view.link_from == Some(c.id) { " ⇢ linking" } else { "" };
            self.front.put_str(LEFT, y, &format!("#{:<3} {}{}", c.id, c.label, link), Color::White, bg);
        }
        let x = LEFT + 36;
        self.front.put_str(x, BODY_ROW + 3, "Connections", KEY, Color::Reset);
        let label = |id: u32| view.graph.components.iter().find(|c| c.id == id).map_or("?", |c| c.label.as_str());
        for (i, link) in view.graph.connections.iter().enumerate() {
            let line = format!("{} → {}", label(link.from), label(link.to));
            self.front.put_str(x, BODY_ROW + 4 + i, &line, TEXT, Color::Reset);
        }
    }

    fn compose_maze(&mut self, session: &GameSession<MazeGame>) {
        let g = session.hooks();
        let hud = format!(
            "Level {}/{}  Items left {}  Score {}  {}",
            g.level, g.levels(), g.grid.items_remaining(), g.score, Self::timer_text(session),
        );
        self.front.put_str(LEFT, BODY_ROW, &hud, TITLE, Color::Reset);
        self.compose_phase(BODY_ROW + 1, session.phase(), "start");

        for (y, row) in g.grid.rows().iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                let (glyph, fg, bg) = if (x, y) == g.player {
                    ("@@", Color::White, Color::Rgb { r: 40, g: 120, b: 220 })
                } else {
                    match cell {
                        MapCell::Wall => ("██", Color::Rgb { r: 70, g: 70, b: 110 }, Color::Reset),
                        MapCell::Floor => ("  ", Color::White, Color::Reset),
                        MapCell::Item => ("◆ ", TITLE, Color::Reset),
                        MapCell::Code => ("{}", GOOD, Color::Reset),
                        MapCell::Exit => ("▣ ", if g.grid.items_remaining() == 0 { GOOD } else { DIM }, Color::Reset),
                    }
                };
                self.front.put_str(LEFT + x * CELL_W, BODY_ROW + 3 + y, glyph, fg, bg);
            }
        }
    }

    fn compose_graph(&mut self, session: &GameSession<GraphWalk>) {
        let w = session.hooks();
        let mut hud = format!("Route cost {}  {}", w.cost, Self::timer_text(session));
        if let Phase::Finished(_) = session.phase() {
            hud.push_str(&format!("  (best {})", w.optimal));
        }
        self.front.put_str(LEFT, BODY_ROW, &hud, TITLE, Color::Reset);
        self.compose_phase(BODY_ROW + 1, session.phase(), "start");

        let n = w.grid.size();
        for y in 0..n {
            for x in 0..n {
                let weight = w.grid.node(x, y).map_or(0, |node| node.weight);
                let (fg, bg) = if (x, y) == w.position() {
                    (Color::White, Color::Rgb { r: 40, g: 120, b: 220 })
                } else if w.visited(x, y) {
                    (Color::Black, GOOD)
                } else if (x, y) == w.grid.goal() {
                    (Color::Black, TITLE)
                } else {
                    (TEXT, Color::Reset)
                };
                self.front.put_str(LEFT + x * 4, BODY_ROW + 3 + y * 2, &format!(" {weight:<2}"), fg, bg);
            }
        }
    }

    fn compose_battle(&mut self, session: &GameSession<CodeBattle<Eval>>, editor: &LineEditor) {
        let st = &session.hooks().state;
        self.front.put_str(LEFT, BODY_ROW, &format!("Code Battle  {}", Self::timer_text(session)), TITLE, Color::Reset);
        self.compose_phase(BODY_ROW + 1, session.phase(), "fight");

        self.front.put_str(LEFT, BODY_ROW + 3, &format!("You      {:>3}/{:<3} ", st.player_health, PLAYER_MAX_HEALTH), TEXT, Color::Reset);
        self.front.bar(LEFT + 18, BODY_ROW + 3, 30, st.player_health, PLAYER_MAX_HEALTH, GOOD);
        self.front.put_str(LEFT, BODY_ROW + 4, &format!("Opponent {:>3}/{:<3} ", st.opponent_health, st.opponent_max_health), TEXT, Color::Reset);
        self.front.bar(LEFT + 18, BODY_ROW + 4, 30, st.opponent_health, st.opponent_max_health, BAD);
        self.front.put_str(LEFT, BODY_ROW + 5, &format!("Submissions: {}", session.hooks().submissions), DIM, Color::Reset);

        if session.is_playing() {
            self.compose_editor(BODY_ROW + 7, "Code>", editor);
        }
    }

    fn compose_race(&mut self, view: &RaceView) {
        let race = view.session.hooks();
        let phase = view.session.phase();
        self.front.put_str(LEFT, BODY_ROW, &format!("Algorithm Race  {}", Self::timer_text(&view.session)), TITLE, Color::Reset);

        if matches!(phase, Phase::Menu | Phase::Finished(_)) {
            let rows = [
                ("Difficulty", race.difficulty.map_or("—", |d| d.label())),
                ("Topic", race.topic.map_or("—", |t| t.label())),
                ("Battle type", race.battle_type.label()),
            ];
            for (i, (name, value)) in rows.iter().enumerate() {
                let bg = if i == view.row { SELECT_BG } else { Color::Reset };
                self.front.put_str(LEFT, BODY_ROW + 2 + i, &format!("{name:<12} ◀ {value:<20} ▶"), Color::White, bg);
            }
            self.compose_phase(BODY_ROW + 6, phase, "race");
        }

        let top = BODY_ROW + 8;
        if let Some(code) = &race.room_code {
            self.front.put_str(LEFT, top, &format!("Room code: {code}"), KEY, Color::Reset);
        }
        for (i, racer) in race.participants.iter().enumerate() {
            let y = top + 1 + i;
            self.front.put_str(LEFT, y, &format!("{:<14}", racer.name), TEXT, Color::Reset);
            self.front.bar(LEFT + 14, y, 30, racer.progress, 100, if i == 0 { GOOD } else { BAD });
            self.front.put_str(LEFT + 46, y, &format!("{}%", racer.progress), DIM, Color::Reset);
        }
        if view.session.is_playing() {
            let y = top + 2 + race.participants.len();
            if race.racing {
                self.compose_editor(y, "Code>", &view.editor);
            } else {
                self.front.put_str(LEFT, y, "Waiting for the race to open...", DIM, Color::Reset);
            }
        }
    }

    fn compose_regex(&mut self, trainer: &RegexTrainer, editor: &LineEditor) {
        let header = format!(
            "Regex Trainer  {}/{}  Completed {}  Points {}",
            trainer.current_index() + 1, trainer.len(), trainer.challenges_completed, trainer.points,
        );
        self.front.put_str(LEFT, BODY_ROW, &header, TITLE, Color::Reset);
        if trainer.all_solved() {
            self.front.put_str(LEFT, BODY_ROW + 1, "Every challenge solved!", GOOD, Color::Reset);
        }
        let Some(ch) = trainer.current() else { return };
        self.front.put_str(LEFT, BODY_ROW + 2, &format!("{} [{}]", ch.title, ch.tier.label()), Color::White, Color::Reset);
        self.front.put_str(LEFT, BODY_ROW + 3, ch.description, TEXT, Color::Reset);

        for (i, case) in ch.cases.iter().enumerate() {
            let y = BODY_ROW + 5 + i;
            let expect = if case.should_match { "match   " } else { "no match" };
            let verdict = trainer.last_results.get(i).map(|r| if r.passed() { ("✔", GOOD) } else { ("✘", BAD) });
            let (mark, color) = verdict.unwrap_or(("·", DIM));
            self.front.put_str(LEFT, y, mark, color, Color::Reset);
            self.front.put_str(LEFT + 2, y, &format!("{expect}  {}", case.input), TEXT, Color::Reset);
        }
        self.compose_editor(BODY_ROW + 6 + ch.cases.len(), "Pattern>", editor);
    }

    fn compose_stack(&mut self, model: &StackModel, editor: &LineEditor) {
        self.front.put_str(LEFT, BODY_ROW, &format!("Stack Attack  {}/{}", model.size(), model.capacity()), TITLE, Color::Reset);
        let bottom = BODY_ROW + 3 + model.capacity();
        for slot in 0..model.capacity() {
            let y = bottom - slot;
            let (text, fg) = match model.items().get(slot) {
                Some(v) => (format!("│ {:<20} │", v), Color::White),
                None => (format!("│ {:<20} │", ""), DIM),
            };
            self.front.put_str(LEFT, y, &text, fg, Color::Reset);
        }
        self.front.put_str(LEFT, bottom + 1, "└──────────────────────┘", DIM, Color::Reset);
        if !model.is_empty() {
            let top_y = bottom + 1 - model.size();
            self.front.put_str(LEFT + 25, top_y, "◀ top", KEY, Color::Reset);
        }
        self.compose_editor(bottom + 3, "Value>", editor);
    }

    fn compose_blocks(&mut self, session: &GameSession<BlockDrop>) {
        let game = session.hooks();
        let board = &game.board;
        let hud = format!("Score {}  Lines {}  Level {}", board.score, board.lines_cleared, game.level());
        self.front.put_str(LEFT, BODY_ROW, &hud, TITLE, Color::Reset);
        self.compose_phase(BODY_ROW + 1, session.phase(), "start");

        let top = BODY_ROW + 2;
        let active: Vec<(i32, i32)> = board.active.map(|p| p.blocks().to_vec()).unwrap_or_default();
        let active_kind = board.active.map(|p| p.kind);
        for y in 0..board.height {
            self.front.put_str(LEFT, top + y, "│", DIM, Color::Reset);
            for x in 0..board.width {
                let kind = if active.contains(&(x as i32, y as i32)) { active_kind } else { board.cell(x, y) };
                let (glyph, color) = match kind {
                    Some(k) => ("██", kind_color(k)),
                    None => (" .", DIM),
                };
                self.front.put_str(LEFT + 1 + x * CELL_W, top + y, glyph, color, Color::Reset);
            }
            self.front.put_str(LEFT + 1 + board.width * CELL_W, top + y, "│", DIM, Color::Reset);
        }
        let floor = format!("└{}┘", "─".repeat(board.width * CELL_W));
        self.front.put_str(LEFT, top + board.height, &floor, DIM, Color::Reset);

        let side = LEFT + 4 + board.width * CELL_W;
        self.front.put_str(side, top, "Next", KEY, Color::Reset);
        self.front.put_str(side, top + 1, &format!("{:?}", game.next), kind_color(game.next), Color::Reset);
    }
}

fn kind_color(kind: Kind) -> Color {
    match kind {
        Kind::I => Color::Cyan,
        Kind::O => Color::Yellow,
        Kind::T => Color::Magenta,
        Kind::S => Color::Green,
        Kind::Z => Color::Red,
        Kind::J => Color::Blue,
        Kind::L => Color::Rgb { r: 255, g: 150, b: 40 },
    }
}
