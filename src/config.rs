/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD or the
/// XDG data directory. Falls back to sensible defaults if the file is
/// missing, incomplete or malformed.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::grid::GridSpec;
use crate::domain::sort::Algorithm;
use crate::error::AppError;

const APP_DIR: &str = "codemaster";

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timer: TimerConfig,
    pub grid: GridConfig,
    pub battle: BattleConfig,
    pub race: RaceConfig,
    pub sorting: SortingConfig,
    pub stack_capacity: usize,
    pub general: GeneralConfig,
}

#[derive(Clone, Debug)]
pub struct TimerConfig {
    pub maze_secs: i64,
    pub code_maze_secs: i64,
    pub graph_secs: i64,
    pub block_gravity_ms: u64,
}

#[derive(Clone, Debug)]
pub struct GridConfig {
    pub size: usize,
    pub obstacles: usize,
    pub items: usize,
    pub levels: u32,
    pub graph_size: usize,
    pub graph_max_weight: u32,
}

impl GridConfig {
    pub fn spec(&self) -> GridSpec {
        GridSpec::new(self.size, self.obstacles, self.items)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct BattleConfig {
    #[serde(default = "default_battle_secs")]
    pub duration_secs: u32,
    #[serde(default = "default_opponent_health")]
    pub opponent_health: u32,
    #[serde(default = "default_max_damage")]
    pub max_damage: u32,
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: u8,
    #[serde(default = "default_fail_penalty")]
    pub fail_penalty: u32,
    #[serde(default = "default_opponent_interval")]
    pub opponent_interval_secs: u32,
    #[serde(default = "default_opponent_max_damage")]
    pub opponent_max_damage: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RaceConfig {
    #[serde(default = "default_race_secs")]
    pub duration_secs: u32,
    #[serde(default = "default_match_delay")]
    pub match_delay_ms: u64,
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,
    #[serde(default = "default_opponent_step")]
    pub opponent_step: u32,
}

#[derive(Clone, Debug)]
pub struct SortingConfig {
    pub array_len: usize,
    pub interval: Duration,
    pub algorithm: Algorithm,
}

#[derive(Clone, Debug)]
pub struct GeneralConfig {
    pub tick_rate_ms: u64,
    pub log_level: String,
    pub data_dir: PathBuf,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timer: TomlTimer,
    #[serde(default)]
    grid: TomlGrid,
    #[serde(default)]
    battle: BattleConfig,
    #[serde(default)]
    race: RaceConfig,
    #[serde(default)]
    sorting: TomlSorting,
    #[serde(default)]
    stack: TomlStack,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTimer {
    #[serde(default = "default_maze_secs")]
    maze_secs: i64,
    #[serde(default = "default_code_maze_secs")]
    code_maze_secs: i64,
    #[serde(default = "default_graph_secs")]
    graph_secs: i64,
    #[serde(default = "default_block_gravity")]
    block_gravity_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGrid {
    #[serde(default = "default_grid_size")]
    size: usize,
    #[serde(default = "default_obstacles")]
    obstacles: usize,
    #[serde(default = "default_items")]
    items: usize,
    #[serde(default = "default_levels")]
    levels: u32,
    #[serde(default = "default_graph_size")]
    graph_size: usize,
    #[serde(default = "default_graph_max_weight")]
    graph_max_weight: u32,
}

#[derive(Deserialize, Debug)]
struct TomlSorting {
    #[serde(default = "default_array_len")]
    array_len: usize,
    #[serde(default = "default_interval_ms")]
    interval_ms: u64,
    #[serde(default = "default_algorithm")]
    algorithm: Algorithm,
}

#[derive(Deserialize, Debug)]
struct TomlStack {
    #[serde(default = "default_stack_capacity")]
    capacity: usize,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    data_dir: Option<String>,
}

// ── Defaults ──

fn default_maze_secs() -> i64 { 120 }
fn default_code_maze_secs() -> i64 { 90 }
fn default_graph_secs() -> i64 { 60 }
fn default_block_gravity() -> u64 { 500 }

fn default_grid_size() -> usize { 10 }
fn default_obstacles() -> usize { 15 }
fn default_items() -> usize { 5 }
fn default_levels() -> u32 { 3 }
fn default_graph_size() -> usize { 6 }
fn default_graph_max_weight() -> u32 { 9 }

fn default_battle_secs() -> u32 { 300 }
fn default_opponent_health() -> u32 { 100 }
fn default_max_damage() -> u32 { 30 }
fn default_pass_threshold() -> u8 { 50 }
fn default_fail_penalty() -> u32 { 10 }
fn default_opponent_interval() -> u32 { 15 }
fn default_opponent_max_damage() -> u32 { 15 }

fn default_race_secs() -> u32 { 180 }
fn default_match_delay() -> u64 { 2000 }
fn default_progress_step() -> u32 { 25 }
fn default_opponent_step() -> u32 { 10 }

fn default_array_len() -> usize { 12 }
fn default_interval_ms() -> u64 { 300 }
fn default_algorithm() -> Algorithm { Algorithm::Bubble }

fn default_stack_capacity() -> usize { crate::domain::stack::DEFAULT_CAPACITY }

fn default_tick_rate() -> u64 { 50 }
fn default_log_level() -> String { "info".into() }

impl Default for TomlTimer {
    fn default() -> Self {
        TomlTimer {
            maze_secs: default_maze_secs(),
            code_maze_secs: default_code_maze_secs(),
            graph_secs: default_graph_secs(),
            block_gravity_ms: default_block_gravity(),
        }
    }
}

impl Default for TomlGrid {
    fn default() -> Self {
        TomlGrid {
            size: default_grid_size(),
            obstacles: default_obstacles(),
            items: default_items(),
            levels: default_levels(),
            graph_size: default_graph_size(),
            graph_max_weight: default_graph_max_weight(),
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        BattleConfig {
            duration_secs: default_battle_secs(),
            opponent_health: default_opponent_health(),
            max_damage: default_max_damage(),
            pass_threshold: default_pass_threshold(),
            fail_penalty: default_fail_penalty(),
            opponent_interval_secs: default_opponent_interval(),
            opponent_max_damage: default_opponent_max_damage(),
        }
    }
}

impl Default for RaceConfig {
    fn default() -> Self {
        RaceConfig {
            duration_secs: default_race_secs(),
            match_delay_ms: default_match_delay(),
            progress_step: default_progress_step(),
            opponent_step: default_opponent_step(),
        }
    }
}

impl Default for TomlSorting {
    fn default() -> Self {
        TomlSorting {
            array_len: default_array_len(),
            interval_ms: default_interval_ms(),
            algorithm: default_algorithm(),
        }
    }
}

impl Default for TomlStack {
    fn default() -> Self {
        TomlStack { capacity: default_stack_capacity() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            tick_rate_ms: default_tick_rate(),
            log_level: default_log_level(),
            data_dir: None,
        }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) XDG data home. Missing file or keys fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        for dir in &search_dirs {
            let path = dir.join("config.toml");
            if !path.exists() {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(text) => match GameConfig::parse(&text) {
                    Ok(cfg) => {
                        debug!(path = %path.display(), "config loaded");
                        return cfg;
                    }
                    Err(e) => {
                        warn!("{e}; using default settings");
                        return GameConfig::default();
                    }
                },
                Err(e) => warn!(path = %path.display(), error = %e, "could not read config"),
            }
        }
        GameConfig::default()
    }

    /// Parse a config document. Missing sections and keys take defaults.
    pub fn parse(text: &str) -> Result<Self, AppError> {
        let raw: TomlConfig = toml::from_str(text)
            .map_err(|e| AppError::Config(format!("config.toml parse error: {e}")))?;
        Ok(GameConfig::from_toml(raw))
    }

    fn from_toml(raw: TomlConfig) -> Self {
        let data_dir = match raw.general.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => data_dir(),
        };
        GameConfig {
            timer: TimerConfig {
                maze_secs: raw.timer.maze_secs,
                code_maze_secs: raw.timer.code_maze_secs,
                graph_secs: raw.timer.graph_secs,
                block_gravity_ms: raw.timer.block_gravity_ms,
            },
            grid: GridConfig {
                size: raw.grid.size,
                obstacles: raw.grid.obstacles,
                items: raw.grid.items,
                levels: raw.grid.levels.max(1),
                graph_size: raw.grid.graph_size,
                graph_max_weight: raw.grid.graph_max_weight.max(1),
            },
            battle: raw.battle,
            race: raw.race,
            sorting: SortingConfig {
                array_len: raw.sorting.array_len,
                interval: Duration::from_millis(raw.sorting.interval_ms),
                algorithm: raw.sorting.algorithm,
            },
            stack_capacity: raw.stack.capacity.max(1),
            general: GeneralConfig {
                tick_rate_ms: raw.general.tick_rate_ms.max(1),
                log_level: raw.general.log_level,
                data_dir,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Some(xdg) = xdg_dir() {
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn xdg_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|home| PathBuf::from(home).join(".local/share").join(APP_DIR))
}

/// Where session data and the log file live.
/// Prefers the XDG data home, then the exe directory if writable, then CWD.
pub fn data_dir() -> PathBuf {
    if let Some(xdg) = xdg_dir() {
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let test_path = parent.join(".write_test_codemaster");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg = GameConfig::parse("[general]\ndata_dir = \"/tmp/cm\"\n").expect("parse");
        assert_eq!(cfg.timer.maze_secs, 120);
        assert_eq!(cfg.grid.size, 10);
        assert_eq!(cfg.battle.opponent_health, 100);
        assert_eq!(cfg.race.match_delay_ms, 2000);
        assert_eq!(cfg.sorting.algorithm, Algorithm::Bubble);
        assert_eq!(cfg.stack_capacity, 10);
        assert_eq!(cfg.general.log_level, "info");
        assert_eq!(cfg.general.data_dir, PathBuf::from("/tmp/cm"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let text = r#"
            [battle]
            opponent_health = 250

            [sorting]
            algorithm = "insertion"
            interval_ms = 50

            [stack]
            capacity = 4

            [general]
            data_dir = "/tmp/cm"
        "#;
        let cfg = GameConfig::parse(text).expect("parse");
        assert_eq!(cfg.battle.opponent_health, 250);
        assert_eq!(cfg.battle.pass_threshold, 50);
        assert_eq!(cfg.sorting.algorithm, Algorithm::Insertion);
        assert_eq!(cfg.sorting.interval, Duration::from_millis(50));
        assert_eq!(cfg.sorting.array_len, 12);
        assert_eq!(cfg.stack_capacity, 4);
    }

    #[test]
    fn malformed_document_is_a_config_error() {
        let err = GameConfig::parse("[grid\nsize = ").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn degenerate_values_are_clamped() {
        let text = "[grid]\nlevels = 0\n[stack]\ncapacity = 0\n[general]\ndata_dir = \"/tmp/cm\"\ntick_rate_ms = 0\n";
        let cfg = GameConfig::parse(text).expect("parse");
        assert_eq!(cfg.grid.levels, 1);
        assert_eq!(cfg.stack_capacity, 1);
        assert_eq!(cfg.general.tick_rate_ms, 1);
    }
}
