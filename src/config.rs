//! Engine settings and scenario files
//!
//! Both are TOML. Engine settings can be overridden from the environment
//! with `PURSUIT_<SECTION>_<KEY>`, e.g. `PURSUIT_SCHEDULER_TURN_TIME_MS=5000`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::board::{Board, Location, Tickets, Transport};
use crate::error::{BoardError, ConfigError};
use crate::eval::HeuristicParams;
use crate::rules::{StandardRules, CLASSIC_REVEAL_ROUNDS, CLASSIC_ROUNDS};
use crate::state::{Agent, GameState};

/// Default time the scheduler waits before harvesting a plan
pub const DEFAULT_TURN_TIME_MS: u64 = 13_000;

/// Pursuers are numbered 1..=255
pub const MAX_PURSUERS: usize = u8::MAX as usize;

// =============================================================================
// Engine settings
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub search: SearchConfig,
    pub heuristic: HeuristicConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Deepest pass the worker runs before parking; unbounded when unset
    pub max_depth: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    pub win_score: f64,
    pub unreachable_distance: u32,
    pub unguarded_score: f64,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        let params = HeuristicParams::default();
        Self {
            win_score: params.win_score,
            unreachable_distance: params.unreachable_distance,
            unguarded_score: params.unguarded_score,
        }
    }
}

impl HeuristicConfig {
    pub fn params(&self) -> HeuristicParams {
        HeuristicParams {
            win_score: self.win_score,
            unreachable_distance: self.unreachable_distance,
            unguarded_score: self.unguarded_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub turn_time_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            turn_time_ms: DEFAULT_TURN_TIME_MS,
        }
    }
}

impl SchedulerConfig {
    #[inline]
    pub fn turn_time(&self) -> Duration {
        Duration::from_millis(self.turn_time_ms)
    }
}

/// Override `$config.$section.$field` from `$lookup($key)` when it parses.
macro_rules! env_override {
    ($config:expr, $lookup:expr, $section:ident . $field:ident, $key:expr) => {
        if let Some(raw) = $lookup($key) {
            match raw.parse() {
                Ok(v) => $config.$section.$field = v,
                Err(_) => warn!("ignoring {}={raw}: not a valid value", $key),
            }
        }
    };
    ($config:expr, $lookup:expr, $section:ident . $field:ident, $key:expr, optional) => {
        if let Some(raw) = $lookup($key) {
            match raw.parse() {
                Ok(v) => $config.$section.$field = Some(v),
                Err(_) => warn!("ignoring {}={raw}: not a valid value", $key),
            }
        }
    };
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read settings from `path`. Environment overrides are not applied.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = read(path)?;
        debug!("loaded engine config from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Apply `PURSUIT_*` overrides from the process environment.
    #[must_use]
    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`, which maps a variable name to its value.
    #[must_use]
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        env_override!(self, lookup, search.max_depth, "PURSUIT_SEARCH_MAX_DEPTH", optional);
        env_override!(self, lookup, heuristic.win_score, "PURSUIT_HEURISTIC_WIN_SCORE");
        env_override!(
            self,
            lookup,
            heuristic.unreachable_distance,
            "PURSUIT_HEURISTIC_UNREACHABLE_DISTANCE"
        );
        env_override!(
            self,
            lookup,
            heuristic.unguarded_score,
            "PURSUIT_HEURISTIC_UNGUARDED_SCORE"
        );
        env_override!(self, lookup, scheduler.turn_time_ms, "PURSUIT_SCHEDULER_TURN_TIME_MS");
        self
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// =============================================================================
// Scenarios
// =============================================================================

/// Board, agents and schedule of a game to play.
///
/// ```toml
/// round = 0
/// reveal_rounds = [3, 8]
/// rounds = 10
///
/// [board]
/// node_count = 3
/// edges = [[0, 1, "taxi"], [1, 2, "bus"]]
///
/// [evader]
/// location = 0
///
/// [[pursuers]]
/// location = 2
/// tickets = { taxi = 4, bus = 2 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub board: BoardConfig,
    pub evader: AgentConfig,
    #[serde(default)]
    pub pursuers: Vec<AgentConfig>,
    /// Round index the game starts in (0-based)
    #[serde(default)]
    pub round: u32,
    /// Number of evader turns; the classic 24 when unset
    #[serde(default)]
    pub rounds: Option<u32>,
    /// 1-based rounds after which the evader surfaces; the classic ones when unset
    #[serde(default)]
    pub reveal_rounds: Option<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub node_count: usize,
    #[serde(default)]
    pub edges: Vec<(Location, Location, Transport)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub location: Location,
    /// Starting inventory; the role's classic allotment when unset
    #[serde(default)]
    pub tickets: Option<Tickets>,
}

/// A scenario ready to play
#[derive(Debug, Clone)]
pub struct Scenario {
    pub board: Arc<Board>,
    pub rules: StandardRules,
    pub state: GameState,
}

impl ScenarioConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = read(path)?;
        debug!("loaded scenario from {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn build(&self) -> Result<Scenario, ConfigError> {
        let board = Arc::new(Board::with_edges(self.board.node_count, &self.board.edges)?);
        let rules = StandardRules::with_schedule(Arc::clone(&board), self.schedule()?);

        let place = |location: Location| {
            if board.contains(location) {
                Ok(location)
            } else {
                Err(BoardError::UnknownLocation {
                    location,
                    node_count: board.node_count(),
                })
            }
        };

        let evader = Agent::evader(
            place(self.evader.location)?,
            self.evader.tickets.unwrap_or_else(Tickets::evader_default),
        );
        if self.pursuers.len() > MAX_PURSUERS {
            return Err(ConfigError::TooManyPursuers {
                count: self.pursuers.len(),
                max: MAX_PURSUERS,
            });
        }
        let mut pursuers = Vec::with_capacity(self.pursuers.len());
        for (index, pursuer) in (1..=u8::MAX).zip(&self.pursuers) {
            pursuers.push(Agent::pursuer(
                index,
                place(pursuer.location)?,
                pursuer.tickets.unwrap_or_else(Tickets::pursuer_default),
            ));
        }
        let state = GameState::new(evader, pursuers, self.round)?;

        Ok(Scenario { board, rules, state })
    }

    fn schedule(&self) -> Result<Vec<bool>, ConfigError> {
        let rounds = self.rounds.unwrap_or(CLASSIC_ROUNDS as u32);
        let reveals = self
            .reveal_rounds
            .as_deref()
            .unwrap_or(&CLASSIC_REVEAL_ROUNDS[..]);

        let mut schedule = vec![false; rounds as usize];
        for &round in reveals {
            if round == 0 || round > rounds {
                return Err(ConfigError::RevealRound { round, rounds });
            }
            schedule[round as usize - 1] = true;
        }
        Ok(schedule)
    }
}
