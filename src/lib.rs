//! Evader AI for a hidden-movement pursuit game
//!
//! One evader runs across a transport graph while pursuers try to land on
//! it. Every ride costs a ticket of the edge's transport; the evader also
//! holds secret tickets (any transport) and double tickets (two rides in one
//! turn). The engine picks the evader's moves with an anytime alpha-beta
//! search that keeps deepening in the background and reuses its tree across
//! turns.
//!
//! # Architecture
//!
//! - [`board`]: Board graph, transports and ticket inventories
//! - [`state`]: Agents, moves and the pure move transition
//! - [`rules`]: Legal moves and win detection
//! - [`oracle`]: Route-length and centrality queries used by the heuristic
//! - [`eval`]: Centrality/distance heuristic
//! - [`search`]: Live search tree and alpha-beta with iterative deepening
//! - [`engine`]: Search sessions with a background worker
//! - [`scheduler`]: Per-turn timer harvesting the latest plan
//! - [`config`]: Engine settings and scenario files
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pursuit::{Engine, EngineConfig, PageRank, ScenarioConfig, TicketRouteFinder, TurnScheduler};
//! use pursuit::state::Role;
//!
//! let scenario = ScenarioConfig::from_toml_str(
//!     r#"
//! [board]
//! node_count = 5
//! edges = [[0, 1, "taxi"], [1, 2, "taxi"], [2, 3, "bus"], [3, 4, "taxi"], [4, 0, "underground"]]
//!
//! [evader]
//! location = 0
//!
//! [[pursuers]]
//! location = 2
//! "#,
//! )
//! .unwrap()
//! .build()
//! .unwrap();
//!
//! let mut config = EngineConfig::default();
//! config.search.max_depth = Some(4);
//! let engine = Engine::new(
//!     Arc::new(scenario.rules.clone()),
//!     Arc::new(TicketRouteFinder::new(Arc::clone(&scenario.board))),
//!     Arc::new(PageRank::new(&scenario.board)),
//!     &config,
//! );
//!
//! let session = engine.start_session(scenario.state.clone(), Role::Evader, 0).unwrap();
//! let scheduler = TurnScheduler::new(session.plan_handle(), Duration::from_millis(200));
//! scheduler.start_turn();
//! let decision = scheduler.next_decision(Duration::from_secs(10)).unwrap();
//! if let Some(mv) = decision.plan.first() {
//!     session.confirm_move(mv);
//! }
//! session.join();
//! ```

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod oracle;
pub mod rules;
pub mod scheduler;
pub mod search;
pub mod state;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types for convenience
pub use board::{Board, Location, Ticket, Tickets, Transport};
pub use config::{EngineConfig, Scenario, ScenarioConfig};
pub use engine::{Engine, PlanHandle, SearchSession, SessionState};
pub use oracle::{CentralityOracle, PageRank, RouteOracle, TicketRouteFinder};
pub use rules::{Rules, StandardRules};
pub use scheduler::{TurnDecision, TurnScheduler};
pub use search::{Plan, Reroot};
pub use state::{apply_move, Agent, GameState, Move, Role};
