//! Centrality and distance heuristic
//!
//! Scores are from the evader's point of view. The evader likes sitting on a
//! well-connected location while the pursuers are far away on poorly
//! connected ones:
//!
//! ```text
//! score = centrality(evader) * mean(pursuer distance) / mean(pursuer centrality)
//! ```
//!
//! Decided games score `±WIN_SCORE`. Note that undecided positions are not
//! clamped to that range.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::trace;

use crate::oracle::{CentralityOracle, RouteOracle};
use crate::state::{GameState, Role};

/// Score of a decided game
pub const WIN_SCORE: f64 = 10.0;

/// Distance used when a pursuer cannot reach the evader with its tickets
pub const UNREACHABLE_DISTANCE: u32 = 200;

/// Score when no pursuer exerts any pressure (zero mean centrality)
pub const UNGUARDED_SCORE: f64 = 1.0e6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicParams {
    pub win_score: f64,
    pub unreachable_distance: u32,
    pub unguarded_score: f64,
}

impl Default for HeuristicParams {
    fn default() -> Self {
        Self {
            win_score: WIN_SCORE,
            unreachable_distance: UNREACHABLE_DISTANCE,
            unguarded_score: UNGUARDED_SCORE,
        }
    }
}

/// Factors behind an undecided position's score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub score: f64,
    pub evader_centrality: f64,
    pub mean_distance: f64,
    pub mean_centrality: f64,
    /// Some pursuer is one ride away. Reported only; it does not enter the score.
    pub pursuer_adjacent: bool,
}

/// Heuristic evaluator backed by the two oracles.
pub struct Heuristic {
    routes: Arc<dyn RouteOracle>,
    centrality: Arc<dyn CentralityOracle>,
    params: HeuristicParams,
}

impl Heuristic {
    pub fn new(
        routes: Arc<dyn RouteOracle>,
        centrality: Arc<dyn CentralityOracle>,
        params: HeuristicParams,
    ) -> Self {
        Self {
            routes,
            centrality,
            params,
        }
    }

    #[inline]
    pub fn params(&self) -> &HeuristicParams {
        &self.params
    }

    /// Score of a decided game, `None` while nobody has won.
    pub fn terminal_score(&self, winners: &BTreeSet<Role>) -> Option<f64> {
        if winners.contains(&Role::Evader) {
            Some(self.params.win_score)
        } else if !winners.is_empty() {
            Some(-self.params.win_score)
        } else {
            None
        }
    }

    /// Evaluate `state` given the outcome of the win check.
    #[must_use]
    pub fn evaluate(&self, state: &GameState, winners: &BTreeSet<Role>) -> f64 {
        match self.terminal_score(winners) {
            Some(score) => score,
            None => self.breakdown(state).score,
        }
    }

    /// Heuristic factors of an undecided position.
    pub fn breakdown(&self, state: &GameState) -> Evaluation {
        let evader = state.evader();
        let evader_centrality = self.centrality.centrality(evader.location);
        let pursuers = state.pursuers();

        if pursuers.is_empty() {
            return Evaluation {
                score: self.params.unguarded_score,
                evader_centrality,
                mean_distance: 0.0,
                mean_centrality: 0.0,
                pursuer_adjacent: false,
            };
        }

        let mut total_distance = 0.0;
        let mut total_centrality = 0.0;
        let mut pursuer_adjacent = false;
        for pursuer in pursuers {
            let budget = pursuer.tickets.route_budget();
            let distance = self
                .routes
                .shortest_path_length(pursuer.location, evader.location, &budget)
                .unwrap_or(self.params.unreachable_distance);
            pursuer_adjacent |= distance == 1;
            total_distance += f64::from(distance);
            total_centrality += self.centrality.centrality(pursuer.location);
        }

        let count = pursuers.len() as f64;
        let mean_distance = total_distance / count;
        let mean_centrality = total_centrality / count;
        let score = if mean_centrality == 0.0 {
            self.params.unguarded_score
        } else {
            evader_centrality * mean_distance / mean_centrality
        };

        trace!(
            "eval evader@{} c={:.4} dist={:.2} pc={:.4} adjacent={} -> {:.4}",
            evader.location,
            evader_centrality,
            mean_distance,
            mean_centrality,
            pursuer_adjacent,
            score
        );

        Evaluation {
            score,
            evader_centrality,
            mean_distance,
            mean_centrality,
            pursuer_adjacent,
        }
    }
}
