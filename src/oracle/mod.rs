//! Scoring oracles consumed by the heuristic
//!
//! The search only depends on the two query traits. [`TicketRouteFinder`]
//! and [`PageRank`] are reference implementations over a [`Board`](crate::board::Board).

pub mod centrality;
pub mod route;

pub use centrality::PageRank;
pub use route::TicketRouteFinder;

use crate::board::{Location, TransportBudget};

/// Ticket-constrained shortest paths.
pub trait RouteOracle: Send + Sync {
    /// Fewest rides from `from` to `to` without exceeding `budget`,
    /// `None` when no such path exists.
    fn shortest_path_length(
        &self,
        from: Location,
        to: Location,
        budget: &TransportBudget,
    ) -> Option<u32>;
}

/// Precomputed location centrality.
pub trait CentralityOracle: Send + Sync {
    /// Non-negative score of `location`; unknown locations score 0.
    fn centrality(&self, location: Location) -> f64;
}
