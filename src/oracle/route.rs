//! Breadth-first route finder over (location, remaining budget)

use std::collections::VecDeque;
use std::sync::Arc;

use crate::board::{Board, Location, TransportBudget};

use super::RouteOracle;

/// Shortest ride count respecting per-transport budgets.
///
/// Search states are `(location, budget left)`. A state is skipped when the
/// location was already reached with a budget that dominates it; BFS order
/// means the earlier arrival was also no longer.
#[derive(Debug, Clone)]
pub struct TicketRouteFinder {
    board: Arc<Board>,
}

impl TicketRouteFinder {
    pub fn new(board: Arc<Board>) -> Self {
        Self { board }
    }
}

impl RouteOracle for TicketRouteFinder {
    fn shortest_path_length(
        &self,
        from: Location,
        to: Location,
        budget: &TransportBudget,
    ) -> Option<u32> {
        if !self.board.contains(from) || !self.board.contains(to) {
            return None;
        }
        if from == to {
            return Some(0);
        }

        let mut seen: Vec<Vec<TransportBudget>> = vec![Vec::new(); self.board.node_count()];
        let mut queue = VecDeque::new();
        seen[from as usize].push(*budget);
        queue.push_back((from, *budget, 0u32));

        while let Some((at, left, rides)) = queue.pop_front() {
            for edge in self.board.edges(at) {
                let Some(after) = left.after_ride(edge.transport) else {
                    continue;
                };
                if edge.to == to {
                    return Some(rides + 1);
                }
                let arrivals = &mut seen[edge.to as usize];
                if arrivals.iter().any(|b| b.dominates(&after)) {
                    continue;
                }
                arrivals.retain(|b| !after.dominates(b));
                arrivals.push(after);
                queue.push_back((edge.to, after, rides + 1));
            }
        }
        None
    }
}
