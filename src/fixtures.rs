//! Shared test boards, states and stub oracles

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;

use crate::board::{Board, Location, Ticket, Tickets, Transport, TransportBudget};
use crate::eval::{Heuristic, HeuristicParams};
use crate::oracle::{CentralityOracle, PageRank, RouteOracle, TicketRouteFinder};
use crate::rules::StandardRules;
use crate::state::{Agent, GameState};

/// 0 - 1 - ... - (n-1) by taxi
pub fn line_board(n: usize) -> Board {
    let edges: Vec<_> = (1..n as Location).map(|i| (i - 1, i, Transport::Taxi)).collect();
    Board::with_edges(n, &edges).unwrap()
}

/// Taxi ring of `n` nodes
pub fn ring_board(n: usize) -> Board {
    let edges: Vec<_> = (0..n as Location)
        .map(|i| (i, (i + 1) % n as Location, Transport::Taxi))
        .collect();
    Board::with_edges(n, &edges).unwrap()
}

/// Hub 0 with `leaves` spokes by taxi
pub fn star_board(leaves: usize) -> Board {
    let edges: Vec<_> = (1..=leaves as Location).map(|i| (0, i, Transport::Taxi)).collect();
    Board::with_edges(leaves + 1, &edges).unwrap()
}

/// Classic schedule over `board`
pub fn standard_rules(board: Board) -> StandardRules {
    StandardRules::new(Arc::new(board))
}

/// Evader at 0 and one pursuer at 3 on a 6-ring, with small inventories.
pub fn ring_state() -> GameState {
    GameState::new(
        Agent::evader(
            0,
            Tickets::default()
                .with(Ticket::Taxi, 4)
                .with(Ticket::Secret, 1)
                .with(Ticket::Double, 1),
        ),
        vec![Agent::pursuer(1, 3, Tickets::default().with(Ticket::Taxi, 4))],
        0,
    )
    .unwrap()
}

/// Heuristic backed by the reference oracles of `board`
pub fn board_heuristic(board: &Arc<Board>) -> Heuristic {
    Heuristic::new(
        Arc::new(TicketRouteFinder::new(Arc::clone(board))),
        Arc::new(PageRank::new(board)),
        HeuristicParams::default(),
    )
}

/// Centrality read from a table, 0 elsewhere
pub struct TableCentrality(pub Vec<f64>);

impl CentralityOracle for TableCentrality {
    fn centrality(&self, location: Location) -> f64 {
        self.0.get(location as usize).copied().unwrap_or(0.0)
    }
}

/// Distances read from a table, budget ignored; missing pairs are unreachable
pub struct TableRoutes(pub HashMap<(Location, Location), u32>);

impl RouteOracle for TableRoutes {
    fn shortest_path_length(
        &self,
        from: Location,
        to: Location,
        _budget: &TransportBudget,
    ) -> Option<u32> {
        self.0.get(&(from, to)).copied()
    }
}

fn arb_tickets() -> impl Strategy<Value = Tickets> {
    (0u32..=3, 0u32..=2, 0u32..=2, 0u32..=1, 0u32..=1).prop_map(
        |(taxi, bus, underground, secret, double)| Tickets {
            taxi,
            bus,
            underground,
            secret,
            double,
        },
    )
}

/// Board of 3-10 nodes with mixed transports, an evader and 1-3 pursuers
/// placed anywhere on it, and a round within the classic schedule.
pub fn arb_position() -> impl Strategy<Value = (Board, GameState)> {
    (3usize..=10)
        .prop_flat_map(|n| {
            let nodes = n as Location;
            let edge = (0..nodes, 1..nodes, prop::sample::select(Transport::ALL.to_vec()))
                .prop_map(move |(a, step, transport)| (a, (a + step) % nodes, transport));
            (
                Just(n),
                prop::collection::vec(edge, n..=n + 6),
                (0..nodes, arb_tickets()),
                prop::collection::vec((0..nodes, arb_tickets()), 1..=3),
                0u32..24,
            )
        })
        .prop_map(|(n, edges, evader, pursuers, round)| {
            let board = Board::with_edges(n, &edges).unwrap();
            let pursuers = (1u8..)
                .zip(pursuers)
                .map(|(index, (location, tickets))| Agent::pursuer(index, location, tickets))
                .collect();
            let state = GameState::new(Agent::evader(evader.0, evader.1), pursuers, round).unwrap();
            (board, state)
        })
}
