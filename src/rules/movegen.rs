//! Legal move generation
//!
//! Order is edge order, then [`Ticket::ALL`] order, single moves before
//! double moves. The search relies on this order being stable.

use crate::board::{Board, Location, Ticket, Tickets};
use crate::state::{Agent, GameState, Move, Role, SingleMove};

use super::StandardRules;

/// All legal moves for `agent` in `state`.
pub fn legal_moves(rules: &StandardRules, agent: &Agent, state: &GameState) -> Vec<Move> {
    let board = rules.board();
    let singles = single_legs(board, agent.role, agent.location, &agent.tickets, state);

    let mut moves: Vec<Move> = singles.iter().map(|&leg| Move::Single(leg)).collect();

    if can_double(rules, agent, state) {
        for first in &singles {
            let mut left = agent.tickets;
            if !left.spend(Ticket::Double) || !left.spend(first.ticket) {
                continue;
            }
            for second in single_legs(board, agent.role, first.destination, &left, state) {
                let mv = Move::double(*first, second);
                if !moves.contains(&mv) {
                    moves.push(mv);
                }
            }
        }
    }

    moves
}

/// Double moves need a double ticket and at least two rounds left.
#[inline]
fn can_double(rules: &StandardRules, agent: &Agent, state: &GameState) -> bool {
    agent.role.is_evader()
        && agent.tickets.has(Ticket::Double)
        && state.round() + 2 <= rules.rounds()
}

/// One-ride moves of `role` starting at `from` and paid from `tickets`.
fn single_legs(
    board: &Board,
    role: Role,
    from: Location,
    tickets: &Tickets,
    state: &GameState,
) -> Vec<SingleMove> {
    let mut legs = Vec::with_capacity(board.degree(from) * 2);
    for edge in board.edges(from) {
        if blocked(state, role, edge.to) {
            continue;
        }
        for ticket in Ticket::ALL {
            if !ticket.covers(edge.transport) || !tickets.has(ticket) {
                continue;
            }
            let leg = SingleMove {
                mover: role,
                ticket,
                destination: edge.to,
            };
            if !legs.contains(&leg) {
                legs.push(leg);
            }
        }
    }
    legs
}

/// Destinations holding another pursuer are closed to everyone.
#[inline]
fn blocked(state: &GameState, role: Role, to: Location) -> bool {
    state
        .pursuers()
        .iter()
        .any(|p| p.role != role && p.location == to)
}
