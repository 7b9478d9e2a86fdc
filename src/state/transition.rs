//! Applying a move to a state
//!
//! Only ticket accounting is enforced here. Whether an edge exists between
//! the old and new location is the rules' business.

use crate::board::Ticket;
use crate::error::TransitionError;

use super::{GameState, Move, SingleMove};

/// Apply `mv` to a copy of `state`.
///
/// The moving agent is relocated and pays for the ride; a double move also
/// pays a double ticket. The round advances when the evader moves (a pass
/// included). Either the whole move applies or an error is returned and no
/// successor exists.
pub fn apply_move(state: &GameState, mv: &Move) -> Result<GameState, TransitionError> {
    let mut next = state.clone();

    match mv {
        Move::Single(single) => ride(&mut next, single)?,
        Move::Double(double) => {
            let role = double.first.mover;
            if !role.is_evader() {
                return Err(TransitionError::DoubleByPursuer(role));
            }
            if double.second.mover != role {
                return Err(TransitionError::MismatchedLegs {
                    first: role,
                    second: double.second.mover,
                });
            }
            let agent = next.agent_mut(role).ok_or(TransitionError::UnknownMover(role))?;
            if !agent.tickets.spend(Ticket::Double) {
                return Err(TransitionError::MissingTicket {
                    role,
                    ticket: Ticket::Double,
                });
            }
            ride(&mut next, &double.first)?;
            ride(&mut next, &double.second)?;
        }
        Move::Pass(role) => {
            if next.agent(*role).is_none() {
                return Err(TransitionError::UnknownMover(*role));
            }
        }
    }

    if mv.mover().is_evader() {
        next.advance_round();
    }
    Ok(next)
}

fn ride(state: &mut GameState, single: &SingleMove) -> Result<(), TransitionError> {
    let agent = state
        .agent_mut(single.mover)
        .ok_or(TransitionError::UnknownMover(single.mover))?;
    if !agent.tickets.spend(single.ticket) {
        return Err(TransitionError::MissingTicket {
            role: single.mover,
            ticket: single.ticket,
        });
    }
    agent.location = single.destination;
    Ok(())
}
