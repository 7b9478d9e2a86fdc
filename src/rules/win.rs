//! Win condition checking
//!
//! Win conditions, checked in this order:
//! 1. A pursuer stands on the evader: the pursuers win
//! 2. The evader is to move and cannot: the pursuers win
//! 3. No pursuer can move: the evader wins
//! 4. The evader is to move after the last round: the evader wins

use std::collections::BTreeSet;

use crate::state::{GameState, Role};

use super::{movegen, StandardRules};

pub fn winners(
    rules: &StandardRules,
    state: &GameState,
    acting: Role,
    round: u32,
) -> BTreeSet<Role> {
    let evader = state.evader();

    if state.pursuer_at(evader.location) {
        return pursuers(state);
    }

    if acting.is_evader() && movegen::legal_moves(rules, evader, state).is_empty() {
        return pursuers(state);
    }

    let pursuers_stuck = state
        .pursuers()
        .iter()
        .all(|p| movegen::legal_moves(rules, p, state).is_empty());
    if pursuers_stuck {
        return BTreeSet::from([Role::Evader]);
    }

    if acting.is_evader() && round >= rules.rounds() {
        return BTreeSet::from([Role::Evader]);
    }

    BTreeSet::new()
}

fn pursuers(state: &GameState) -> BTreeSet<Role> {
    state.pursuers().iter().map(|p| p.role).collect()
}
