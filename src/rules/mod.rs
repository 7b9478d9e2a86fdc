//! Movement and win rules
//!
//! The search treats rules as a black box behind the [`Rules`] trait.
//! [`StandardRules`] is the classic rule set:
//! - Agents ride along board edges, paying one ticket per ride
//! - No two pursuers share a location; the evader never steps onto a pursuer
//! - The evader may chain two rides with a double ticket
//! - Pursuers win by landing on the evader, the evader by outlasting the schedule

pub mod movegen;
pub mod win;

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::board::Board;
use crate::state::{Agent, GameState, Move, Role};

/// Rounds (1-based) on which the evader surfaces in the classic game
pub const CLASSIC_REVEAL_ROUNDS: [u32; 5] = [3, 8, 13, 18, 24];

/// Length of the classic schedule
pub const CLASSIC_ROUNDS: usize = 24;

/// Rules collaborator queried by the search.
pub trait Rules: Send + Sync {
    /// Legal moves of `agent` in `state`, in a stable order. May be empty.
    fn legal_moves(&self, agent: &Agent, state: &GameState) -> Vec<Move>;

    /// Roles that have won when `acting` is about to move in `round`.
    /// Empty while the game goes on.
    fn winners(&self, state: &GameState, acting: Role, round: u32) -> BTreeSet<Role>;
}

/// Classic rules over a board graph.
#[derive(Debug, Clone)]
pub struct StandardRules {
    board: Arc<Board>,
    reveal_rounds: Vec<bool>,
}

impl StandardRules {
    /// Rules with the classic 24-round reveal schedule
    pub fn new(board: Arc<Board>) -> Self {
        let mut reveal_rounds = vec![false; CLASSIC_ROUNDS];
        for round in CLASSIC_REVEAL_ROUNDS {
            reveal_rounds[round as usize - 1] = true;
        }
        Self::with_schedule(board, reveal_rounds)
    }

    /// Rules with a custom schedule; one entry per round, `true` = reveal.
    pub fn with_schedule(board: Arc<Board>, reveal_rounds: Vec<bool>) -> Self {
        Self {
            board,
            reveal_rounds,
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Number of evader turns in the game
    #[inline]
    pub fn rounds(&self) -> u32 {
        self.reveal_rounds.len() as u32
    }

    /// Whether the evader's position is shown after its move in `round`
    /// (0-based round index as stored in [`GameState`]).
    pub fn is_reveal_round(&self, round: u32) -> bool {
        self.reveal_rounds.get(round as usize).copied().unwrap_or(false)
    }
}

impl Rules for StandardRules {
    fn legal_moves(&self, agent: &Agent, state: &GameState) -> Vec<Move> {
        movegen::legal_moves(self, agent, state)
    }

    fn winners(&self, state: &GameState, acting: Role, round: u32) -> BTreeSet<Role> {
        win::winners(self, state, acting, round)
    }
}
