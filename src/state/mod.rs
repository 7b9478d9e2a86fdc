//! Game state snapshots and the move transition

pub mod agent;
pub mod moves;
pub mod transition;

pub use agent::{Agent, Role};
pub use moves::{DoubleMove, Move, SingleMove};
pub use transition::apply_move;

use crate::board::Location;
use crate::error::StateError;

/// Positions and inventories of every agent plus the round index.
///
/// The evader is always `agents[0]`. A state is never mutated once built;
/// [`apply_move`] produces a fresh copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    agents: Vec<Agent>,
    round: u32,
}

impl GameState {
    pub fn new(evader: Agent, pursuers: Vec<Agent>, round: u32) -> Result<Self, StateError> {
        if !evader.role.is_evader() {
            return Err(StateError::EvaderNotFirst(evader.role));
        }
        for (i, pursuer) in pursuers.iter().enumerate() {
            if pursuer.role.is_evader() {
                return Err(StateError::SecondEvader);
            }
            if pursuers[..i].iter().any(|p| p.role == pursuer.role) {
                return Err(StateError::DuplicateRole(pursuer.role));
            }
        }

        let mut agents = Vec::with_capacity(pursuers.len() + 1);
        agents.push(evader);
        agents.extend(pursuers);
        Ok(Self { agents, round })
    }

    /// Same agents, different round index
    #[must_use]
    pub fn with_round(mut self, round: u32) -> Self {
        self.round = round;
        self
    }

    #[inline]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[inline]
    pub fn evader(&self) -> &Agent {
        &self.agents[0]
    }

    #[inline]
    pub fn pursuers(&self) -> &[Agent] {
        &self.agents[1..]
    }

    #[inline]
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn agent(&self, role: Role) -> Option<&Agent> {
        self.agents.iter().find(|a| a.role == role)
    }

    pub(crate) fn agent_mut(&mut self, role: Role) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.role == role)
    }

    pub(crate) fn advance_round(&mut self) {
        self.round += 1;
    }

    /// Next agent in turn order, wrapping back to the evader.
    /// Unknown roles hand the turn to the evader.
    pub fn next_mover(&self, role: Role) -> Role {
        match self.agents.iter().position(|a| a.role == role) {
            Some(i) => self.agents[(i + 1) % self.agents.len()].role,
            None => Role::Evader,
        }
    }

    #[inline]
    pub fn pursuer_at(&self, location: Location) -> bool {
        self.pursuers().iter().any(|p| p.location == location)
    }
}
