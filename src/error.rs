//! Error types for the pursuit engine

use std::path::PathBuf;

use thiserror::Error;

use crate::board::{Location, Ticket};
use crate::state::Role;

/// Errors raised while building a board graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("location {location} is outside a board of {node_count} nodes")]
    UnknownLocation {
        location: Location,
        node_count: usize,
    },
}

/// Errors raised while assembling a game state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("the evader must be listed first, found {0}")]
    EvaderNotFirst(Role),

    #[error("only one evader may take part, found a second one among the pursuers")]
    SecondEvader,

    #[error("{0} appears more than once")]
    DuplicateRole(Role),
}

/// Contract violations when applying a move to a state.
///
/// Moves produced by the rules never trigger these; seeing one means the
/// caller handed over a move that was not generated for the state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("{0} is not part of this game")]
    UnknownMover(Role),

    #[error("{role} has no {ticket} ticket left")]
    MissingTicket { role: Role, ticket: Ticket },

    #[error("only the evader may play a double move, not {0}")]
    DoubleByPursuer(Role),

    #[error("double move legs belong to {first} and {second}")]
    MismatchedLegs { first: Role, second: Role },
}

/// Errors raised when starting a search session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("{0} is not part of the initial state")]
    UnknownMover(Role),
}

/// Errors raised while loading configuration or scenario files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid board: {0}")]
    Board(#[from] BoardError),

    #[error("invalid initial state: {0}")]
    State(#[from] StateError),

    #[error("reveal round {round} is outside a {rounds}-round schedule")]
    RevealRound { round: u32, rounds: u32 },

    #[error("{count} pursuers listed, at most {max} supported")]
    TooManyPursuers { count: usize, max: usize },
}
