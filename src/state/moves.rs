//! Move representation

use std::fmt;

use crate::board::{Location, Ticket};

use super::Role;

/// One ride: spend `ticket`, end up at `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SingleMove {
    pub mover: Role,
    pub ticket: Ticket,
    pub destination: Location,
}

impl SingleMove {
    pub fn new(mover: Role, ticket: Ticket, destination: Location) -> Self {
        Self {
            mover,
            ticket,
            destination,
        }
    }
}

/// Two chained rides of the evader paid for with one double ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DoubleMove {
    pub first: SingleMove,
    pub second: SingleMove,
}

/// A move proposed by the rules or by the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Single(SingleMove),
    Double(DoubleMove),
    /// Stand still. Only produced when the mover has no legal move, so the
    /// turn order keeps advancing.
    Pass(Role),
}

impl Move {
    pub fn single(mover: Role, ticket: Ticket, destination: Location) -> Self {
        Move::Single(SingleMove::new(mover, ticket, destination))
    }

    pub fn double(first: SingleMove, second: SingleMove) -> Self {
        Move::Double(DoubleMove { first, second })
    }

    #[inline]
    pub fn mover(&self) -> Role {
        match self {
            Move::Single(m) => m.mover,
            Move::Double(d) => d.first.mover,
            Move::Pass(role) => *role,
        }
    }

    /// Where the mover ends up, `None` for a pass
    #[inline]
    pub fn destination(&self) -> Option<Location> {
        match self {
            Move::Single(m) => Some(m.destination),
            Move::Double(d) => Some(d.second.destination),
            Move::Pass(_) => None,
        }
    }
}

impl fmt::Display for SingleMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.mover, self.ticket, self.destination)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Single(m) => fmt::Display::fmt(m, f),
            Move::Double(d) => write!(
                f,
                "{} double {} -> {}, {} -> {}",
                d.first.mover,
                d.first.ticket,
                d.first.destination,
                d.second.ticket,
                d.second.destination
            ),
            Move::Pass(role) => write!(f, "{role} passes"),
        }
    }
}
