//! Agents and their roles

use std::fmt;

use crate::board::{Location, Tickets};

/// Who an agent is. The evader maximizes, every pursuer minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Evader,
    Pursuer(u8),
}

impl Role {
    #[inline]
    pub fn is_evader(self) -> bool {
        matches!(self, Role::Evader)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Evader => f.write_str("evader"),
            Role::Pursuer(n) => write!(f, "pursuer-{n}"),
        }
    }
}

/// One agent on the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub role: Role,
    pub location: Location,
    pub tickets: Tickets,
}

impl Agent {
    pub fn new(role: Role, location: Location, tickets: Tickets) -> Self {
        Self {
            role,
            location,
            tickets,
        }
    }

    pub fn evader(location: Location, tickets: Tickets) -> Self {
        Self::new(Role::Evader, location, tickets)
    }

    pub fn pursuer(index: u8, location: Location, tickets: Tickets) -> Self {
        Self::new(Role::Pursuer(index), location, tickets)
    }
}
