//! Ticket inventories and per-transport route budgets

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Transport;

/// Ticket kinds held by agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ticket {
    Taxi,
    Bus,
    Underground,
    /// Hides the transport used; valid on any edge, boats included
    Secret,
    /// Licenses a compound move, never spent on an edge
    Double,
}

impl Ticket {
    /// Generation order for legal moves
    pub const ALL: [Ticket; 5] = [
        Ticket::Taxi,
        Ticket::Bus,
        Ticket::Underground,
        Ticket::Secret,
        Ticket::Double,
    ];

    /// Ticket that pays for a ride on `transport`
    #[inline]
    pub fn for_transport(transport: Transport) -> Ticket {
        match transport {
            Transport::Taxi => Ticket::Taxi,
            Transport::Bus => Ticket::Bus,
            Transport::Underground => Ticket::Underground,
            Transport::Boat => Ticket::Secret,
        }
    }

    /// Whether this ticket can be spent on an edge of the given transport
    #[inline]
    pub fn covers(self, transport: Transport) -> bool {
        match self {
            Ticket::Secret => true,
            Ticket::Double => false,
            _ => Ticket::for_transport(transport) == self,
        }
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Ticket::Taxi => "taxi",
            Ticket::Bus => "bus",
            Ticket::Underground => "underground",
            Ticket::Secret => "secret",
            Ticket::Double => "double",
        };
        f.write_str(name)
    }
}

/// Remaining ticket counts of one agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tickets {
    pub taxi: u32,
    pub bus: u32,
    pub underground: u32,
    pub secret: u32,
    pub double: u32,
}

impl Tickets {
    /// Classic starting inventory of the evader
    pub fn evader_default() -> Self {
        Self {
            taxi: 10,
            bus: 10,
            underground: 10,
            secret: 5,
            double: 2,
        }
    }

    /// Classic starting inventory of a pursuer
    pub fn pursuer_default() -> Self {
        Self {
            taxi: 11,
            bus: 8,
            underground: 4,
            secret: 0,
            double: 0,
        }
    }

    /// Builder-style setter
    #[must_use]
    pub fn with(mut self, ticket: Ticket, count: u32) -> Self {
        *self.slot_mut(ticket) = count;
        self
    }

    #[inline]
    pub fn count(&self, ticket: Ticket) -> u32 {
        match ticket {
            Ticket::Taxi => self.taxi,
            Ticket::Bus => self.bus,
            Ticket::Underground => self.underground,
            Ticket::Secret => self.secret,
            Ticket::Double => self.double,
        }
    }

    #[inline]
    pub fn has(&self, ticket: Ticket) -> bool {
        self.count(ticket) > 0
    }

    /// Spend one ticket. Returns false, leaving the counts untouched, when
    /// none is left.
    #[inline]
    pub fn spend(&mut self, ticket: Ticket) -> bool {
        let slot = self.slot_mut(ticket);
        match slot.checked_sub(1) {
            Some(left) => {
                *slot = left;
                true
            }
            None => false,
        }
    }

    /// Credits available to the route oracle; boats ride on secret tickets.
    pub fn route_budget(&self) -> TransportBudget {
        TransportBudget {
            taxi: self.taxi,
            bus: self.bus,
            underground: self.underground,
            boat: self.secret,
        }
    }

    fn slot_mut(&mut self, ticket: Ticket) -> &mut u32 {
        match ticket {
            Ticket::Taxi => &mut self.taxi,
            Ticket::Bus => &mut self.bus,
            Ticket::Underground => &mut self.underground,
            Ticket::Secret => &mut self.secret,
            Ticket::Double => &mut self.double,
        }
    }
}

/// Per-transport movement credits handed to a
/// [`RouteOracle`](crate::oracle::RouteOracle)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TransportBudget {
    pub taxi: u32,
    pub bus: u32,
    pub underground: u32,
    pub boat: u32,
}

impl TransportBudget {
    #[inline]
    pub fn get(&self, transport: Transport) -> u32 {
        match transport {
            Transport::Taxi => self.taxi,
            Transport::Bus => self.bus,
            Transport::Underground => self.underground,
            Transport::Boat => self.boat,
        }
    }

    /// Budget left after one ride on `transport`, if it can be afforded
    #[inline]
    pub fn after_ride(&self, transport: Transport) -> Option<TransportBudget> {
        let mut next = *self;
        let slot = match transport {
            Transport::Taxi => &mut next.taxi,
            Transport::Bus => &mut next.bus,
            Transport::Underground => &mut next.underground,
            Transport::Boat => &mut next.boat,
        };
        *slot = slot.checked_sub(1)?;
        Some(next)
    }

    /// True when every credit is at least the matching credit of `other`
    #[inline]
    pub fn dominates(&self, other: &TransportBudget) -> bool {
        Transport::ALL.iter().all(|&t| self.get(t) >= other.get(t))
    }
}
