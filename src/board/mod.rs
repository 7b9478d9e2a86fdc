//! Board graph and transport tickets

pub mod graph;
pub mod tickets;


// Re-exports
pub use graph::{Board, Edge};
pub use tickets::{Ticket, Tickets, TransportBudget};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Node id on the board graph
pub type Location = u32;

/// Transport modes an edge can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Taxi,
    Bus,
    Underground,
    Boat,
}

impl Transport {
    pub const ALL: [Transport; 4] = [
        Transport::Taxi,
        Transport::Bus,
        Transport::Underground,
        Transport::Boat,
    ];
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transport::Taxi => "taxi",
            Transport::Bus => "bus",
            Transport::Underground => "underground",
            Transport::Boat => "boat",
        };
        f.write_str(name)
    }
}
