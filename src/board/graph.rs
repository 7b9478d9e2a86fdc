//! Undirected transport graph

use crate::error::BoardError;

use super::{Location, Transport};

/// One outgoing connection from a location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub to: Location,
    pub transport: Transport,
}

/// Board graph. Locations are `0..node_count`; two locations may be joined
/// by several transports.
#[derive(Debug, Clone, Default)]
pub struct Board {
    adjacency: Vec<Vec<Edge>>,
}

impl Board {
    pub fn new(node_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); node_count],
        }
    }

    /// Build a board from `(a, b, transport)` triples.
    pub fn with_edges(
        node_count: usize,
        edges: &[(Location, Location, Transport)],
    ) -> Result<Self, BoardError> {
        let mut board = Self::new(node_count);
        for &(a, b, transport) in edges {
            board.connect(a, b, transport)?;
        }
        Ok(board)
    }

    /// Join `a` and `b` both ways. Re-adding an existing connection is a no-op.
    pub fn connect(
        &mut self,
        a: Location,
        b: Location,
        transport: Transport,
    ) -> Result<(), BoardError> {
        self.check(a)?;
        self.check(b)?;
        self.push_edge(a, Edge { to: b, transport });
        if a != b {
            self.push_edge(b, Edge { to: a, transport });
        }
        Ok(())
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    #[inline]
    pub fn contains(&self, location: Location) -> bool {
        (location as usize) < self.adjacency.len()
    }

    /// Outgoing edges in insertion order; empty for unknown locations.
    #[inline]
    pub fn edges(&self, from: Location) -> &[Edge] {
        self.adjacency
            .get(from as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        (0..self.adjacency.len()).map(|i| i as Location)
    }

    /// Number of edges leaving `from`
    #[inline]
    pub fn degree(&self, from: Location) -> usize {
        self.edges(from).len()
    }

    fn push_edge(&mut self, from: Location, edge: Edge) {
        let list = &mut self.adjacency[from as usize];
        if !list.contains(&edge) {
            list.push(edge);
        }
    }

    fn check(&self, location: Location) -> Result<(), BoardError> {
        if self.contains(location) {
            Ok(())
        } else {
            Err(BoardError::UnknownLocation {
                location,
                node_count: self.node_count(),
            })
        }
    }
}
