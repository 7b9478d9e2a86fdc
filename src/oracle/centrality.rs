//! PageRank centrality over the board graph

use crate::board::{Board, Location};

use super::CentralityOracle;

const DAMPING: f64 = 0.85;
const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-10;

/// PageRank scores computed once at construction.
///
/// Every edge counts as one link in each direction, so locations served by
/// several transports rank higher. Scores sum to 1.
#[derive(Debug, Clone)]
pub struct PageRank {
    scores: Vec<f64>,
}

impl PageRank {
    pub fn new(board: &Board) -> Self {
        let n = board.node_count();
        if n == 0 {
            return Self { scores: Vec::new() };
        }

        let uniform = 1.0 / n as f64;
        let mut scores = vec![uniform; n];
        let mut next = vec![0.0; n];

        for iteration in 0..MAX_ITERATIONS {
            let dangling: f64 = board
                .locations()
                .filter(|&l| board.degree(l) == 0)
                .map(|l| scores[l as usize])
                .sum();
            let base = (1.0 - DAMPING) * uniform + DAMPING * dangling * uniform;
            next.iter_mut().for_each(|s| *s = base);

            for from in board.locations() {
                let degree = board.degree(from);
                if degree == 0 {
                    continue;
                }
                let share = DAMPING * scores[from as usize] / degree as f64;
                for edge in board.edges(from) {
                    next[edge.to as usize] += share;
                }
            }

            let delta: f64 = scores.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
            std::mem::swap(&mut scores, &mut next);
            if delta < TOLERANCE {
                log::debug!("pagerank converged after {} iterations", iteration + 1);
                break;
            }
        }

        Self { scores }
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }
}

impl CentralityOracle for PageRank {
    #[inline]
    fn centrality(&self, location: Location) -> f64 {
        self.scores.get(location as usize).copied().unwrap_or(0.0)
    }
}
