//! Position evaluation for the evader search

pub mod heuristic;

pub use heuristic::{Evaluation, Heuristic, HeuristicParams, WIN_SCORE};
