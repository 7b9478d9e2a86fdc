//! Search module for the evader AI
//!
//! Contains:
//! - The live search tree with re-rooting between turns
//! - Alpha-beta search with iterative deepening over that tree

pub mod alphabeta;
pub mod tree;

pub use alphabeta::{detached_score, principal_variation, PassResult, Plan, SearchStats, Searcher};
pub use tree::{Reroot, SearchTree, TreeNode};
