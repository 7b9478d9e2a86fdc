//! Alpha-beta search over the live tree
//!
//! The evader maximises, every pursuer minimises, and turns rotate through
//! the agents in state order. Each pass deepens the tree by one ply and
//! reuses whatever children, outcomes and scores earlier passes (or the
//! subtree kept by a reroot) already computed.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use pursuit::board::{Board, Tickets, Transport};
//! use pursuit::eval::{Heuristic, HeuristicParams};
//! use pursuit::oracle::{PageRank, TicketRouteFinder};
//! use pursuit::rules::StandardRules;
//! use pursuit::search::{SearchTree, Searcher};
//! use pursuit::state::{Agent, GameState, Role};
//!
//! let board = Arc::new(
//!     Board::with_edges(
//!         4,
//!         &[(0, 1, Transport::Taxi), (1, 2, Transport::Taxi), (2, 3, Transport::Taxi)],
//!     )
//!     .unwrap(),
//! );
//! let heuristic = Heuristic::new(
//!     Arc::new(TicketRouteFinder::new(Arc::clone(&board))),
//!     Arc::new(PageRank::new(&board)),
//!     HeuristicParams::default(),
//! );
//! let state = GameState::new(
//!     Agent::evader(1, Tickets::evader_default()),
//!     vec![Agent::pursuer(1, 3, Tickets::pursuer_default())],
//!     0,
//! )
//! .unwrap();
//!
//! let tree = Arc::new(SearchTree::new(state, Role::Evader));
//! let rules = Arc::new(StandardRules::new(board));
//! let mut searcher = Searcher::new(tree, rules, Arc::new(heuristic));
//! let pass = searcher.search_pass(|_| {});
//! assert_eq!(pass.depth, 1);
//! assert_eq!(pass.plan.unwrap().moves.len(), 1);
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use log::error;

use crate::eval::Heuristic;
use crate::rules::Rules;
use crate::state::{apply_move, GameState, Move, Role};

use super::tree::{SearchTree, TreeNode};

// =============================================================================
// Plans and pass results
// =============================================================================

/// Best line found by a completed pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    /// Moves from the root along best-child links, at most `depth` long
    pub moves: Vec<Move>,
    /// Depth of the pass that produced the line (0 for an empty plan)
    pub depth: u32,
    /// Root value of that pass
    pub score: f64,
}

impl Plan {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    #[inline]
    pub fn first(&self) -> Option<&Move> {
        self.moves.first()
    }
}

/// Counters for one pass.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Nodes visited by `alpha_beta`
    pub nodes: u64,
    /// Nodes whose children were generated this pass
    pub expansions: u64,
    /// Alpha or beta cutoffs
    pub cutoffs: u64,
    /// Visits that found the node outside the current tree
    pub detached: u64,
    /// Non-terminal nodes scored at the depth limit; zero means the pass
    /// reached the end of every line and deeper passes change nothing
    pub horizon: u64,
}

/// Outcome of one iterative-deepening pass.
#[derive(Debug, Clone)]
pub struct PassResult {
    pub depth: u32,
    pub score: f64,
    /// `None` when a reroot happened while the pass was running
    pub plan: Option<Plan>,
    pub stats: SearchStats,
}

// =============================================================================
// Tree helpers
// =============================================================================

/// Value returned for a node that no longer hangs below the root: the worst
/// possible value for the agent to move there, so that branch is never picked.
#[inline]
pub const fn detached_score(mover: Role) -> f64 {
    match mover {
        Role::Evader => f64::NEG_INFINITY,
        Role::Pursuer(_) => f64::INFINITY,
    }
}

/// Successors of `state` with `mover` to act; a forced pass when nothing is legal.
pub(crate) fn successors(
    rules: &dyn Rules,
    state: &GameState,
    mover: Role,
) -> Vec<(Move, GameState, Role)> {
    let Some(agent) = state.agent(mover) else {
        return Vec::new();
    };
    let mut moves = rules.legal_moves(agent, state);
    if moves.is_empty() {
        moves.push(Move::Pass(mover));
    }

    let next_mover = state.next_mover(mover);
    moves
        .into_iter()
        .filter_map(|mv| match apply_move(state, &mv) {
            Ok(next) => Some((mv, next, next_mover)),
            Err(err) => {
                error!("rules produced unplayable move {mv}: {err}");
                debug_assert!(false, "unplayable move {mv}: {err}");
                None
            }
        })
        .collect()
}

/// Follow best-child links from `root`, at most `max_len` moves.
pub fn principal_variation(root: &TreeNode, max_len: u32) -> Vec<Move> {
    let mut moves = Vec::new();
    let mut next = root.best_child();
    while let Some(child) = next {
        if moves.len() >= max_len as usize {
            break;
        }
        if let Some(mv) = child.via() {
            moves.push(*mv);
        }
        next = child.best_child();
    }
    moves
}

// =============================================================================
// Searcher: iterative-deepening alpha-beta
// =============================================================================

/// Iterative-deepening alpha-beta searcher bound to one tree.
pub struct Searcher {
    tree: Arc<SearchTree>,
    rules: Arc<dyn Rules>,
    heuristic: Arc<Heuristic>,
    stats: SearchStats,
}

impl Searcher {
    pub fn new(tree: Arc<SearchTree>, rules: Arc<dyn Rules>, heuristic: Arc<Heuristic>) -> Self {
        Self {
            tree,
            rules,
            heuristic,
            stats: SearchStats::default(),
        }
    }

    #[inline]
    pub fn tree(&self) -> &Arc<SearchTree> {
        &self.tree
    }

    /// Counters of the most recent pass
    #[inline]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Search the current root to the tree's target depth.
    ///
    /// If the root is still current when the search returns, the principal
    /// variation is handed to `publish` under the root lock and the target
    /// depth goes up by one. Otherwise the pass is dropped.
    pub fn search_pass<F>(&mut self, publish: F) -> PassResult
    where
        F: FnOnce(&Plan),
    {
        self.stats = SearchStats::default();
        let root = self.tree.root();
        let depth = self.tree.target_depth();
        let score = self.alpha_beta(&root, depth, f64::NEG_INFINITY, f64::INFINITY);

        let plan = self.tree.commit_pass(&root, || {
            let plan = Plan {
                moves: principal_variation(&root, depth),
                depth,
                score,
            };
            publish(&plan);
            plan
        });

        PassResult {
            depth,
            score,
            plan,
            stats: self.stats.clone(),
        }
    }

    /// Minimax value of `node` searched `depth` plies deep within `(alpha, beta)`.
    ///
    /// Updates the best-child link of every node whose value improves.
    pub fn alpha_beta(
        &mut self,
        node: &Arc<TreeNode>,
        depth: u32,
        mut alpha: f64,
        mut beta: f64,
    ) -> f64 {
        self.stats.nodes += 1;

        if !self.tree.is_connected(node) {
            self.stats.detached += 1;
            return detached_score(node.mover());
        }
        if self.is_terminal(node) {
            return self.score(node);
        }
        if depth == 0 {
            self.stats.horizon += 1;
            return self.score(node);
        }

        let children = self.expand(node);
        if children.is_empty() {
            return self.score(node);
        }

        let maximizing = node.mover().is_evader();
        let mut best = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };

        for (index, child) in children.iter().enumerate() {
            let value = self.alpha_beta(child, depth - 1, alpha, beta);
            if maximizing {
                if value > best {
                    best = value;
                    node.set_best_child(index);
                }
                if best >= beta {
                    self.stats.cutoffs += 1;
                    break;
                }
                alpha = alpha.max(best);
            } else {
                if value < best {
                    best = value;
                    node.set_best_child(index);
                }
                if best <= alpha {
                    self.stats.cutoffs += 1;
                    break;
                }
                beta = beta.min(best);
            }
        }
        best
    }

    fn expand<'n>(&mut self, node: &'n Arc<TreeNode>) -> &'n [Arc<TreeNode>] {
        if node.is_expanded() {
            return node.children();
        }
        self.stats.expansions += 1;
        let rules = Arc::clone(&self.rules);
        node.expand_with(|| successors(rules.as_ref(), node.state(), node.mover()))
    }

    fn outcome<'n>(&self, node: &'n TreeNode) -> &'n BTreeSet<Role> {
        node.outcome_or_init(|| self.rules.winners(node.state(), node.mover(), node.round()))
    }

    fn is_terminal(&self, node: &TreeNode) -> bool {
        !self.outcome(node).is_empty()
    }

    fn score(&self, node: &TreeNode) -> f64 {
        if let Some(score) = node.cached_score() {
            return score;
        }
        let outcome = self.outcome(node);
        node.score_or_init(|| self.heuristic.evaluate(node.state(), outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Ticket, Tickets, Transport};
    use crate::fixtures;
    use crate::oracle::{RouteOracle, TicketRouteFinder};
    use crate::rules::StandardRules;
    use crate::state::Agent;
    use parking_lot::Mutex;
    use proptest::prelude::*;

    struct Setup {
        rules: Arc<StandardRules>,
        heuristic: Arc<Heuristic>,
        state: GameState,
    }

    impl Setup {
        fn new(board: Board, state: GameState) -> Self {
            let board = Arc::new(board);
            Self {
                heuristic: Arc::new(fixtures::board_heuristic(&board)),
                rules: Arc::new(StandardRules::new(board)),
                state,
            }
        }

        fn searcher(&self) -> Searcher {
            let tree = Arc::new(SearchTree::new(self.state.clone(), Role::Evader));
            Searcher::new(tree, self.rules.clone(), self.heuristic.clone())
        }
    }

    /// Plain minimax without pruning or caching
    fn minimax(setup: &Setup, state: &GameState, mover: Role, depth: u32) -> f64 {
        let winners = setup.rules.winners(state, mover, state.round());
        if depth == 0 || !winners.is_empty() {
            return setup.heuristic.evaluate(state, &winners);
        }
        let next = successors(setup.rules.as_ref(), state, mover);
        if next.is_empty() {
            return setup.heuristic.evaluate(state, &winners);
        }
        let values = next.iter().map(|(_, s, m)| minimax(setup, s, *m, depth - 1));
        if mover.is_evader() {
            values.fold(f64::NEG_INFINITY, f64::max)
        } else {
            values.fold(f64::INFINITY, f64::min)
        }
    }

    fn same_value(a: f64, b: f64) -> bool {
        a == b || (a - b).abs() <= 1e-9 * a.abs().max(1.0)
    }

    fn two_pursuer_line() -> Setup {
        let state = GameState::new(
            Agent::evader(3, Tickets::default().with(Ticket::Taxi, 5).with(Ticket::Double, 1)),
            vec![
                Agent::pursuer(1, 0, Tickets::default().with(Ticket::Taxi, 5)),
                Agent::pursuer(2, 6, Tickets::default().with(Ticket::Taxi, 5)),
            ],
            0,
        )
        .unwrap();
        Setup::new(fixtures::line_board(7), state)
    }

    fn mixed_board() -> Setup {
        let board = Board::with_edges(
            8,
            &[
                (0, 1, Transport::Taxi),
                (1, 2, Transport::Taxi),
                (2, 3, Transport::Bus),
                (3, 4, Transport::Taxi),
                (4, 5, Transport::Underground),
                (5, 6, Transport::Taxi),
                (6, 7, Transport::Boat),
                (7, 0, Transport::Taxi),
                (1, 5, Transport::Bus),
            ],
        )
        .unwrap();
        let state = GameState::new(
            Agent::evader(
                1,
                Tickets::default()
                    .with(Ticket::Taxi, 3)
                    .with(Ticket::Bus, 2)
                    .with(Ticket::Secret, 1),
            ),
            vec![Agent::pursuer(
                1,
                4,
                Tickets::default().with(Ticket::Taxi, 3).with(Ticket::Bus, 2),
            )],
            0,
        )
        .unwrap();
        Setup::new(board, state)
    }

    #[test]
    fn test_alpha_beta_matches_minimax() {
        let setups = [
            Setup::new(fixtures::ring_board(6), fixtures::ring_state()),
            two_pursuer_line(),
            mixed_board(),
        ];
        for setup in &setups {
            for depth in 1..=4 {
                let mut searcher = setup.searcher();
                let root = searcher.tree().root();
                let pruned = searcher.alpha_beta(&root, depth, f64::NEG_INFINITY, f64::INFINITY);
                let full = minimax(setup, &setup.state, Role::Evader, depth);
                assert!(
                    (pruned - full).abs() < 1e-9,
                    "depth {depth}: alpha-beta {pruned} vs minimax {full}"
                );
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 24, .. ProptestConfig::default() })]

        #[test]
        fn prop_alpha_beta_matches_minimax_below_root(
            (board, state) in fixtures::arb_position(),
            depth in 2u32..=4,
        ) {
            let setup = Setup::new(board, state);
            let mut searcher = setup.searcher();
            let root = searcher.tree().root();

            let value = searcher.alpha_beta(&root, depth, f64::NEG_INFINITY, f64::INFINITY);
            let full = minimax(&setup, root.state(), root.mover(), depth);
            prop_assert!(same_value(value, full), "root: {} vs {}", value, full);

            // Each child one ply shallower, on the tree the root search left behind
            for child in root.children() {
                let value = searcher.alpha_beta(child, depth - 1, f64::NEG_INFINITY, f64::INFINITY);
                let full = minimax(&setup, child.state(), child.mover(), depth - 1);
                prop_assert!(
                    same_value(value, full),
                    "after {:?}: {} vs {}", child.via(), value, full
                );
            }
        }
    }

    #[test]
    fn test_reused_tree_matches_minimax() {
        // Same answers when each pass starts from the previous pass's tree
        let setup = mixed_board();
        let mut searcher = setup.searcher();
        for depth in 1..=4 {
            let pass = searcher.search_pass(|_| {});
            assert_eq!(pass.depth, depth);
            let full = minimax(&setup, &setup.state, Role::Evader, depth);
            assert!((pass.score - full).abs() < 1e-9);
        }
    }

    #[test]
    fn test_deepening_grows_tree() {
        let setup = Setup::new(fixtures::ring_board(6), fixtures::ring_state());
        let mut searcher = setup.searcher();
        let mut last_size = searcher.tree().root().subtree_size();

        for depth in 1..=4 {
            let pass = searcher.search_pass(|_| {});
            assert_eq!(pass.depth, depth);
            assert_eq!(searcher.tree().target_depth(), depth + 1);
            let size = searcher.tree().root().subtree_size();
            assert!(size > last_size, "depth {depth}: {size} <= {last_size}");
            last_size = size;
        }
    }

    #[test]
    fn test_plan_follows_best_children() {
        let setup = two_pursuer_line();
        let mut searcher = setup.searcher();
        let mut published = None;
        for _ in 0..3 {
            published = None;
            searcher.search_pass(|plan| published = Some(plan.clone()));
        }

        let plan = published.unwrap();
        assert_eq!(plan.depth, 3);
        assert_eq!(plan.moves.len(), 3);
        assert_eq!(plan.moves[0].mover(), Role::Evader);
        assert_eq!(plan.moves[1].mover(), Role::Pursuer(1));
        assert_eq!(plan.moves[2].mover(), Role::Pursuer(2));
        assert_eq!(plan.moves, principal_variation(&searcher.tree().root(), 3));
    }

    #[test]
    fn test_detached_nodes_return_sentinel() {
        let setup = Setup::new(fixtures::ring_board(6), fixtures::ring_state());
        let mut searcher = setup.searcher();
        searcher.search_pass(|_| {});
        searcher.search_pass(|_| {});

        let root = searcher.tree().root();
        let children = root.children();
        let kept = *children[1].via().unwrap();
        let lost = Arc::clone(&children[0]);
        let lost_grandchild = Arc::clone(&lost.children()[0]);
        searcher.tree().reroot(&kept, |_| {});

        assert_eq!(lost.mover(), Role::Pursuer(1));
        let value = searcher.alpha_beta(&lost, 3, f64::NEG_INFINITY, f64::INFINITY);
        assert_eq!(value, f64::INFINITY);

        assert_eq!(lost_grandchild.mover(), Role::Evader);
        let value = searcher.alpha_beta(&lost_grandchild, 3, f64::NEG_INFINITY, f64::INFINITY);
        assert_eq!(value, f64::NEG_INFINITY);
        assert_eq!(searcher.stats().detached, 2);
    }

    #[test]
    fn test_interrupted_pass_is_discarded() {
        let setup = Setup::new(fixtures::ring_board(6), fixtures::ring_state());
        let mut searcher = setup.searcher();
        searcher.search_pass(|_| {});

        let tree = Arc::clone(searcher.tree());
        let mv = *tree.root().children()[0].via().unwrap();
        // A reroot lands between the search and its commit
        let root = tree.root();
        let score = searcher.alpha_beta(&root, 2, f64::NEG_INFINITY, f64::INFINITY);
        tree.reroot(&mv, |_| {});
        assert!(score.is_finite());
        assert_eq!(tree.commit_pass(&root, || ()), None);
        assert_eq!(tree.target_depth(), 1);
    }

    /// Rules that confirm `pending` on the tree the next time moves are
    /// generated, so the reroot lands in the middle of a pass.
    struct RerootOnExpand {
        inner: Arc<StandardRules>,
        tree: Arc<SearchTree>,
        pending: Mutex<Option<Move>>,
    }

    impl Rules for RerootOnExpand {
        fn legal_moves(&self, agent: &Agent, state: &GameState) -> Vec<Move> {
            if let Some(mv) = self.pending.lock().take() {
                self.tree.reroot(&mv, |_| {});
            }
            self.inner.legal_moves(agent, state)
        }

        fn winners(&self, state: &GameState, acting: Role, round: u32) -> BTreeSet<Role> {
            self.inner.winners(state, acting, round)
        }
    }

    #[test]
    fn test_reroot_during_pass() {
        let setup = Setup::new(fixtures::ring_board(6), fixtures::ring_state());
        let tree = Arc::new(SearchTree::new(setup.state.clone(), Role::Evader));
        let rules = Arc::new(RerootOnExpand {
            inner: setup.rules.clone(),
            tree: Arc::clone(&tree),
            pending: Mutex::new(None),
        });
        let mut searcher =
            Searcher::new(Arc::clone(&tree), rules.clone(), setup.heuristic.clone());
        searcher.search_pass(|_| {});
        assert_eq!(tree.target_depth(), 2);

        let old_root = tree.root();
        let kept = Arc::clone(&old_root.children()[1]);
        let kept_score = kept.cached_score();
        assert!(kept_score.is_some());
        *rules.pending.lock() = kept.via().copied();

        // Fires while the pass expands the first child of the old root
        let mut published = false;
        let pass = searcher.search_pass(|_| published = true);
        assert!(rules.pending.lock().is_none());
        assert!(pass.plan.is_none());
        assert!(!published);
        assert!(pass.stats.detached > 0);
        assert!(old_root.children()[0].is_expanded());
        assert!(!tree.is_connected(&old_root.children()[0]));
        assert!(Arc::ptr_eq(&tree.root(), &kept));
        assert_eq!(tree.target_depth(), 1);
        assert_eq!(kept.cached_score(), kept_score);

        for depth in 1..=3 {
            let pass = searcher.search_pass(|_| {});
            let plan = pass.plan.unwrap();
            assert_eq!(plan.depth, depth);
            let full = minimax(&setup, kept.state(), kept.mover(), depth);
            assert!(same_value(pass.score, full), "depth {depth}: {} vs {full}", pass.score);

            // The published line stays below the new root
            let mut node = Arc::clone(&kept);
            for mv in &plan.moves {
                let child = node.children().iter().find(|c| c.via() == Some(mv)).cloned();
                let child = child.unwrap();
                assert!(tree.is_connected(&child));
                node = child;
            }
        }
    }

    #[test]
    fn test_horizon_counts_open_leaves() {
        let setup = Setup::new(fixtures::ring_board(6), fixtures::ring_state());
        let mut searcher = setup.searcher();
        let pass = searcher.search_pass(|_| {});
        let leaves = searcher.tree().root().children().len() as u64;
        assert_eq!(pass.stats.horizon, leaves);

        // Pursuer already on the evader: every pass ends at the root
        let caught = GameState::new(
            Agent::evader(2, Tickets::default().with(Ticket::Taxi, 2)),
            vec![Agent::pursuer(1, 2, Tickets::default().with(Ticket::Taxi, 2))],
            0,
        )
        .unwrap();
        let setup = Setup::new(fixtures::ring_board(6), caught);
        let mut searcher = setup.searcher();
        for depth in 1..=3 {
            let pass = searcher.search_pass(|_| {});
            assert_eq!(pass.depth, depth);
            assert_eq!(pass.stats.horizon, 0);
            assert!(pass.plan.unwrap().is_empty());
        }
    }

    #[test]
    fn test_search_is_deterministic() {
        let setup = mixed_board();
        let mut first = setup.searcher();
        let mut second = setup.searcher();
        for _ in 0..4 {
            let a = first.search_pass(|_| {});
            let b = second.search_pass(|_| {});
            assert_eq!(a.plan, b.plan);
            assert_eq!(a.score, b.score);
        }
    }

    #[test]
    fn test_forced_pass_when_stuck() {
        // Pursuer on a dead end with no tickets must still yield a child
        let state = GameState::new(
            Agent::evader(2, Tickets::default().with(Ticket::Taxi, 4)),
            vec![Agent::pursuer(1, 0, Tickets::default())],
            0,
        )
        .unwrap();
        let setup = Setup::new(fixtures::line_board(5), state);
        let next = successors(setup.rules.as_ref(), &setup.state, Role::Pursuer(1));
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].0, Move::Pass(Role::Pursuer(1)));
        assert_eq!(next[0].2, Role::Evader);
    }

    #[test]
    fn test_avoids_stepping_next_to_pursuer() {
        // Hub 0 has taxi exits 1-4 and underground exits to traps 5 and 6.
        // Trap 5 is one taxi ride from pursuer 1 at 10, trap 6 from pursuer 2
        // at 20. The pursuers hold taxi tickets only and are three rides from
        // the hub (10-11-1-0 and 20-21-2-0).
        let board = Board::with_edges(
            22,
            &[
                (0, 1, Transport::Taxi),
                (0, 2, Transport::Taxi),
                (0, 3, Transport::Taxi),
                (0, 4, Transport::Taxi),
                (0, 5, Transport::Underground),
                (0, 6, Transport::Underground),
                (3, 7, Transport::Taxi),
                (4, 8, Transport::Taxi),
                (5, 10, Transport::Taxi),
                (6, 20, Transport::Taxi),
                (10, 11, Transport::Taxi),
                (11, 1, Transport::Taxi),
                (20, 21, Transport::Taxi),
                (21, 2, Transport::Taxi),
            ],
        )
        .unwrap();
        let evader_tickets = Tickets::default()
            .with(Ticket::Taxi, 10)
            .with(Ticket::Underground, 2);
        let state = GameState::new(
            Agent::evader(0, evader_tickets),
            vec![
                Agent::pursuer(1, 10, Tickets::default().with(Ticket::Taxi, 10)),
                Agent::pursuer(2, 20, Tickets::default().with(Ticket::Taxi, 10)),
            ],
            0,
        )
        .unwrap();
        let setup = Setup::new(board, state);
        let routes = TicketRouteFinder::new(Arc::new(setup.rules.board().clone()));
        for pursuer in setup.state.pursuers() {
            let budget = pursuer.tickets.route_budget();
            assert_eq!(routes.shortest_path_length(pursuer.location, 0, &budget), Some(3));
        }

        let mut searcher = setup.searcher();
        let mut plan = None;
        for _ in 0..3 {
            searcher.search_pass(|p| plan = Some(p.clone()));
        }
        let plan = plan.unwrap();
        assert_eq!(plan.depth, 3);

        let destination = plan.first().and_then(Move::destination).unwrap();
        assert!(destination != 5 && destination != 6);
        for pursuer in setup.state.pursuers() {
            let budget = pursuer.tickets.route_budget();
            let distance = routes.shortest_path_length(pursuer.location, destination, &budget);
            assert_ne!(distance, Some(1));
        }
        assert!(plan.score > -setup.heuristic.params().win_score);
    }
}
