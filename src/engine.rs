//! Search sessions for the evader AI
//!
//! An [`Engine`] holds the rules and the heuristic. Each call to
//! [`Engine::start_session`] builds a fresh tree and a background worker that
//! deepens it one pass at a time, publishing every completed principal
//! variation into a single-slot mailbox ([`PlanHandle`]). The consumer reads
//! the mailbox, reports confirmed moves so the tree can be re-rooted, and
//! stops the session when done.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pursuit::board::{Board, Tickets, Transport};
//! use pursuit::config::EngineConfig;
//! use pursuit::engine::Engine;
//! use pursuit::oracle::{PageRank, TicketRouteFinder};
//! use pursuit::rules::StandardRules;
//! use pursuit::state::{Agent, GameState, Role};
//!
//! let board = Arc::new(
//!     Board::with_edges(
//!         4,
//!         &[(0, 1, Transport::Taxi), (1, 2, Transport::Taxi), (2, 3, Transport::Taxi)],
//!     )
//!     .unwrap(),
//! );
//! let mut config = EngineConfig::default();
//! config.search.max_depth = Some(3);
//! let engine = Engine::new(
//!     Arc::new(StandardRules::new(Arc::clone(&board))),
//!     Arc::new(TicketRouteFinder::new(Arc::clone(&board))),
//!     Arc::new(PageRank::new(&board)),
//!     &config,
//! );
//! let state = GameState::new(
//!     Agent::evader(1, Tickets::evader_default()),
//!     vec![Agent::pursuer(1, 3, Tickets::pursuer_default())],
//!     0,
//! )
//! .unwrap();
//!
//! let session = engine.start_session(state, Role::Evader, 0).unwrap();
//! while session.current_plan().is_empty() {
//!     std::thread::sleep(Duration::from_millis(1));
//! }
//! session.join();
//! ```

use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info};
use parking_lot::{Mutex, RwLock};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::eval::Heuristic;
use crate::oracle::{CentralityOracle, RouteOracle};
use crate::rules::Rules;
use crate::search::{Plan, Reroot, SearchTree, Searcher, TreeNode};
use crate::state::{GameState, Move, Role};

/// Longest the worker sleeps while parked
const PARK_INTERVAL: Duration = Duration::from_millis(50);

// =============================================================================
// Session state and plan mailbox
// =============================================================================

/// Lifecycle of a search session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Worker spawned, first pass not started yet
    Idle,
    /// Worker deepening the original root
    Running,
    /// Worker deepening a subtree kept from an earlier root
    Rerooted,
    /// A confirmed move had no matching child; a new session is needed
    Invalidated,
    /// Stopped by the consumer
    Stopped,
}

/// Single-slot mailbox holding the latest published plan.
///
/// Readers get an `Arc` to an immutable plan; the writer swaps the whole
/// slot, so a reader never sees a half-written line.
#[derive(Debug, Clone, Default)]
pub struct PlanHandle(Arc<RwLock<Arc<Plan>>>);

impl PlanHandle {
    pub fn load(&self) -> Arc<Plan> {
        Arc::clone(&self.0.read())
    }

    pub(crate) fn store(&self, plan: Plan) {
        *self.0.write() = Arc::new(plan);
    }
}

// =============================================================================
// Engine: session factory
// =============================================================================

/// Factory for search sessions.
pub struct Engine {
    rules: Arc<dyn Rules>,
    heuristic: Arc<Heuristic>,
    max_depth: Option<u32>,
}

impl Engine {
    pub fn new(
        rules: Arc<dyn Rules>,
        routes: Arc<dyn RouteOracle>,
        centrality: Arc<dyn CentralityOracle>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            rules,
            heuristic: Arc::new(Heuristic::new(routes, centrality, config.heuristic.params())),
            max_depth: config.search.max_depth,
        }
    }

    #[inline]
    pub fn heuristic(&self) -> &Arc<Heuristic> {
        &self.heuristic
    }

    /// Start searching `initial` with `mover` to act in `round`.
    pub fn start_session(
        &self,
        initial: GameState,
        mover: Role,
        round: u32,
    ) -> Result<SearchSession, EngineError> {
        if initial.agent(mover).is_none() {
            return Err(EngineError::UnknownMover(mover));
        }

        let tree = Arc::new(SearchTree::new(initial.with_round(round), mover));
        let searcher = Searcher::new(
            Arc::clone(&tree),
            Arc::clone(&self.rules),
            Arc::clone(&self.heuristic),
        );
        let mut session = SearchSession {
            shared: Arc::new(Shared {
                tree,
                running: AtomicBool::new(false),
                state: Mutex::new(SessionState::Idle),
                plan: PlanHandle::default(),
                max_depth: self.max_depth,
            }),
            worker: None,
        };
        session.spawn(searcher);
        info!("search session started: {mover} to move in round {round}");
        Ok(session)
    }
}

// =============================================================================
// SearchSession: live tree plus worker
// =============================================================================

struct Shared {
    tree: Arc<SearchTree>,
    running: AtomicBool,
    state: Mutex<SessionState>,
    plan: PlanHandle,
    max_depth: Option<u32>,
}

/// One decision-making session: a live tree plus its worker thread.
///
/// Dropping the session stops the worker without waiting for it.
pub struct SearchSession {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl SearchSession {
    fn spawn(&mut self, searcher: Searcher) {
        self.shared.running.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        self.worker = Some(thread::spawn(move || run_worker(&shared, searcher)));
    }

    /// Moves of the latest published plan; empty before the first pass completes.
    pub fn current_plan(&self) -> Vec<Move> {
        self.shared.plan.load().moves.clone()
    }

    pub fn latest(&self) -> Arc<Plan> {
        self.shared.plan.load()
    }

    /// Mailbox handle for readers on other threads
    pub fn plan_handle(&self) -> PlanHandle {
        self.shared.plan.clone()
    }

    pub fn state(&self) -> SessionState {
        *self.shared.state.lock()
    }

    #[inline]
    pub fn target_depth(&self) -> u32 {
        self.shared.tree.target_depth()
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Report the move actually played at the root.
    ///
    /// On reuse the published plan keeps its tail when it started with `mv`
    /// and is emptied otherwise. On rebuild-required the worker stops and the
    /// plan is cleared; the caller starts a new session from the observed state.
    pub fn confirm_move(&self, mv: &Move) -> Reroot {
        let shared = &self.shared;
        let outcome = shared.tree.reroot(mv, |new_root| {
            if new_root.is_none() {
                shared.running.store(false, Ordering::Release);
                shared.plan.store(Plan::default());
                return;
            }
            let current = shared.plan.load();
            let next = match current.moves.split_first() {
                Some((first, rest)) if first == mv => Plan {
                    moves: rest.to_vec(),
                    depth: current.depth.saturating_sub(1),
                    score: current.score,
                },
                _ => Plan::default(),
            };
            shared.plan.store(next);
        });

        match outcome {
            Reroot::Reused { depth } => {
                let mut state = shared.state.lock();
                if matches!(
                    *state,
                    SessionState::Idle | SessionState::Running | SessionState::Rerooted
                ) {
                    *state = SessionState::Rerooted;
                }
                info!("rerooted on {mv}, target depth now {depth}");
            }
            Reroot::RebuildRequired => {
                *shared.state.lock() = SessionState::Invalidated;
                info!("no subtree for {mv}, session invalidated");
            }
        }
        self.wake();
        outcome
    }

    /// Ask the worker to stop after its current pass.
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::Release);
        let mut state = self.shared.state.lock();
        if *state != SessionState::Invalidated {
            *state = SessionState::Stopped;
        }
        drop(state);
        self.wake();
    }

    /// Stop and wait for the worker to finish its current pass.
    pub fn join(mut self) {
        self.stop();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("search worker panicked");
            }
        }
    }

    fn wake(&self) {
        if let Some(worker) = &self.worker {
            worker.thread().unpark();
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.stop();
        }
    }
}

// =============================================================================
// Worker loop
// =============================================================================

fn run_worker(shared: &Shared, mut searcher: Searcher) {
    {
        let mut state = shared.state.lock();
        if *state == SessionState::Idle {
            *state = SessionState::Running;
        }
    }
    debug!("search worker running");

    // Root whose last committed pass reached only terminal leaves
    let mut solved: Option<Weak<TreeNode>> = None;
    while shared.running.load(Ordering::Acquire) {
        let capped = shared
            .max_depth
            .is_some_and(|max_depth| shared.tree.target_depth() > max_depth);
        let root = shared.tree.root();
        let settled = solved
            .as_ref()
            .is_some_and(|node| ptr::eq(node.as_ptr(), Arc::as_ptr(&root)));
        if capped || settled {
            drop(root);
            thread::park_timeout(PARK_INTERVAL);
            continue;
        }

        let pass = searcher.search_pass(|plan| {
            if shared.running.load(Ordering::Acquire) {
                shared.plan.store(plan.clone());
            }
        });
        match &pass.plan {
            Some(plan) => {
                debug!(
                    "depth {} done: score {:.4}, {} nodes, {} expansions, {} cutoffs, pv [{}]",
                    pass.depth,
                    pass.score,
                    pass.stats.nodes,
                    pass.stats.expansions,
                    pass.stats.cutoffs,
                    format_line(&plan.moves)
                );
                if pass.stats.horizon == 0 {
                    debug!("tree solved at depth {}, worker parked", pass.depth);
                    solved = Some(Arc::downgrade(&root));
                }
            }
            None => debug!(
                "depth {} pass dropped after reroot ({} detached visits)",
                pass.depth, pass.stats.detached
            ),
        }
    }
    debug!("search worker stopped at target depth {}", shared.tree.target_depth());
}

fn format_line(moves: &[Move]) -> String {
    moves.iter().map(Move::to_string).collect::<Vec<_>>().join(", ")
}
