//! Live search tree shared between the search worker and the consumer
//!
//! Children are owned by their parent; the parent link is a weak handle used
//! only to check that a node still hangs below the current root. The root
//! handle and every parent-link mutation sit behind one lock, so "read the
//! root, then walk parents" cannot interleave with a reroot.

use std::collections::BTreeSet;
use std::fmt;
use std::ptr;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::Mutex;

use crate::state::{GameState, Move, Role};

const NO_CHILD: usize = usize::MAX;

/// One node of the search tree.
///
/// Children, the win check and the score are each computed at most once.
pub struct TreeNode {
    state: GameState,
    mover: Role,
    via: Option<Move>,
    parent: Mutex<Weak<TreeNode>>,
    children: OnceLock<Vec<Arc<TreeNode>>>,
    outcome: OnceLock<BTreeSet<Role>>,
    score: OnceLock<f64>,
    best_child: AtomicUsize,
}

impl TreeNode {
    /// Parentless node for `state` with `mover` to act.
    pub fn new_root(state: GameState, mover: Role) -> Arc<Self> {
        Arc::new(Self::build(state, mover, None, Weak::new()))
    }

    fn build(state: GameState, mover: Role, via: Option<Move>, parent: Weak<TreeNode>) -> Self {
        Self {
            state,
            mover,
            via,
            parent: Mutex::new(parent),
            children: OnceLock::new(),
            outcome: OnceLock::new(),
            score: OnceLock::new(),
            best_child: AtomicUsize::new(NO_CHILD),
        }
    }

    #[inline]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Agent to act at this node
    #[inline]
    pub fn mover(&self) -> Role {
        self.mover
    }

    #[inline]
    pub fn round(&self) -> u32 {
        self.state.round()
    }

    /// Move that led from the parent to this node
    #[inline]
    pub fn via(&self) -> Option<&Move> {
        self.via.as_ref()
    }

    pub fn parent(&self) -> Option<Arc<TreeNode>> {
        self.parent.lock().upgrade()
    }

    /// Children in generation order; empty until expanded.
    #[inline]
    pub fn children(&self) -> &[Arc<TreeNode>] {
        self.children.get().map(Vec::as_slice).unwrap_or(&[])
    }

    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.children.get().is_some()
    }

    /// Attach one child per `(move, state, mover)` successor, once.
    pub(crate) fn expand_with<F>(self: &Arc<Self>, successors: F) -> &[Arc<TreeNode>]
    where
        F: FnOnce() -> Vec<(Move, GameState, Role)>,
    {
        self.children.get_or_init(|| {
            let parent = Arc::downgrade(self);
            successors()
                .into_iter()
                .map(|(mv, state, mover)| {
                    Arc::new(Self::build(state, mover, Some(mv), parent.clone()))
                })
                .collect()
        })
    }

    #[inline]
    pub fn cached_score(&self) -> Option<f64> {
        self.score.get().copied()
    }

    pub(crate) fn score_or_init(&self, compute: impl FnOnce() -> f64) -> f64 {
        *self.score.get_or_init(compute)
    }

    #[inline]
    pub fn cached_outcome(&self) -> Option<&BTreeSet<Role>> {
        self.outcome.get()
    }

    pub(crate) fn outcome_or_init(
        &self,
        compute: impl FnOnce() -> BTreeSet<Role>,
    ) -> &BTreeSet<Role> {
        self.outcome.get_or_init(compute)
    }

    pub fn best_child(&self) -> Option<&Arc<TreeNode>> {
        match self.best_child.load(Ordering::Acquire) {
            NO_CHILD => None,
            index => self.children().get(index),
        }
    }

    #[inline]
    pub(crate) fn set_best_child(&self, index: usize) {
        self.best_child.store(index, Ordering::Release);
    }

    /// Number of nodes in this subtree, this one included
    pub fn subtree_size(&self) -> usize {
        1 + self.children().iter().map(|c| c.subtree_size()).sum::<usize>()
    }
}

impl fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("mover", &self.mover)
            .field("round", &self.round())
            .field("via", &self.via)
            .field("children", &self.children().len())
            .field("score", &self.cached_score())
            .finish()
    }
}

/// Result of confirming a move against the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reroot {
    /// The matching child became the root; `depth` is the new deepening target.
    Reused { depth: u32 },
    /// No child matched; the tree must be rebuilt from the observed state.
    RebuildRequired,
}

/// Root handle plus iterative-deepening target.
#[derive(Debug)]
pub struct SearchTree {
    root: Mutex<Arc<TreeNode>>,
    depth: AtomicU32,
}

impl SearchTree {
    pub fn new(state: GameState, mover: Role) -> Self {
        Self {
            root: Mutex::new(TreeNode::new_root(state, mover)),
            depth: AtomicU32::new(1),
        }
    }

    pub fn root(&self) -> Arc<TreeNode> {
        Arc::clone(&self.root.lock())
    }

    /// Depth the next pass searches to
    #[inline]
    pub fn target_depth(&self) -> u32 {
        self.depth.load(Ordering::Acquire)
    }

    /// Whether `node` still traces back to the current root.
    pub fn is_connected(&self, node: &TreeNode) -> bool {
        let root = self.root.lock();
        if ptr::eq(node, Arc::as_ptr(&root)) {
            return true;
        }
        let mut current = node.parent();
        while let Some(ancestor) = current {
            if Arc::ptr_eq(&ancestor, &root) {
                return true;
            }
            current = ancestor.parent();
        }
        false
    }

    /// Finish a pass started at `root`: if no reroot happened in between, run
    /// `publish` under the root lock and raise the target depth.
    pub fn commit_pass<R>(
        &self,
        root: &Arc<TreeNode>,
        publish: impl FnOnce() -> R,
    ) -> Option<R> {
        let current = self.root.lock();
        if !Arc::ptr_eq(&current, root) {
            return None;
        }
        let result = publish();
        // Depth only changes under the root lock
        let depth = self.depth.load(Ordering::Acquire);
        self.depth.store(depth.saturating_add(1), Ordering::Release);
        Some(result)
    }

    /// Make the root's child reached by `mv` the new root.
    ///
    /// `on_reroot` runs under the root lock with the new root, or with `None`
    /// when no child matches. The target depth drops by one (never below 1)
    /// since the kept subtree already holds one ply less of work.
    pub fn reroot(&self, mv: &Move, on_reroot: impl FnOnce(Option<&Arc<TreeNode>>)) -> Reroot {
        let mut root = self.root.lock();
        let Some(child) = root.children().iter().find(|c| c.via() == Some(mv)).cloned() else {
            on_reroot(None);
            return Reroot::RebuildRequired;
        };

        *child.parent.lock() = Weak::new();
        let old_root = std::mem::replace(&mut *root, child);

        let depth = self.depth.load(Ordering::Acquire).saturating_sub(1).max(1);
        self.depth.store(depth, Ordering::Release);
        on_reroot(Some(&root));
        drop(root);
        drop(old_root);

        Reroot::Reused { depth }
    }
}
