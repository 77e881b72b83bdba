//! Persisted open/closed state for nested foldouts.
//!
//! Nodes live in an arena ([`FoldoutTree::nodes`]) and reference their
//! children by index, which keeps the cursor stack free of borrows into the
//! tree.  Top-level nodes are keyed by the identity of the root object;
//! everything below is keyed by *arrival index*: the order in which child
//! foldouts are met while traversing an open parent during one pass.

use std::collections::HashMap;

use tracing::debug;

use super::reflect::Liveness;

/// Index into [`FoldoutTree::nodes`].
pub type NodeId = usize;

/// Structural key for a child foldout, used instead of the arrival index
/// when the session runs with [`ChildKeying::Structural`](super::session::ChildKeying).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChildKey {
    /// Field of the enclosing type level.
    Member(&'static str),
    /// Element of the enclosing list.
    Element(usize),
    /// Base-type group.
    Base(&'static str),
    /// Labelled member group ("Public fields", "Static fields").
    Group(&'static str),
}

// ───────────────────────────────────────── node ──────────────

#[derive(Debug, Clone, Default)]
pub struct FoldoutNode {
    pub is_opened: bool,
    /// Children by arrival index.  Created lazily; may contain `None`
    /// gaps up to the highest index ever attached.
    children: Option<Vec<Option<NodeId>>>,
    keyed: HashMap<ChildKey, NodeId>,
}

impl FoldoutNode {
    pub fn children(&self) -> Option<&[Option<NodeId>]> {
        self.children.as_deref()
    }

    pub fn keyed_child(&self, key: &ChildKey) -> Option<NodeId> {
        self.keyed.get(key).copied()
    }

    fn child_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children
            .iter()
            .flatten()
            .flatten()
            .copied()
            .chain(self.keyed.values().copied())
    }
}

// ───────────────────────────────────────── slots ─────────────

/// Where a freshly opened child should be attached.  Produced by
/// [`FoldoutCursor::move_next`], consumed by [`FoldoutTree::attach_child`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildSlot {
    pub parent: NodeId,
    pub index: usize,
    pub key: Option<ChildKey>,
    pub existing: Option<NodeId>,
}

#[derive(Debug)]
struct RootEntry {
    node: NodeId,
    liveness: Liveness,
    last_seen: u64,
}

// ───────────────────────────────────────── arena tree ────────

/// Arena of foldout nodes plus the root registry.
#[derive(Debug, Default)]
pub struct FoldoutTree {
    nodes: Vec<FoldoutNode>,
    free: Vec<NodeId>,
    roots: HashMap<usize, RootEntry>,
}

impl FoldoutTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a closed node, reusing a released slot when one exists.
    pub fn alloc(&mut self) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = FoldoutNode::default();
                id
            }
            None => {
                self.nodes.push(FoldoutNode::default());
                self.nodes.len() - 1
            }
        }
    }

    pub fn get(&self, id: NodeId) -> &FoldoutNode {
        &self.nodes[id]
    }

    pub fn is_opened(&self, id: NodeId) -> bool {
        self.nodes[id].is_opened
    }

    pub fn set_opened(&mut self, id: NodeId, opened: bool) {
        self.nodes[id].is_opened = opened;
    }

    /// Number of nodes currently in use.
    pub fn live_nodes(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Child at arrival `index` under `parent`, if one was ever attached.
    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.nodes[parent]
            .children
            .as_ref()
            .and_then(|children| children.get(index).copied().flatten())
    }

    /// Store `child` at `slot`, padding the positional list with `None`.
    pub fn attach_child(&mut self, slot: &ChildSlot, child: NodeId) {
        let parent = &mut self.nodes[slot.parent];
        match &slot.key {
            Some(key) => {
                parent.keyed.insert(key.clone(), child);
            }
            None => {
                let children = parent.children.get_or_insert_with(Vec::new);
                if children.len() <= slot.index {
                    children.resize(slot.index + 1, None);
                }
                children[slot.index] = Some(child);
            }
        }
        debug!(parent = slot.parent, index = slot.index, child, "foldout child attached");
    }

    // ── root registry ───────────────────────────────────────────

    /// Look up the node registered for root identity `id`.  A registration
    /// whose object has been dropped is discarded first, so a new object
    /// reusing the address starts closed.
    pub fn root(&mut self, id: usize, frame: u64) -> Option<NodeId> {
        let alive = self.roots.get(&id).map(|e| e.liveness.is_alive())?;
        if !alive {
            self.remove_root(id);
            return None;
        }
        let entry = self.roots.get_mut(&id)?;
        entry.last_seen = frame;
        Some(entry.node)
    }

    pub fn insert_root(&mut self, id: usize, liveness: Liveness, node: NodeId, frame: u64) {
        if let Some(old) = self.roots.insert(
            id,
            RootEntry {
                node,
                liveness,
                last_seen: frame,
            },
        ) {
            self.release(old.node);
        }
        debug!(root = id, node, "foldout root registered");
    }

    pub fn remove_root(&mut self, id: usize) {
        if let Some(entry) = self.roots.remove(&id) {
            self.release(entry.node);
        }
    }

    /// Drop roots whose object is gone, and – when `max_age` is set – roots
    /// not shown during the last `max_age` frames.  Returns how many roots
    /// were removed.
    pub fn evict(&mut self, frame: u64, max_age: Option<u64>) -> usize {
        let stale: Vec<usize> = self
            .roots
            .iter()
            .filter(|(_, e)| {
                !e.liveness.is_alive()
                    || max_age.is_some_and(|age| frame.saturating_sub(e.last_seen) > age)
            })
            .map(|(&id, _)| id)
            .collect();
        for &id in &stale {
            self.remove_root(id);
        }
        if !stale.is_empty() {
            debug!(count = stale.len(), frame, "evicted foldout roots");
        }
        stale.len()
    }

    /// Return `id` and its whole subtree to the free list.
    fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            stack.extend(self.nodes[current].child_ids());
            self.nodes[current] = FoldoutNode::default();
            self.free.push(current);
        }
    }
}

// ───────────────────────────────────────── cursor ────────────

/// Traversal helper bound to one open node for the duration of one pass.
///
/// Every lookup advances the arrival counter, whether or not the child ends
/// up open, so positions line up with the previous pass as long as the
/// traversal order is unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldoutCursor {
    node: NodeId,
    /// `-1` before the first child.
    index: isize,
}

impl FoldoutCursor {
    pub fn new(node: NodeId) -> Self {
        Self { node, index: -1 }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Arrival index of the most recent lookup, `None` before the first.
    pub fn arrival_index(&self) -> Option<usize> {
        usize::try_from(self.index).ok()
    }

    /// Advance to the next child and report what is stored there.
    pub fn move_next(&mut self, tree: &FoldoutTree, key: Option<ChildKey>) -> ChildSlot {
        self.index += 1;
        let index = self.index as usize;
        let existing = match &key {
            Some(key) => tree.get(self.node).keyed_child(key),
            None => tree.child_at(self.node, index),
        };
        ChildSlot {
            parent: self.node,
            index,
            key,
            existing,
        }
    }
}
