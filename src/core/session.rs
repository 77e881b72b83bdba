//! Caller-owned inspector session.
//!
//! Holds every piece of state that must survive between redraws (the
//! foldout arena and root registry) together with the per-pass stacks
//! (cursors, paragraphs, indent).  Hosts keep one session per debug UI and
//! bind it to a surface with [`InspectorSession::inspector`] each frame.

use tracing::{debug, warn};

use super::error::{InspectError, Result};
use super::foldout::{ChildKey, ChildSlot, FoldoutCursor, FoldoutTree, NodeId};
use super::inspector::Inspector;
use super::paragraph::ParagraphTracker;
use super::reflect::Anchor;
use super::surface::Surface;

/// How nested foldouts are matched to their persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildKeying {
    /// By arrival order under the open parent.
    #[default]
    Positional,
    /// By member name, element index or base type.  Survives changes in
    /// traversal order; the arrival counter still advances.
    Structural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSettings {
    pub keying: ChildKeying,
    /// Forget roots not shown for this many frames.  `None` keeps them for
    /// the whole session.
    pub evict_after: Option<u64>,
}

/// Result of looking up a foldout before its header is drawn.
#[derive(Debug)]
pub(crate) enum Resolved {
    Child(ChildSlot),
    Root {
        anchor: Anchor,
        existing: Option<NodeId>,
    },
}

impl Resolved {
    fn existing(&self) -> Option<NodeId> {
        match self {
            Resolved::Child(slot) => slot.existing,
            Resolved::Root { existing, .. } => *existing,
        }
    }
}

#[derive(Debug)]
pub struct InspectorSession {
    settings: SessionSettings,
    tree: FoldoutTree,
    cursors: Vec<FoldoutCursor>,
    paragraphs: ParagraphTracker,
    indent: usize,
    frame: u64,
}

impl Default for InspectorSession {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

impl InspectorSession {
    pub fn new(settings: SessionSettings) -> Self {
        let mut paragraphs = ParagraphTracker::new();
        // Top-level blocks are separated like any other scope.
        paragraphs.begin_scope();
        Self {
            settings,
            tree: FoldoutTree::new(),
            cursors: Vec::new(),
            paragraphs,
            indent: 0,
            frame: 0,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Start a new redraw.  Reclaims roots that were dropped or, when
    /// eviction is configured, not shown recently.
    pub fn begin_frame(&mut self) {
        if !self.cursors.is_empty() {
            warn!(depth = self.cursors.len(), "frame started with foldout scopes still open");
        }
        self.frame += 1;
        let evicted = self.tree.evict(self.frame, self.settings.evict_after);
        if evicted > 0 {
            debug!(evicted, roots = self.tree.root_count(), "session eviction");
        }
        // Reset the top-level paragraph so each frame starts flush.
        if self.paragraphs.depth() == 1 {
            self.paragraphs.reset_top();
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Number of foldout scopes currently open.
    pub fn open_depth(&self) -> usize {
        self.cursors.len()
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn root_count(&self) -> usize {
        self.tree.root_count()
    }

    pub fn node_count(&self) -> usize {
        self.tree.live_nodes()
    }

    /// Bind the session to `ui` for one pass.
    pub fn inspector<'a>(&'a mut self, ui: &'a mut dyn Surface) -> Inspector<'a> {
        Inspector::new(self, ui)
    }

    // ── scope plumbing (driven by `Inspector`) ───────────────────

    /// Find the persisted node for the next foldout.  Nested foldouts ask
    /// the innermost cursor; top-level ones look up the root registry.
    pub(crate) fn resolve(&mut self, anchor: Option<&Anchor>, key: Option<ChildKey>) -> Result<Resolved> {
        if let Some(cursor) = self.cursors.last_mut() {
            let key = match self.settings.keying {
                ChildKeying::Structural => key,
                ChildKeying::Positional => None,
            };
            return Ok(Resolved::Child(cursor.move_next(&self.tree, key)));
        }
        let anchor = anchor.ok_or(InspectError::NullRoot)?;
        let existing = self.tree.root(anchor.id, self.frame);
        Ok(Resolved::Root {
            anchor: anchor.clone(),
            existing,
        })
    }

    pub(crate) fn was_open(&self, resolved: &Resolved) -> Option<bool> {
        resolved.existing().map(|node| self.tree.is_opened(node))
    }

    /// Record the state read back from the header.  Nodes are only created
    /// for foldouts that are open; an open foldout pushes a new scope.
    pub(crate) fn commit(&mut self, resolved: Resolved, is_open: bool) {
        let node = match resolved.existing() {
            Some(node) => Some(node),
            None if is_open => {
                let node = self.tree.alloc();
                match &resolved {
                    Resolved::Child(slot) => self.tree.attach_child(slot, node),
                    Resolved::Root { anchor, .. } => {
                        self.tree
                            .insert_root(anchor.id, anchor.liveness.clone(), node, self.frame)
                    }
                }
                Some(node)
            }
            None => None,
        };

        if let Some(node) = node {
            self.tree.set_opened(node, is_open);
            if is_open {
                self.cursors.push(FoldoutCursor::new(node));
                self.indent += 1;
                self.paragraphs.begin_scope();
            }
        }
    }

    pub(crate) fn pop_scope(&mut self) -> Result<()> {
        self.cursors.pop().ok_or(InspectError::ScopeUnderflow)?;
        self.indent = self.indent.saturating_sub(1);
        self.paragraphs.end_scope()
    }

    pub(crate) fn mark_paragraph(&mut self) -> Result<bool> {
        self.paragraphs.mark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reflect::{list_handle, Anchor};

    #[test]
    fn top_level_lookup_requires_an_anchor() {
        let mut session = InspectorSession::default();
        assert!(matches!(
            session.resolve(None, None),
            Err(InspectError::NullRoot)
        ));
    }

    #[test]
    fn closed_foldouts_allocate_nothing() {
        let mut session = InspectorSession::default();
        let list = list_handle(vec![1u8]);
        let resolved = session.resolve(Some(&Anchor::list(&list)), None).unwrap();
        session.commit(resolved, false);
        assert_eq!(session.node_count(), 0);
        assert_eq!(session.open_depth(), 0);
    }

    #[test]
    fn new_frame_starts_a_fresh_top_paragraph() {
        let mut session = InspectorSession::default();
        session.begin_frame();
        assert!(!session.mark_paragraph().unwrap());
        assert!(session.mark_paragraph().unwrap());
        session.begin_frame();
        assert!(!session.mark_paragraph().unwrap());
    }

    #[test]
    fn pop_without_push_underflows() {
        let mut session = InspectorSession::default();
        assert!(matches!(
            session.pop_scope(),
            Err(InspectError::ScopeUnderflow)
        ));
    }

    #[test]
    fn eviction_drops_roots_not_shown_recently() {
        let mut session = InspectorSession::new(SessionSettings {
            evict_after: Some(2),
            ..SessionSettings::default()
        });
        let list = list_handle(vec![1u8]);
        let anchor = Anchor::list(&list);

        session.begin_frame();
        let resolved = session.resolve(Some(&anchor), None).unwrap();
        session.commit(resolved, true);
        session.pop_scope().unwrap();
        assert_eq!(session.root_count(), 1);

        session.begin_frame();
        session.begin_frame();
        assert_eq!(session.root_count(), 1);
        session.begin_frame();
        assert_eq!(session.root_count(), 0);
    }
}
