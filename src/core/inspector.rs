//! A session bound to a surface for one render pass.
//!
//! [`Inspector::open`] / [`Inspector::close`] are the raw foldout pair.
//! [`Inspector::foldout`] wraps them in a [`FoldoutScope`] guard that closes
//! on drop, so an error (or panic) deep inside a subtree still unwinds the
//! cursor, indent and paragraph stacks.

use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};

use tracing::error;

use super::error::Result;
use super::foldout::ChildKey;
use super::reflect::Anchor;
use super::session::InspectorSession;
use super::surface::Surface;

pub struct Inspector<'a> {
    pub(super) session: &'a mut InspectorSession,
    pub(super) ui: &'a mut dyn Surface,
}

impl<'a> Inspector<'a> {
    pub fn new(session: &'a mut InspectorSession, ui: &'a mut dyn Surface) -> Self {
        Self { session, ui }
    }

    pub fn session(&self) -> &InspectorSession {
        self.session
    }

    /// Draw a foldout header and report whether it is open this frame.
    ///
    /// The persisted state (if any) overrides `default_open`.  `anchor`
    /// identifies the node at top level; nested foldouts are matched by
    /// arrival order (or by `key` under structural keying).  When this
    /// returns `true` the caller owns a scope and must call [`close`].
    ///
    /// [`close`]: Inspector::close
    pub fn open(
        &mut self,
        anchor: Option<&Anchor>,
        key: Option<ChildKey>,
        default_open: bool,
        label: &str,
        icon: Option<&str>,
    ) -> Result<bool> {
        let resolved = self.session.resolve(anchor, key)?;
        let was_open = self.session.was_open(&resolved).unwrap_or(default_open);
        // Nothing is persisted until the header has been read back.
        let is_open = self.ui.foldout_header(label, icon, was_open)?;
        self.session.commit(resolved, is_open);
        if is_open {
            self.ui.push_indent();
        }
        Ok(is_open)
    }

    /// Close the innermost scope opened by [`Inspector::open`].
    pub fn close(&mut self) -> Result<()> {
        self.session.pop_scope()?;
        self.ui.pop_indent();
        Ok(())
    }

    /// Scoped variant of [`Inspector::open`]: `Some(guard)` when open.
    pub fn foldout<'i>(
        &'i mut self,
        anchor: Option<&Anchor>,
        key: Option<ChildKey>,
        default_open: bool,
        label: &str,
        icon: Option<&str>,
    ) -> Result<Option<FoldoutScope<'i, 'a>>> {
        if self.open(anchor, key, default_open, label, icon)? {
            Ok(Some(FoldoutScope { inspector: self }))
        } else {
            Ok(None)
        }
    }

    /// Separate the next block from previous content in the current scope.
    pub fn mark_paragraph(&mut self) -> Result<()> {
        if self.session.mark_paragraph()? {
            self.ui.separator()?;
        }
        Ok(())
    }

    pub fn labeled_text(&mut self, label: &str, text: &str) -> Result<()> {
        self.ui.labeled_text(label, text)?;
        Ok(())
    }
}

// ───────────────────────────────────────── scope guard ───────

/// An open foldout.  Dereferences to the [`Inspector`]; closes on drop.
pub struct FoldoutScope<'i, 'a> {
    inspector: &'i mut Inspector<'a>,
}

impl FoldoutScope<'_, '_> {
    /// Close explicitly, surfacing a stack mismatch as an error.
    pub fn close(self) -> Result<()> {
        let mut this = ManuallyDrop::new(self);
        this.inspector.close()
    }
}

impl<'a> Deref for FoldoutScope<'_, 'a> {
    type Target = Inspector<'a>;

    fn deref(&self) -> &Self::Target {
        self.inspector
    }
}

impl<'a> DerefMut for FoldoutScope<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inspector
    }
}

impl Drop for FoldoutScope<'_, '_> {
    fn drop(&mut self) {
        if let Err(err) = self.inspector.close() {
            error!(%err, "foldout scope closed out of order");
        }
    }
}
