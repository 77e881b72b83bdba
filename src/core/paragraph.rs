//! Visual grouping between sibling blocks of one open scope.

use tracing::trace;

use super::error::{InspectError, Result};

/// One flag per open scope: "has content been drawn here yet".
#[derive(Debug, Default)]
pub struct ParagraphTracker {
    scopes: Vec<bool>,
}

impl ParagraphTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_scope(&mut self) {
        self.scopes.push(false);
    }

    /// Call right before drawing a block.  Returns `true` when the block must
    /// be preceded by a separator because the scope already has content.
    pub fn mark(&mut self) -> Result<bool> {
        let depth = self.scopes.len();
        let has_content = self
            .scopes
            .last_mut()
            .ok_or(InspectError::ParagraphUnderflow)?;
        if *has_content {
            trace!(depth, "paragraph separator");
            Ok(true)
        } else {
            *has_content = true;
            Ok(false)
        }
    }

    pub fn end_scope(&mut self) -> Result<()> {
        self.scopes
            .pop()
            .map(|_| ())
            .ok_or(InspectError::ParagraphUnderflow)
    }

    /// Mark the innermost scope as empty again without popping it.
    pub fn reset_top(&mut self) {
        if let Some(has_content) = self.scopes.last_mut() {
            *has_content = false;
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}
