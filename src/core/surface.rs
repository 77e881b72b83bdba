//! The abstract drawing surface the core renders through.
//!
//! Hosts implement [`Surface`] on top of whatever widget toolkit they use.
//! Every call is immediate-mode: it draws one row *and* returns what the
//! user did with it this frame.

use super::error::SurfaceError;
use super::value::{FieldType, Value};

pub type SurfaceResult<T> = std::result::Result<T, SurfaceError>;

pub trait Surface {
    /// Read-only `label: text` row.
    fn labeled_text(&mut self, label: &str, text: &str) -> SurfaceResult<()>;

    /// Collapsible header.  `open` is the state to display; the return
    /// value is the state the user wants now.
    fn foldout_header(&mut self, label: &str, icon: Option<&str>, open: bool)
        -> SurfaceResult<bool>;

    /// Editable leaf.  `ty` selects the widget; the returned value should
    /// be of the same kind as `value`.  Text edits commit on confirmation
    /// only, so an unconfirmed edit returns the input unchanged.
    fn edit_field(&mut self, label: &str, ty: &FieldType, value: Value) -> SurfaceResult<Value>;

    /// Editable element count for resizable lists (delayed commit).
    fn edit_count(&mut self, label: &str, count: usize) -> SurfaceResult<usize>;

    fn separator(&mut self) -> SurfaceResult<()>;

    fn push_indent(&mut self);

    fn pop_indent(&mut self);
}

/// Execution state of the host application, consulted before drawing a
/// debug view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostState {
    /// The host is running live (not editing saved data).
    pub playing: bool,
}
