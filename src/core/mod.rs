//! Core algorithms – value model, foldout state, traversal.
//!
//! Nothing in this module depends on any TUI or rendering crate.  The only
//! boundary is the [`surface::Surface`] trait that hosts implement.

pub mod error;
pub mod field;
pub mod foldout;
pub mod graph;
pub mod inspector;
pub mod paragraph;
pub mod reflect;
pub mod session;
pub mod surface;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{InspectError, Result, SurfaceError};
pub use graph::{draw_debug_view, MAX_LIST_LEN};
pub use inspector::{FoldoutScope, Inspector};
pub use reflect::{handle, list_handle, Handle, Inspect, InspectList, ListHandle};
pub use session::{ChildKeying, InspectorSession, SessionSettings};
pub use surface::{HostState, Surface};
pub use value::{FieldType, Value};
