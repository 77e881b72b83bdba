//! Error taxonomy for the inspector core.
//!
//! Unsupported types are *not* errors – they render as an inert label and
//! the value passes through untouched.

use thiserror::Error;

/// A failure reported by a host [`Surface`](super::surface::Surface).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("surface failure: {message}")]
pub struct SurfaceError {
    message: String,
}

impl SurfaceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum InspectError {
    /// The top-level value handed to `show()` was absent.
    #[error("cannot inspect a null root value")]
    NullRoot,
    /// `close()` without a matching `open() == true`.
    #[error("close() called with no open foldout scope")]
    ScopeUnderflow,
    /// `mark()` / `end_scope()` with no paragraph scope on the stack.
    #[error("paragraph tracker used outside of any scope")]
    ParagraphUnderflow,
    /// The object behind `label` is mutably borrowed by someone else.
    #[error("`{label}` is already borrowed elsewhere")]
    Borrowed { label: String },
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

pub type Result<T, E = InspectError> = std::result::Result<T, E>;
