//! Terminal host: a [`Surface`](crate::core::Surface) backed by Ratatui rows,
//! plus the widgets that paint them.

pub mod layout;
pub mod popup;
pub mod surface;
pub mod theme;
pub mod widget;
