//! Immediate-mode debug inspector for live object graphs.
//!
//! The [`core`] module is host-agnostic: it walks an object graph through
//! the [`core::reflect::Inspect`] trait, keeps foldout state stable across
//! redraws, and talks to the outside world only through the abstract
//! [`core::surface::Surface`].  The [`ui`] module provides a Ratatui
//! implementation of that surface, and [`app`] drives it from terminal
//! events against the simulated world in [`demo`].

pub mod app;
pub mod config;
pub mod core;
pub mod demo;
pub mod ui;
