//! Central application state.
//!
//! Rendering reads `&AppState`; event handling mutates `&mut AppState`.
//! The inspector pass in [`AppState::inspect`] is the only place the live
//! world is walked.

use ratatui::layout::Rect;
use tracing::{debug, error};

use crate::config::AppConfig;
use crate::core::{draw_debug_view, HostState, InspectorSession, SessionSettings};
use crate::demo::{asset_catalog, World};
use crate::ui::surface::TuiSurface;
use crate::ui::widget::InspectorViewState;

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Inspector,
    Help,
}

/// Text being typed for one field row; committed with Enter.
#[derive(Debug, Clone, PartialEq)]
pub struct LineEditor {
    pub row: usize,
    pub label: String,
    pub buffer: String,
}

pub struct AppState {
    pub world: World,
    pub session: InspectorSession,
    /// Rows recorded by the last inspector pass plus queued input.
    pub surface: TuiSurface,
    pub view: InspectorViewState,
    pub active_view: ActiveView,
    pub editor: Option<LineEditor>,
    pub config: AppConfig,
    pub host: HostState,
    pub should_quit: bool,
    pub status_message: Option<String>,
    /// Where the row list was last painted, for mouse hit-testing.
    pub list_area: Rect,
}

impl AppState {
    pub fn new(config: AppConfig, settings: SessionSettings, playing: bool) -> Self {
        Self {
            world: World::new(),
            session: InspectorSession::new(settings),
            surface: TuiSurface::new(asset_catalog()),
            view: InspectorViewState::default(),
            active_view: ActiveView::default(),
            editor: None,
            config,
            host: HostState { playing },
            should_quit: false,
            status_message: None,
            list_area: Rect::default(),
        }
    }

    /// Walk every root once, recording fresh rows and applying queued input.
    pub fn inspect(&mut self) {
        self.surface.begin_frame();
        self.session.begin_frame();

        for root in self.world.roots() {
            self.surface.title(root.name);
            match draw_debug_view(&mut self.session, &mut self.surface, self.host, &root.handle) {
                Ok(true) => {}
                Ok(false) if !self.host.playing => self.surface.note("paused"),
                Ok(false) => self.surface.note("saved asset, no debug view"),
                Err(err) => {
                    error!(root = root.name, %err, "inspector pass failed");
                    self.status_message = Some(format!("{}: {err}", root.name));
                }
            }
        }

        if let Some(stale) = self.surface.end_frame() {
            debug!(row = stale.row, "dropped input for a row that takes none");
        }
        if let Some(feedback) = self.surface.take_feedback() {
            self.status_message = Some(feedback);
        }
        self.view.clamp_to(self.surface.rows());
    }

    /// Advance the world one step if it is playing.
    pub fn tick(&mut self) {
        if self.host.playing {
            self.world.tick();
        }
    }

    pub fn toggle_playing(&mut self) {
        self.host.playing = !self.host.playing;
        self.editor = None;
        self.status_message = Some(if self.host.playing { "playing" } else { "paused" }.into());
    }

    /// Status bar summary: world clock and foldout bookkeeping.
    pub fn status_summary(&self) -> String {
        format!(
            "tick {} | {} roots, {} nodes",
            self.world.ticks(),
            self.session.root_count(),
            self.session.node_count(),
        )
    }
}
