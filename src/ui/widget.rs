//! Ratatui widget that paints the rows recorded by a [`TuiSurface`] pass.
//!
//! [`TuiSurface`]: super::surface::TuiSurface

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, StatefulWidget, Widget},
};

use super::surface::{Editor, Row, RowKind};
use super::theme::Theme;

// ───────────────────────────────────────── state ─────────────

/// Selection and scroll position over the recorded rows.
#[derive(Debug, Default)]
pub struct InspectorViewState {
    /// Index into the row list.
    pub selected: usize,
    /// First visible row.
    pub offset: usize,
}

impl InspectorViewState {
    /// Move to the next selectable row, if any.
    pub fn select_next(&mut self, rows: &[Row]) {
        if let Some(next) = (self.selected + 1..rows.len()).find(|&i| rows[i].is_selectable()) {
            self.selected = next;
        }
    }

    pub fn select_prev(&mut self, rows: &[Row]) {
        if let Some(prev) = (0..self.selected.min(rows.len())).rev().find(|&i| rows[i].is_selectable()) {
            self.selected = prev;
        }
    }

    /// Keep the selection inside the row list after it shrank.
    pub fn clamp_to(&mut self, rows: &[Row]) {
        if rows.is_empty() {
            self.selected = 0;
        } else if self.selected >= rows.len() {
            self.selected = rows.len() - 1;
            self.select_prev_if_unselectable(rows);
        }
    }

    fn select_prev_if_unselectable(&mut self, rows: &[Row]) {
        if !rows[self.selected].is_selectable() {
            self.select_prev(rows);
        }
    }

    /// Ensure the selected row is visible within a viewport of `height` rows.
    pub fn clamp_scroll(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + height {
            self.offset = self.selected - height + 1;
        }
    }

    /// Row index under terminal line `y` of a list drawn at `area`.
    pub fn row_at(&self, area: Rect, y: u16) -> Option<usize> {
        (y >= area.y && y < area.y + area.height).then(|| self.offset + (y - area.y) as usize)
    }
}

// ───────────────────────────────────────── widget ────────────

pub struct InspectorWidget<'a> {
    rows: &'a [Row],
    block: Option<Block<'a>>,
}

impl<'a> InspectorWidget<'a> {
    pub fn new(rows: &'a [Row]) -> Self {
        Self { rows, block: None }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

fn hint(editor: Editor) -> &'static str {
    match editor {
        Editor::Number | Editor::Count => "  -/+ step, e edit",
        Editor::Toggle => "  space toggles",
        Editor::Choice | Editor::Reference => "  space/-/+ cycle, e type",
        Editor::Text | Editor::Vector | Editor::Color => "  e edit",
    }
}

fn render_row(row: &Row, is_selected: bool, width: u16) -> Line<'_> {
    let indent = Span::raw("  ".repeat(row.depth));
    let pick = |style| if is_selected { Theme::selected_style() } else { style };

    match &row.kind {
        RowKind::Title => Line::from(vec![
            indent,
            Span::styled(format!("■ {}", row.label), pick(Theme::title_style())),
        ]),
        RowKind::Header { open, icon } => {
            let arrow = if *open { "▼ " } else { "▶ " };
            let icon = icon.as_deref().map(|i| format!("{i} ")).unwrap_or_default();
            Line::from(vec![
                indent,
                Span::styled(format!("{arrow}{icon}{}", row.label), pick(Theme::header_style())),
            ])
        }
        RowKind::Field { value, editor, .. } => {
            let mut spans = vec![
                indent,
                Span::styled(format!("{}: ", row.label), pick(Theme::label_style())),
                Span::styled(value.clone(), pick(Theme::value_style())),
            ];
            if is_selected {
                spans.push(Span::styled(hint(*editor), Theme::hint_style()));
            }
            Line::from(spans)
        }
        RowKind::Text(text) if row.label.is_empty() => {
            Line::from(vec![indent, Span::styled(text.clone(), pick(Theme::muted_style()))])
        }
        RowKind::Text(text) => Line::from(vec![
            indent,
            Span::styled(format!("{}: ", row.label), pick(Theme::label_style())),
            Span::styled(text.clone(), pick(Theme::muted_style())),
        ]),
        RowKind::Separator => {
            let rule = "╌".repeat((width as usize).saturating_sub(row.depth * 2).min(24));
            Line::from(vec![indent, Span::styled(rule, Theme::separator_style())])
        }
    }
}

impl<'a> StatefulWidget for InspectorWidget<'a> {
    type State = InspectorViewState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        state.clamp_to(self.rows);
        state.clamp_scroll(inner.height as usize);

        let visible = self
            .rows
            .iter()
            .enumerate()
            .skip(state.offset)
            .take(inner.height as usize);

        for (i, (row_idx, row)) in visible.enumerate() {
            let y = inner.y + i as u16;
            let line = render_row(row, row_idx == state.selected, inner.width);
            buf.set_line(inner.x, y, &line, inner.width);
        }
    }
}
