//! Input handling: maps key and mouse events to state mutations.
//!
//! Edits never touch the world directly.  They are queued on the surface as
//! [`PendingInput`] and take effect during the next inspector pass.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::config::Action;
use crate::ui::surface::{Editor, InputAction, PendingInput, Row, RowKind};

use super::state::{ActiveView, AppState, LineEditor};

/// Process a key event, dispatching on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    if state.editor.is_some() {
        handle_editor_key(state, key);
        return;
    }

    match state.active_view {
        // any key dismisses the overlay
        ActiveView::Help => state.active_view = ActiveView::Inspector,
        ActiveView::Inspector => handle_inspector_key(state, key),
    }
}

// ── line editor ─────────────────────────────────────────────────

fn handle_editor_key(state: &mut AppState, key: KeyEvent) {
    let Some(editor) = state.editor.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Enter => {
            if let Some(editor) = state.editor.take() {
                state.surface.queue(PendingInput {
                    row: editor.row,
                    action: InputAction::Commit(editor.buffer),
                });
            }
        }
        KeyCode::Esc => {
            state.editor = None;
            state.status_message = Some("edit cancelled".into());
        }
        KeyCode::Backspace => {
            editor.buffer.pop();
        }
        KeyCode::Char(c) => editor.buffer.push(c),
        _ => {}
    }
}

// ── inspector view (configurable bindings) ──────────────────────

fn handle_inspector_key(state: &mut AppState, key: KeyEvent) {
    let Some(action) = state.config.match_key(key) else {
        return;
    };

    let selected = state.view.selected;
    let row = state.surface.rows().get(selected).cloned();

    match action {
        Action::Quit => state.should_quit = true,
        Action::Help => state.active_view = ActiveView::Help,
        Action::TogglePlaying => state.toggle_playing(),
        Action::MoveUp => state.view.select_prev(state.surface.rows()),
        Action::MoveDown => state.view.select_next(state.surface.rows()),
        Action::Toggle => {
            if let Some(row) = row.filter(accepts_toggle) {
                queue(state, selected, InputAction::Toggle);
                clear_status_for(state, &row);
            }
        }
        Action::Expand => match row.map(|r| r.kind) {
            Some(RowKind::Header { open: false, .. }) => queue(state, selected, InputAction::Open(true)),
            Some(RowKind::Header { open: true, .. }) => state.view.select_next(state.surface.rows()),
            _ => {}
        },
        Action::Collapse => match row {
            Some(Row {
                kind: RowKind::Header { open: true, .. },
                ..
            }) => queue(state, selected, InputAction::Open(false)),
            Some(row) => {
                if let Some(parent) = parent_header(state.surface.rows(), selected, row.depth) {
                    state.view.selected = parent;
                }
            }
            None => {}
        },
        Action::Edit => match row {
            Some(Row {
                kind: RowKind::Header { .. },
                ..
            }) => queue(state, selected, InputAction::Toggle),
            Some(Row {
                label,
                kind: RowKind::Field { edit_text, editor, .. },
                ..
            }) => {
                if editor.takes_text() {
                    state.editor = Some(LineEditor {
                        row: selected,
                        label,
                        buffer: edit_text,
                    });
                } else {
                    queue(state, selected, InputAction::Toggle);
                }
            }
            _ => {}
        },
        Action::Increment => step(state, row, 1),
        Action::Decrement => step(state, row, -1),
    }
}

fn accepts_toggle(row: &Row) -> bool {
    match &row.kind {
        RowKind::Header { .. } => true,
        RowKind::Field { editor, .. } => {
            matches!(editor, Editor::Toggle | Editor::Choice | Editor::Reference)
        }
        _ => false,
    }
}

fn step(state: &mut AppState, row: Option<Row>, delta: i64) {
    if let Some(RowKind::Field { editor, .. }) = row.map(|r| r.kind) {
        if !matches!(editor, Editor::Text | Editor::Vector | Editor::Color) {
            let selected = state.view.selected;
            queue(state, selected, InputAction::Step(delta));
        }
    }
}

fn queue(state: &mut AppState, row: usize, action: InputAction) {
    state.surface.queue(PendingInput { row, action });
}

fn clear_status_for(state: &mut AppState, row: &Row) {
    if matches!(row.kind, RowKind::Header { .. }) {
        state.status_message = None;
    }
}

/// Nearest header above `index` that is shallower than `depth`.
fn parent_header(rows: &[Row], index: usize, depth: usize) -> Option<usize> {
    rows[..index.min(rows.len())]
        .iter()
        .rposition(|r| r.depth < depth && matches!(r.kind, RowKind::Header { .. }))
}

// ── mouse ───────────────────────────────────────────────────────

pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    if state.active_view != ActiveView::Inspector || state.editor.is_some() {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => state.view.select_next(state.surface.rows()),
        MouseEventKind::ScrollUp => state.view.select_prev(state.surface.rows()),
        MouseEventKind::Down(MouseButton::Left) => {
            let Some(index) = state.view.row_at(state.list_area, mouse.row) else {
                return;
            };
            let Some(row) = state.surface.rows().get(index) else {
                return;
            };
            if !row.is_selectable() {
                return;
            }
            // a click on a header folds it, like the arrow in a GUI inspector
            if matches!(row.kind, RowKind::Header { .. }) {
                queue(state, index, InputAction::Toggle);
            }
            state.view.selected = index;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use ratatui::layout::Rect;

    use super::*;
    use crate::config::AppConfig;
    use crate::core::{SessionSettings, Value};

    fn press(state: &mut AppState, code: KeyCode) {
        handle_key(state, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            press(state, KeyCode::Char(c));
        }
    }

    fn playing() -> AppState {
        let mut state = AppState::new(AppConfig::default(), SessionSettings::default(), true);
        state.inspect();
        state
    }

    fn find(state: &AppState, label: &str) -> usize {
        state
            .surface
            .rows()
            .iter()
            .position(|r| r.label == label)
            .unwrap_or_else(|| panic!("no row {label:?}"))
    }

    fn open(state: &mut AppState, label: &str) {
        state.view.selected = find(state, label);
        press(state, KeyCode::Right);
        state.inspect();
    }

    fn player_field(state: &AppState, name: &str) -> Option<Value> {
        state.world.roots()[0].handle.borrow().get(name)
    }

    #[test]
    fn ctrl_c_quits_even_while_editing() {
        let mut state = playing();
        state.editor = Some(LineEditor {
            row: 0,
            label: "x".into(),
            buffer: String::new(),
        });
        handle_key(&mut state, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(state.should_quit);
    }

    #[test]
    fn expand_then_collapse_a_debug_view() {
        let mut state = playing();
        let before = state.surface.rows().len();
        open(&mut state, "Debug view");
        assert!(state.surface.rows().len() > before);
        assert_eq!(state.session.root_count(), 1);

        // step into the body, then collapse back to the header
        press(&mut state, KeyCode::Down);
        let header = find(&state, "Debug view");
        assert!(state.view.selected > header);
        press(&mut state, KeyCode::Left);
        assert_eq!(state.view.selected, header);
        press(&mut state, KeyCode::Left);
        state.inspect();
        assert_eq!(state.surface.rows().len(), before);
    }

    #[test]
    fn line_editor_commits_on_enter() {
        let mut state = playing();
        open(&mut state, "Debug view");
        open(&mut state, "Public fields");

        state.view.selected = find(&state, "health");
        press(&mut state, KeyCode::Char('e'));
        let editor = state.editor.as_mut().expect("editor opened");
        editor.buffer.clear();
        type_text(&mut state, "300");
        press(&mut state, KeyCode::Enter);
        assert!(state.editor.is_none());
        state.inspect();

        // u8 field clamps
        assert!(matches!(player_field(&state, "health"), Some(Value::Int(255))));
    }

    #[test]
    fn escape_cancels_the_edit() {
        let mut state = playing();
        open(&mut state, "Debug view");
        open(&mut state, "Public fields");

        state.view.selected = find(&state, "health");
        let before = player_field(&state, "health");
        press(&mut state, KeyCode::Enter);
        type_text(&mut state, "9");
        press(&mut state, KeyCode::Esc);
        state.inspect();
        assert!(state.editor.is_none());
        assert_eq!(
            format!("{:?}", player_field(&state, "health")),
            format!("{before:?}")
        );
    }

    #[test]
    fn space_flips_bools_and_plus_steps_numbers() {
        let mut state = playing();
        open(&mut state, "Debug view");
        open(&mut state, "Public fields");

        state.view.selected = find(&state, "invulnerable");
        press(&mut state, KeyCode::Char(' '));
        state.inspect();
        assert!(matches!(player_field(&state, "invulnerable"), Some(Value::Bool(true))));

        let Some(Value::Int(health)) = player_field(&state, "health") else {
            panic!("health is an int");
        };
        state.view.selected = find(&state, "health");
        press(&mut state, KeyCode::Char('-'));
        state.inspect();
        assert!(matches!(player_field(&state, "health"), Some(Value::Int(h)) if h == health - 1));
    }

    #[test]
    fn help_overlay_swallows_the_next_key() {
        let mut state = playing();
        press(&mut state, KeyCode::Char('?'));
        assert_eq!(state.active_view, ActiveView::Help);
        press(&mut state, KeyCode::Char('q'));
        assert_eq!(state.active_view, ActiveView::Inspector);
        assert!(!state.should_quit);
    }

    #[test]
    fn clicking_a_header_folds_it() {
        let mut state = playing();
        state.list_area = Rect::new(1, 1, 60, 30);
        let header = find(&state, "Debug view");
        handle_mouse(
            &mut state,
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: 5,
                row: 1 + header as u16,
                modifiers: KeyModifiers::NONE,
            },
        );
        assert_eq!(state.view.selected, header);
        state.inspect();
        assert!(matches!(
            state.surface.rows()[header].kind,
            RowKind::Header { open: true, .. }
        ));
    }

    #[test]
    fn parent_header_skips_siblings() {
        let row = |depth, kind| Row {
            depth,
            label: String::new(),
            kind,
        };
        let header = || RowKind::Header { open: true, icon: None };
        let rows = vec![
            row(0, header()),
            row(1, RowKind::Text("a".into())),
            row(1, header()),
            row(2, RowKind::Text("b".into())),
            row(1, RowKind::Text("c".into())),
        ];
        assert_eq!(parent_header(&rows, 4, 1), Some(0));
        assert_eq!(parent_header(&rows, 3, 2), Some(2));
        assert_eq!(parent_header(&rows, 0, 0), None);
    }
}
