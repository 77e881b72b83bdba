//! Row-recording [`Surface`] for the terminal host.
//!
//! Each inspector pass records one [`Row`] per call.  Key presses are not
//! applied to rows directly: the handler queues a [`PendingInput`] against a
//! row index, and the next pass applies it when it reaches that row, so the
//! core sees the edit through the normal immediate-mode return value.

use crate::core::surface::{Surface, SurfaceResult};
use crate::core::MAX_LIST_LEN;
use crate::core::value::{AssetRef, AssetType, Color, FieldType, Value};

// ───────────────────────────────────────── row model ─────────

/// Which input a field row accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Editor {
    Number,
    Toggle,
    Choice,
    Text,
    Vector,
    Color,
    Reference,
    Count,
}

impl Editor {
    fn for_type(ty: &FieldType) -> Option<Self> {
        let editor = match ty {
            FieldType::Int(_) | FieldType::Float(_) => Editor::Number,
            FieldType::Bool => Editor::Toggle,
            FieldType::Enum(_) => Editor::Choice,
            FieldType::Text => Editor::Text,
            FieldType::Vector(_) => Editor::Vector,
            FieldType::Color => Editor::Color,
            FieldType::Reference(_) => Editor::Reference,
            _ => return None,
        };
        Some(editor)
    }

    /// Whether the line editor applies (as opposed to toggling or stepping).
    pub fn takes_text(self) -> bool {
        !matches!(self, Editor::Toggle)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    /// Component name above a debug view.  Host chrome, not inspector output.
    Title,
    Header {
        open: bool,
        icon: Option<String>,
    },
    Field {
        value: String,
        /// Initial buffer for the line editor.
        edit_text: String,
        editor: Editor,
    },
    Text(String),
    Separator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub depth: usize,
    pub label: String,
    pub kind: RowKind,
}

impl Row {
    pub fn is_selectable(&self) -> bool {
        !matches!(self.kind, RowKind::Separator)
    }
}

// ───────────────────────────────────────── input ─────────────

#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    /// Flip a header, a bool, or advance a choice.
    Toggle,
    /// Force a header open or closed.
    Open(bool),
    /// Nudge a number, count, choice or reference.
    Step(i64),
    /// Confirmed line-editor text.
    Commit(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingInput {
    pub row: usize,
    pub action: InputAction,
}

// ───────────────────────────────────────── surface ───────────

#[derive(Debug, Default)]
pub struct TuiSurface {
    rows: Vec<Row>,
    depth: usize,
    pending: Option<PendingInput>,
    catalog: Vec<AssetRef>,
    feedback: Option<String>,
}

impl TuiSurface {
    /// `catalog` lists the assets reference fields can be pointed at.
    pub fn new(catalog: Vec<AssetRef>) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    /// Forget last pass's rows.  Pending input is kept for this pass.
    pub fn begin_frame(&mut self) {
        self.rows.clear();
        self.depth = 0;
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn queue(&mut self, input: PendingInput) {
        self.pending = Some(input);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop input no row of this pass accepted, so it cannot land on a
    /// different row once the layout shifts.
    pub fn end_frame(&mut self) -> Option<PendingInput> {
        self.pending.take()
    }

    /// Message about the last rejected input, if any.
    pub fn take_feedback(&mut self) -> Option<String> {
        self.feedback.take()
    }

    pub fn title(&mut self, name: &str) {
        self.depth = 0;
        self.push(name, RowKind::Title);
    }

    pub fn note(&mut self, text: &str) {
        self.push("", RowKind::Text(text.to_string()));
    }

    fn push(&mut self, label: &str, kind: RowKind) {
        self.rows.push(Row {
            depth: self.depth,
            label: label.to_string(),
            kind,
        });
    }

    /// Input queued for the row about to be recorded.
    fn input_for_next_row(&mut self) -> Option<InputAction> {
        let next = self.rows.len();
        match &self.pending {
            Some(p) if p.row == next => self.pending.take().map(|p| p.action),
            _ => None,
        }
    }

    fn reject(&mut self, label: &str, reason: &str) {
        self.feedback = Some(format!("{label}: {reason}"));
    }

    fn apply(&mut self, label: &str, ty: &FieldType, value: Value, action: InputAction) -> Value {
        match (ty, value, action) {
            (_, Value::Int(n), InputAction::Step(step)) => Value::Int(n.saturating_add(step.into())),
            (_, Value::Float(f), InputAction::Step(step)) => Value::Float(f + step as f64 * 0.1),
            (_, Value::Bool(b), InputAction::Toggle | InputAction::Step(_)) => Value::Bool(!b),
            (FieldType::Enum(desc), Value::Enum(i), InputAction::Toggle) => {
                Value::Enum(cycle(i, 1, desc.variants.len()))
            }
            (FieldType::Enum(desc), Value::Enum(i), InputAction::Step(step)) => {
                Value::Enum(cycle(i, step, desc.variants.len()))
            }
            (FieldType::Reference(slot), Value::Reference(current), InputAction::Toggle) => {
                Value::Reference(self.next_asset(slot, current.as_ref(), 1))
            }
            (FieldType::Reference(slot), Value::Reference(current), InputAction::Step(step)) => {
                Value::Reference(self.next_asset(slot, current.as_ref(), step))
            }
            (ty, value, InputAction::Commit(text)) => match parse_commit(ty, &value, &text, &self.catalog) {
                Some(parsed) => parsed,
                None => {
                    self.reject(label, &format!("cannot read {text:?} as {}", ty.name()));
                    value
                }
            },
            (_, value, _) => value,
        }
    }

    /// Cycle through "none" plus every catalog asset that fits `slot`.
    fn next_asset(&self, slot: &AssetType, current: Option<&AssetRef>, step: i64) -> Option<AssetRef> {
        let mut options: Vec<Option<&AssetRef>> = vec![None];
        options.extend(self.catalog.iter().filter(|a| a.ty.is_assignable_to(slot)).map(Some));
        let position = options
            .iter()
            .position(|o| o.map(|a| &a.name) == current.map(|a| &a.name))
            .unwrap_or(0);
        options[cycle(position, step, options.len())].cloned()
    }
}

fn cycle(index: usize, step: i64, len: usize) -> usize {
    if len == 0 {
        return index;
    }
    (index as i64 + step).rem_euclid(len as i64) as usize
}

fn floats(text: &str) -> Option<Vec<f32>> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f32>().ok())
        .collect()
}

/// Turn confirmed editor text into a value of the same kind as `current`.
fn parse_commit(ty: &FieldType, current: &Value, text: &str, catalog: &[AssetRef]) -> Option<Value> {
    let text = text.trim();
    match (ty, current) {
        (_, Value::Int(_)) => text.parse::<i128>().ok().map(Value::Int),
        (_, Value::Float(_)) => text.parse::<f64>().ok().map(Value::Float),
        (_, Value::Bool(_)) => text.parse::<bool>().ok().map(Value::Bool),
        (_, Value::Text(_)) => Some(Value::Text(text.to_string())),
        (FieldType::Enum(desc), Value::Enum(_)) => desc
            .variants
            .iter()
            .position(|v| v.eq_ignore_ascii_case(text))
            .or_else(|| text.parse::<usize>().ok())
            .map(Value::Enum),
        (_, Value::Vector(v)) => {
            let parts = floats(text)?;
            let mut out = *v;
            if parts.len() != out.components().len() {
                return None;
            }
            out.components_mut().copy_from_slice(&parts);
            Some(Value::Vector(out))
        }
        (_, Value::Color(_)) => match floats(text)?.as_slice() {
            [r, g, b] => Some(Value::Color(Color::rgba(*r, *g, *b, 1.0).clamped())),
            [r, g, b, a] => Some(Value::Color(Color::rgba(*r, *g, *b, *a).clamped())),
            _ => None,
        },
        (_, Value::Reference(_)) => {
            if text.is_empty() || text.eq_ignore_ascii_case("none") {
                return Some(Value::Reference(None));
            }
            // Any catalog entry is offered; the inspector rejects mismatched types.
            catalog
                .iter()
                .find(|a| a.name.eq_ignore_ascii_case(text))
                .map(|a| Value::Reference(Some(a.clone())))
        }
        _ => None,
    }
}

fn edit_text(value: &Value, ty: &FieldType) -> String {
    match value {
        Value::Vector(v) => v
            .components()
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Color(c) => format!("{}, {}, {}, {}", c.r, c.g, c.b, c.a),
        Value::Reference(Some(asset)) => asset.name.clone(),
        Value::Reference(None) => "none".to_string(),
        other => other.describe(ty),
    }
}

impl Surface for TuiSurface {
    fn labeled_text(&mut self, label: &str, text: &str) -> SurfaceResult<()> {
        self.push(label, RowKind::Text(text.to_string()));
        Ok(())
    }

    fn foldout_header(&mut self, label: &str, icon: Option<&str>, open: bool) -> SurfaceResult<bool> {
        let open = match self.input_for_next_row() {
            Some(InputAction::Toggle) => !open,
            Some(InputAction::Open(wanted)) => wanted,
            _ => open,
        };
        self.push(
            label,
            RowKind::Header {
                open,
                icon: icon.map(str::to_string),
            },
        );
        Ok(open)
    }

    fn edit_field(&mut self, label: &str, ty: &FieldType, value: Value) -> SurfaceResult<Value> {
        let value = match self.input_for_next_row() {
            Some(action) => self.apply(label, ty, value, action),
            None => value,
        };
        let editor = Editor::for_type(ty).unwrap_or(Editor::Text);
        self.push(
            label,
            RowKind::Field {
                value: value.describe(ty),
                edit_text: edit_text(&value, ty),
                editor,
            },
        );
        Ok(value)
    }

    fn edit_count(&mut self, label: &str, count: usize) -> SurfaceResult<usize> {
        let count = match self.input_for_next_row() {
            Some(InputAction::Step(step)) => {
                let stepped = count.saturating_add_signed(step as isize);
                if stepped > MAX_LIST_LEN {
                    self.reject(label, &format!("at most {MAX_LIST_LEN} items"));
                    count
                } else {
                    stepped
                }
            }
            Some(InputAction::Commit(text)) => match text.trim().parse::<usize>() {
                Ok(n) if n <= MAX_LIST_LEN => n,
                Ok(_) => {
                    self.reject(label, &format!("at most {MAX_LIST_LEN} items"));
                    count
                }
                Err(_) => {
                    self.reject(label, &format!("cannot read {text:?} as a size"));
                    count
                }
            },
            _ => count,
        };
        self.push(
            label,
            RowKind::Field {
                value: count.to_string(),
                edit_text: count.to_string(),
                editor: Editor::Count,
            },
        );
        Ok(count)
    }

    fn separator(&mut self) -> SurfaceResult<()> {
        // Spacing directly under a header or another separator adds nothing.
        let redundant = match self.rows.last() {
            None => true,
            Some(row) => matches!(row.kind, RowKind::Separator | RowKind::Header { open: true, .. }),
        };
        if !redundant {
            self.push("", RowKind::Separator);
        }
        Ok(())
    }

    fn push_indent(&mut self) {
        self.depth += 1;
    }

    fn pop_indent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
