//! Scripted surface and sample types shared by the core tests.

use std::collections::{HashMap, HashSet};

use super::error::SurfaceError;
use super::reflect::{FieldDesc, Handle, Inspect, ListHandle, StaticFields, TypeDesc};
use super::surface::{Surface, SurfaceResult};
use super::value::{FieldType, FloatKind, IntKind, Value};

/// Records every row as an indented line and replays scripted input.
///
/// Clicks and edits are one-shot: they apply the next time a row with that
/// label is drawn, then the surface goes back to echoing what it is given.
#[derive(Default)]
pub(crate) struct RecordingSurface {
    lines: Vec<String>,
    depth: usize,
    clicks: HashSet<String>,
    edits: HashMap<String, Value>,
    counts: HashMap<String, usize>,
    fail_on: Option<String>,
}

impl RecordingSurface {
    pub fn click(&mut self, label: &str) {
        self.clicks.insert(label.to_string());
    }

    pub fn edit(&mut self, label: &str, value: Value) {
        self.edits.insert(label.to_string(), value);
    }

    pub fn resize(&mut self, label: &str, count: usize) {
        self.counts.insert(label.to_string(), count);
    }

    pub fn fail_on(&mut self, label: &str) {
        self.fail_on = Some(label.to_string());
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Lines drawn since the last call.
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    fn row(&mut self, text: String) {
        self.lines.push(format!("{}{}", "  ".repeat(self.depth), text));
    }

    fn check(&self, label: &str) -> SurfaceResult<()> {
        match &self.fail_on {
            Some(failing) if failing == label => Err(SurfaceError::new(format!("cannot draw {label}"))),
            _ => Ok(()),
        }
    }
}

impl Surface for RecordingSurface {
    fn labeled_text(&mut self, label: &str, text: &str) -> SurfaceResult<()> {
        self.check(label)?;
        self.row(format!("{label}: {text}"));
        Ok(())
    }

    fn foldout_header(&mut self, label: &str, _icon: Option<&str>, open: bool) -> SurfaceResult<bool> {
        self.check(label)?;
        let open = if self.clicks.remove(label) { !open } else { open };
        self.row(format!("{} {label}", if open { "v" } else { ">" }));
        Ok(open)
    }

    fn edit_field(&mut self, label: &str, _ty: &FieldType, value: Value) -> SurfaceResult<Value> {
        self.check(label)?;
        let value = self.edits.remove(label).unwrap_or(value);
        self.row(format!("{label} = {value:?}"));
        Ok(value)
    }

    fn edit_count(&mut self, label: &str, count: usize) -> SurfaceResult<usize> {
        self.check(label)?;
        let count = self.counts.remove(label).unwrap_or(count);
        self.row(format!("{label} = {count}"));
        Ok(count)
    }

    fn separator(&mut self) -> SurfaceResult<()> {
        self.row("--".to_string());
        Ok(())
    }

    fn push_indent(&mut self) {
        self.depth += 1;
    }

    fn pop_indent(&mut self) {
        self.depth -= 1;
    }
}

// ───────────────────────────────────────── sample types ──────

/// Two fields, one of each visibility.
pub(crate) struct Point {
    pub x: i32,
    pub y: f32,
}

static POINT_FIELDS: [FieldDesc; 2] = [
    FieldDesc::public("x", FieldType::Int(IntKind::I32)),
    FieldDesc::private("_y", FieldType::Float(FloatKind::F32)),
];

pub(crate) static POINT: TypeDesc = TypeDesc {
    name: "Point",
    base: None,
    fields: &POINT_FIELDS,
    statics: None,
};

impl Inspect for Point {
    fn type_desc(&self) -> &'static TypeDesc {
        &POINT
    }

    fn get(&self, name: &str) -> Option<Value> {
        match name {
            "x" => Some(Value::Int(self.x.into())),
            "_y" => Some(Value::Float(self.y.into())),
            _ => None,
        }
    }

    fn set(&mut self, name: &str, value: Value) {
        match (name, value) {
            ("x", Value::Int(x)) => self.x = x as i32,
            ("_y", Value::Float(y)) => self.y = y as f32,
            _ => {}
        }
    }
}

/// A linked node: one public object reference and one public list.
pub(crate) struct Link {
    pub next: Option<Handle>,
    pub items: Option<ListHandle>,
}

static LINK_FIELDS: [FieldDesc; 2] = [
    FieldDesc::public("next", FieldType::Object("Link")),
    FieldDesc::public("items", FieldType::List(Some(&FieldType::Int(IntKind::U8)))),
];

pub(crate) static LINK: TypeDesc = TypeDesc {
    name: "Link",
    base: None,
    fields: &LINK_FIELDS,
    statics: None,
};

impl Inspect for Link {
    fn type_desc(&self) -> &'static TypeDesc {
        &LINK
    }

    fn get(&self, name: &str) -> Option<Value> {
        match name {
            "next" => Some(Value::Object(self.next.clone())),
            "items" => Some(Value::List(self.items.clone())),
            _ => None,
        }
    }

    fn set(&mut self, name: &str, value: Value) {
        match (name, value) {
            ("next", Value::Object(next)) => self.next = next,
            ("items", Value::List(items)) => self.items = items,
            _ => {}
        }
    }
}

/// One private instance field and one public constant.
pub(crate) struct Gauge {
    pub level: i32,
}

pub(crate) struct GaugeStatics;

impl StaticFields for GaugeStatics {
    fn get(&self, name: &str) -> Option<Value> {
        (name == "LIMIT").then_some(Value::Int(100))
    }

    fn set(&self, _name: &str, _value: Value) {}
}

pub(crate) static GAUGE_STATICS: GaugeStatics = GaugeStatics;

static GAUGE_FIELDS: [FieldDesc; 2] = [
    FieldDesc::private("_level", FieldType::Int(IntKind::I32)),
    FieldDesc::public("LIMIT", FieldType::Int(IntKind::I32)).constant(),
];

pub(crate) static GAUGE: TypeDesc = TypeDesc {
    name: "Gauge",
    base: None,
    fields: &GAUGE_FIELDS,
    statics: Some(&GAUGE_STATICS),
};

impl Inspect for Gauge {
    fn type_desc(&self) -> &'static TypeDesc {
        &GAUGE
    }

    fn get(&self, name: &str) -> Option<Value> {
        (name == "_level").then(|| Value::Int(self.level.into()))
    }

    fn set(&mut self, name: &str, value: Value) {
        if let ("_level", Value::Int(level)) = (name, value) {
            self.level = IntKind::I32.clamp(level) as i32;
        }
    }
}
