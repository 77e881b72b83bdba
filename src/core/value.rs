//! Declared field types and runtime values.
//!
//! Dispatch never looks at Rust's own type system: every field declares one
//! [`FieldType`] from a closed set, and every read produces one [`Value`].
//! The primitive renderer and the graph renderer only match on these two
//! enums.

use std::fmt;

use super::reflect::{Handle, ListHandle};

// ───────────────────────────────────────── integers ──────────

/// Fixed-width integer kinds.  Values travel as `i128`, wide enough for
/// every kind including `u64`; edits are clamped back into the kind's
/// representable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
}

impl IntKind {
    pub fn range(self) -> (i128, i128) {
        match self {
            IntKind::I8 => (i8::MIN.into(), i8::MAX.into()),
            IntKind::U8 => (0, u8::MAX.into()),
            IntKind::I16 => (i16::MIN.into(), i16::MAX.into()),
            IntKind::U16 => (0, u16::MAX.into()),
            IntKind::I32 => (i32::MIN.into(), i32::MAX.into()),
            IntKind::U32 => (0, u32::MAX.into()),
            IntKind::I64 => (i64::MIN.into(), i64::MAX.into()),
            IntKind::U64 => (0, u64::MAX.into()),
        }
    }

    pub fn clamp(self, value: i128) -> i128 {
        let (min, max) = self.range();
        value.clamp(min, max)
    }

    pub fn name(self) -> &'static str {
        match self {
            IntKind::I8 => "i8",
            IntKind::U8 => "u8",
            IntKind::I16 => "i16",
            IntKind::U16 => "u16",
            IntKind::I32 => "i32",
            IntKind::U32 => "u32",
            IntKind::I64 => "i64",
            IntKind::U64 => "u64",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatKind {
    F32,
    F64,
}

impl FloatKind {
    /// Round-trip `value` through the kind's storage width.
    pub fn narrow(self, value: f64) -> f64 {
        match self {
            FloatKind::F32 if value.is_finite() => {
                value.clamp(f32::MIN as f64, f32::MAX as f64) as f32 as f64
            }
            FloatKind::F32 | FloatKind::F64 => value,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FloatKind::F32 => "f32",
            FloatKind::F64 => "f64",
        }
    }
}

// ───────────────────────────────────────── compound leaves ───

/// Named choice set for enum fields.  Values store the variant index.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumDesc {
    pub name: &'static str,
    pub variants: &'static [&'static str],
}

/// Small fixed numeric vector (2, 3 or 4 components).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Vector {
    V2([f32; 2]),
    V3([f32; 3]),
    V4([f32; 4]),
}

impl Vector {
    pub fn zero(dims: u8) -> Option<Self> {
        match dims {
            2 => Some(Vector::V2([0.0; 2])),
            3 => Some(Vector::V3([0.0; 3])),
            4 => Some(Vector::V4([0.0; 4])),
            _ => None,
        }
    }

    pub fn dims(&self) -> u8 {
        self.components().len() as u8
    }

    pub fn components(&self) -> &[f32] {
        match self {
            Vector::V2(c) => c,
            Vector::V3(c) => c,
            Vector::V4(c) => c,
        }
    }

    pub fn components_mut(&mut self) -> &mut [f32] {
        match self {
            Vector::V2(c) => c,
            Vector::V3(c) => c,
            Vector::V4(c) => c,
        }
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components().iter().map(|c| format!("{c}")).collect();
        write!(f, "({})", parts.join(", "))
    }
}

/// Linear RGBA colour, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RGBA({:.3}, {:.3}, {:.3}, {:.3})",
            self.r, self.g, self.b, self.a
        )
    }
}

// ───────────────────────────────────────── asset references ──

/// A node in the asset type hierarchy (`Texture2D` → `Texture` → `Asset`).
#[derive(Debug, PartialEq, Eq)]
pub struct AssetType {
    pub name: &'static str,
    pub base: Option<&'static AssetType>,
}

impl AssetType {
    /// True when a reference of this type fits a slot declared as `target`.
    pub fn is_assignable_to(&self, target: &AssetType) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if ty.name == target.name {
                return true;
            }
            current = ty.base;
        }
        false
    }
}

/// A reference to a saved asset (texture, material, …) by name.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRef {
    pub ty: &'static AssetType,
    pub name: String,
}

impl AssetRef {
    pub fn new(ty: &'static AssetType, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }
}

// ───────────────────────────────────────── declared types ────

/// The declared (static) type of a field or list element.
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    Int(IntKind),
    Float(FloatKind),
    Bool,
    /// Edits commit on confirmation only.
    Text,
    Enum(&'static EnumDesc),
    /// Vector with 2, 3 or 4 components.
    Vector(u8),
    Color,
    /// Reference slot accepting the named asset type or any subtype.
    Reference(&'static AssetType),
    /// `None` marks an untyped list: list-like for dispatch, but elements
    /// are not individually editable.
    List(Option<&'static FieldType>),
    Object(&'static str),
    Interface(&'static str),
    Unsupported(&'static str),
}

impl FieldType {
    pub fn name(&self) -> String {
        match self {
            FieldType::Int(kind) => kind.name().to_string(),
            FieldType::Float(kind) => kind.name().to_string(),
            FieldType::Bool => "bool".to_string(),
            FieldType::Text => "String".to_string(),
            FieldType::Enum(desc) => desc.name.to_string(),
            FieldType::Vector(dims) => format!("Vec{dims}"),
            FieldType::Color => "Color".to_string(),
            FieldType::Reference(asset) => asset.name.to_string(),
            FieldType::List(Some(elem)) => format!("List<{}>", elem.name()),
            FieldType::List(None) => "List".to_string(),
            FieldType::Object(name) | FieldType::Interface(name) | FieldType::Unsupported(name) => {
                name.to_string()
            }
        }
    }

    /// Value used when a list grows: zero for value kinds, null for
    /// reference kinds.  `None` when the type cannot be constructed.
    pub fn default_value(&self) -> Option<Value> {
        let value = match self {
            FieldType::Int(_) => Value::Int(0),
            FieldType::Float(_) => Value::Float(0.0),
            FieldType::Bool => Value::Bool(false),
            FieldType::Text => Value::Text(String::new()),
            FieldType::Enum(_) => Value::Enum(0),
            FieldType::Vector(dims) => Value::Vector(Vector::zero(*dims)?),
            FieldType::Color => Value::Color(Color::default()),
            FieldType::Reference(_) => Value::Reference(None),
            FieldType::List(_) => Value::List(None),
            FieldType::Object(_) | FieldType::Interface(_) => Value::Object(None),
            FieldType::Unsupported(_) => return None,
        };
        Some(value)
    }
}

// ───────────────────────────────────────── runtime values ────

/// A value read from (or written to) a field, list element or static.
#[derive(Clone)]
pub enum Value {
    Int(i128),
    Float(f64),
    Bool(bool),
    Text(String),
    /// Variant index into the field's [`EnumDesc`].
    Enum(usize),
    Vector(Vector),
    Color(Color),
    Reference(Option<AssetRef>),
    Object(Option<Handle>),
    List(Option<ListHandle>),
    /// Payload of a type the inspector cannot edit, pre-formatted.
    Opaque(String),
}

impl Value {
    /// Short variant name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Text(_) => "text",
            Value::Enum(_) => "enum",
            Value::Vector(_) => "vector",
            Value::Color(_) => "color",
            Value::Reference(_) => "reference",
            Value::Object(_) => "object",
            Value::List(_) => "list",
            Value::Opaque(_) => "opaque",
        }
    }

    /// Human-readable rendering, using `ty` for enum names and float width.
    pub fn describe(&self, ty: &FieldType) -> String {
        match self {
            Value::Int(n) => n.to_string(),
            Value::Float(f) => match ty {
                FieldType::Float(FloatKind::F32) => format!("{}", *f as f32),
                _ => format!("{f}"),
            },
            Value::Bool(b) => b.to_string(),
            Value::Text(s) => s.clone(),
            Value::Enum(index) => match ty {
                FieldType::Enum(desc) => desc
                    .variants
                    .get(*index)
                    .map_or_else(|| format!("#{index}"), |v| (*v).to_string()),
                _ => format!("#{index}"),
            },
            Value::Vector(v) => v.to_string(),
            Value::Color(c) => c.to_string(),
            Value::Reference(Some(r)) => format!("{} ({})", r.name, r.ty.name),
            Value::Reference(None) => format!("None ({})", ty.name()),
            Value::Object(Some(_)) => format!("{{{}}}", ty.name()),
            Value::Object(None) | Value::List(None) => "null".to_string(),
            Value::List(Some(list)) => match list.try_borrow() {
                Ok(list) => format!("[{}]", list.len()),
                Err(_) => "[…]".to_string(),
            },
            Value::Opaque(text) => text.clone(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Value::Enum(i) => f.debug_tuple("Enum").field(i).finish(),
            Value::Vector(v) => f.debug_tuple("Vector").field(v).finish(),
            Value::Color(c) => f.debug_tuple("Color").field(c).finish(),
            Value::Reference(r) => f.debug_tuple("Reference").field(r).finish(),
            Value::Object(obj) => match obj {
                Some(h) => write!(f, "Object({:#x})", super::reflect::handle_id(h)),
                None => f.write_str("Object(null)"),
            },
            Value::List(list) => match list {
                Some(_) => f.write_str("List(..)"),
                None => f.write_str("List(null)"),
            },
            Value::Opaque(s) => f.debug_tuple("Opaque").field(s).finish(),
        }
    }
}
