//! Primitive field editing: picks the widget for a leaf value and coerces
//! what the surface hands back into the declared type.

use std::mem;

use tracing::warn;

use super::error::Result;
use super::surface::Surface;
use super::value::{FieldType, Value};

/// Draw one editable leaf and return the value to store.
///
/// Values the surface returns in the wrong shape are ignored with a warning.
/// Integers are clamped to their kind, `f32` fields are narrowed, enum
/// indices must name a variant and references must be assignable to the
/// declared slot; anything else keeps the previous value.  Kinds with no
/// editor get a read-only "Unsupported type" row and pass through as-is.
pub fn edit_leaf(ui: &mut dyn Surface, label: &str, ty: &FieldType, value: Value) -> Result<Value> {
    if !is_editable(ty, &value) {
        ui.labeled_text(label, &format!("Unsupported type ({})", ty.name()))?;
        return Ok(value);
    }

    let edited = ui.edit_field(label, ty, value.clone())?;
    if mem::discriminant(&edited) != mem::discriminant(&value) {
        warn!(
            label,
            expected = value.kind(),
            got = edited.kind(),
            "surface returned a value of the wrong kind"
        );
        return Ok(value);
    }

    match coerce(ty, edited) {
        Some(accepted) => Ok(accepted),
        None => {
            warn!(label, ty = %ty.name(), "edit rejected");
            Ok(value)
        }
    }
}

fn is_editable(ty: &FieldType, value: &Value) -> bool {
    match (ty, value) {
        (FieldType::Int(_), Value::Int(_))
        | (FieldType::Float(_), Value::Float(_))
        | (FieldType::Bool, Value::Bool(_))
        | (FieldType::Text, Value::Text(_))
        | (FieldType::Enum(_), Value::Enum(_))
        | (FieldType::Color, Value::Color(_))
        | (FieldType::Reference(_), Value::Reference(_)) => true,
        (FieldType::Vector(dims), Value::Vector(v)) => v.dims() == *dims,
        _ => false,
    }
}

fn coerce(ty: &FieldType, edited: Value) -> Option<Value> {
    match (ty, edited) {
        (FieldType::Int(kind), Value::Int(n)) => Some(Value::Int(kind.clamp(n))),
        (FieldType::Float(kind), Value::Float(f)) => Some(Value::Float(kind.narrow(f))),
        (FieldType::Enum(desc), Value::Enum(index)) => {
            (index < desc.variants.len()).then_some(Value::Enum(index))
        }
        (FieldType::Vector(dims), Value::Vector(v)) => (v.dims() == *dims).then_some(Value::Vector(v)),
        (FieldType::Reference(slot), Value::Reference(Some(asset))) => asset
            .ty
            .is_assignable_to(slot)
            .then_some(Value::Reference(Some(asset))),
        (_, edited) => Some(edited),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::core::testing::RecordingSurface;
    use crate::core::value::{AssetRef, AssetType, EnumDesc, FloatKind, IntKind, Vector};

    static ASSET: AssetType = AssetType { name: "Asset", base: None };
    static TEXTURE: AssetType = AssetType { name: "Texture", base: Some(&ASSET) };
    static MATERIAL: AssetType = AssetType { name: "Material", base: Some(&ASSET) };
    static MODE: EnumDesc = EnumDesc {
        name: "Mode",
        variants: &["Idle", "Run"],
    };

    fn edit(ty: FieldType, before: Value, after: Value) -> Value {
        let mut ui = RecordingSurface::default();
        ui.edit("f", after);
        edit_leaf(&mut ui, "f", &ty, before).unwrap()
    }

    #[rstest]
    #[case(IntKind::U8, 9999, 255)]
    #[case(IntKind::I8, -1000, -128)]
    #[case(IntKind::I32, 12, 12)]
    fn integers_clamp_to_their_kind(#[case] kind: IntKind, #[case] typed: i128, #[case] stored: i128) {
        let out = edit(FieldType::Int(kind), Value::Int(0), Value::Int(typed));
        assert!(matches!(out, Value::Int(n) if n == stored));
    }

    #[test]
    fn f32_fields_are_narrowed() {
        let out = edit(FieldType::Float(FloatKind::F32), Value::Float(0.0), Value::Float(0.1));
        assert!(matches!(out, Value::Float(f) if f == 0.1f32 as f64));
    }

    #[test]
    fn wrong_kind_keeps_previous_value() {
        let out = edit(FieldType::Int(IntKind::I32), Value::Int(5), Value::Text("x".into()));
        assert!(matches!(out, Value::Int(5)));
    }

    #[test]
    fn enum_index_must_name_a_variant() {
        let out = edit(FieldType::Enum(&MODE), Value::Enum(0), Value::Enum(7));
        assert!(matches!(out, Value::Enum(0)));
        let out = edit(FieldType::Enum(&MODE), Value::Enum(0), Value::Enum(1));
        assert!(matches!(out, Value::Enum(1)));
    }

    #[test]
    fn vector_dimension_must_match() {
        let v3 = Vector::zero(3).unwrap();
        let v2 = Vector::zero(2).unwrap();
        let out = edit(FieldType::Vector(3), Value::Vector(v3), Value::Vector(v2));
        assert!(matches!(out, Value::Vector(v) if v.dims() == 3));
    }

    #[test]
    fn references_must_be_assignable() {
        let slot = FieldType::Reference(&TEXTURE);
        let rejected = edit(
            slot,
            Value::Reference(None),
            Value::Reference(Some(AssetRef::new(&MATERIAL, "Stone"))),
        );
        assert!(matches!(rejected, Value::Reference(None)));

        let accepted = edit(
            slot,
            Value::Reference(None),
            Value::Reference(Some(AssetRef::new(&TEXTURE, "Grass"))),
        );
        assert!(matches!(accepted, Value::Reference(Some(r)) if r.name == "Grass"));

        let cleared = edit(
            slot,
            Value::Reference(Some(AssetRef::new(&TEXTURE, "Grass"))),
            Value::Reference(None),
        );
        assert!(matches!(cleared, Value::Reference(None)));
    }

    #[test]
    fn unsupported_kinds_render_read_only() {
        let mut ui = RecordingSurface::default();
        let out = edit_leaf(
            &mut ui,
            "handle",
            &FieldType::Unsupported("RawHandle"),
            Value::Opaque("0xdead".into()),
        )
        .unwrap();
        assert!(matches!(out, Value::Opaque(ref s) if s == "0xdead"));
        assert_eq!(ui.take(), vec!["handle: Unsupported type (RawHandle)"]);
    }
}
