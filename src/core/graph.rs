//! Object-graph rendering.
//!
//! Walks an object's type chain (base first), then its instance and static
//! members, recursing into nested objects and lists through foldouts.
//! Borrows on shared handles are kept short: a field is read, the borrow is
//! released, the subtree is drawn, and only then is the new value written
//! back.  That is what lets cyclic graphs render (a back-edge shows up as a
//! nested foldout that stays closed until the user opens it).

use std::cell::{Ref, RefMut};

use tracing::{debug, warn};

use super::error::{InspectError, Result};
use super::field::edit_leaf;
use super::foldout::ChildKey;
use super::inspector::Inspector;
use super::reflect::{members_of, Anchor, FieldDesc, Handle, Inspect, InspectList, ListHandle, Storage, TypeDesc};
use super::session::InspectorSession;
use super::surface::{HostState, Surface};
use super::value::{FieldType, Value};

/// Header of the debug panel appended to a component's editor.
pub const DEBUG_VIEW_LABEL: &str = "Debug view";

/// Largest length a list can be resized to from the inspector.
pub const MAX_LIST_LEN: usize = 10_000;

const PUBLIC_FIELDS: &str = "Public fields";
const STATIC_FIELDS: &str = "Static fields";

/// Draw the collapsible debug view for `target` when the host is playing
/// and the target is a live instance.  Returns whether anything was drawn.
pub fn draw_debug_view(
    session: &mut InspectorSession,
    ui: &mut dyn Surface,
    host: HostState,
    target: &Handle,
) -> Result<bool> {
    if !host.playing || read(target, DEBUG_VIEW_LABEL)?.is_persistent() {
        return Ok(false);
    }
    session.inspector(ui).show(DEBUG_VIEW_LABEL, Some(target))?;
    Ok(true)
}

/// Shrink from the tail or grow with the element default.  Returns the new
/// length, which stays short of `count` when the element type has no
/// default.  Growth stops at [`MAX_LIST_LEN`].
pub fn resize_list(list: &mut dyn InspectList, count: usize, element: &FieldType) -> usize {
    let len = list.len();
    if count > MAX_LIST_LEN {
        warn!(requested = count, max = MAX_LIST_LEN, "list size capped");
    }
    let count = count.min(MAX_LIST_LEN.max(len));
    if count < len {
        list.truncate(count);
    } else if count > len {
        let Some(fill) = element.default_value() else {
            warn!(ty = %element.name(), "list element type has no default, not growing");
            return len;
        };
        for _ in len..count {
            list.push(fill.clone());
        }
    }
    debug!(from = len, to = list.len(), "list resized");
    list.len()
}

impl<'a> Inspector<'a> {
    /// Render `value` as a top-level foldout.  A missing root is an error.
    pub fn show(&mut self, label: &str, value: Option<&Handle>) -> Result<()> {
        self.show_with_icon(label, value, None)
    }

    pub fn show_with_icon(&mut self, label: &str, value: Option<&Handle>, icon: Option<&str>) -> Result<()> {
        let value = value.ok_or(InspectError::NullRoot)?;
        let ty = read(value, label)?.type_desc();
        self.draw_object(label, ty, value, None, icon)
    }

    /// Render one field value of declared type `ty` and return the value to
    /// store back.
    pub fn field_value(&mut self, label: &str, ty: &FieldType, value: Value, key: Option<ChildKey>) -> Result<Value> {
        match value {
            Value::List(list) => self.list_field(label, ty, list, key),
            Value::Object(object) => self.object_field(label, ty, object, key),
            leaf => edit_leaf(&mut *self.ui, label, ty, leaf),
        }
    }

    // ── objects ─────────────────────────────────────────────────

    fn draw_object(
        &mut self,
        label: &str,
        ty: &'static TypeDesc,
        value: &Handle,
        key: Option<ChildKey>,
        icon: Option<&str>,
    ) -> Result<()> {
        let anchor = Anchor::object(value);
        let Some(mut scope) = self.foldout(Some(&anchor), key, false, label, icon)? else {
            return Ok(());
        };
        if let Some(name) = ty.shadowed_field() {
            warn!(ty = ty.name, field = name, "field name repeats along the base chain");
        }

        if let Some(base) = ty.base {
            scope.mark_paragraph()?;
            let label = format!("base ({})", base.name);
            scope.draw_object(&label, base, value, Some(ChildKey::Base(base.name)), None)?;
        }
        scope.draw_members(None, ty, value, Storage::Instance)?;
        scope.draw_members(Some(STATIC_FIELDS), ty, value, Storage::Static)?;
        Ok(())
    }

    fn object_field(&mut self, label: &str, ty: &FieldType, object: Option<Handle>, key: Option<ChildKey>) -> Result<Value> {
        let Some(object) = object else {
            self.null_field(label, ty)?;
            return Ok(Value::Object(None));
        };

        let runtime = read(&object, label)?.type_desc();
        let declared = ty.name();
        let label = if declared == runtime.name {
            format!("{label} ({declared})")
        } else {
            format!("{label} ({declared}, {})", runtime.name)
        };
        self.draw_object(&label, runtime, &object, key, None)?;
        Ok(Value::Object(Some(object)))
    }

    fn null_field(&mut self, label: &str, ty: &FieldType) -> Result<()> {
        self.labeled_text(label, &format!("null ({})", ty.name()))
    }

    // ── members ─────────────────────────────────────────────────

    fn draw_members(&mut self, group: Option<&'static str>, ty: &'static TypeDesc, value: &Handle, storage: Storage) -> Result<()> {
        let members = members_of(ty, storage);
        if members.is_empty() {
            return Ok(());
        }
        self.mark_paragraph()?;
        self.grouped(group, value, |inspector| {
            inspector.draw_fields(None, &members.private, ty, value)?;
            inspector.draw_fields(Some(PUBLIC_FIELDS), &members.public, ty, value)
        })
    }

    fn draw_fields(
        &mut self,
        group: Option<&'static str>,
        fields: &[&'static FieldDesc],
        ty: &'static TypeDesc,
        value: &Handle,
    ) -> Result<()> {
        if fields.is_empty() {
            return Ok(());
        }
        self.mark_paragraph()?;
        self.grouped(group, value, |inspector| {
            fields
                .iter()
                .try_for_each(|field| inspector.draw_member(*field, ty, value))
        })
    }

    /// Run `draw` directly, or inside a foldout when `group` is labelled.
    fn grouped<F>(&mut self, group: Option<&'static str>, value: &Handle, draw: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let Some(label) = group else {
            return draw(self);
        };
        let anchor = Anchor::object(value);
        match self.foldout(Some(&anchor), Some(ChildKey::Group(label)), false, label, None)? {
            Some(mut scope) => draw(&mut *scope),
            None => Ok(()),
        }
    }

    fn draw_member(&mut self, field: &'static FieldDesc, ty: &'static TypeDesc, value: &Handle) -> Result<()> {
        let current = match field.storage {
            Storage::Instance => read(value, ty.name)?.get(field.name),
            Storage::Static => ty.statics.and_then(|statics| statics.get(field.name)),
        };
        let Some(current) = current else {
            warn!(ty = ty.name, field = field.name, "declared field has no value");
            return self.labeled_text(field.name, &format!("unavailable ({})", field.ty.name()));
        };

        if field.constant {
            return self.labeled_text(field.name, &current.describe(&field.ty));
        }

        let edited = self.field_value(field.name, &field.ty, current, Some(ChildKey::Member(field.name)))?;
        match field.storage {
            Storage::Instance => write(value, ty.name)?.set(field.name, edited),
            Storage::Static => {
                if let Some(statics) = ty.statics {
                    statics.set(field.name, edited);
                }
            }
        }
        Ok(())
    }

    // ── lists ───────────────────────────────────────────────────

    fn list_field(&mut self, label: &str, ty: &FieldType, list: Option<ListHandle>, key: Option<ChildKey>) -> Result<Value> {
        let Some(list) = list else {
            self.null_field(label, ty)?;
            return Ok(Value::List(None));
        };

        let (element, len) = {
            let list = read_list(&list, label)?;
            (list.element_type(), list.len())
        };
        // Untyped lists have no foldout, so they never advance the cursor.
        let Some(element) = element else {
            self.labeled_text(label, &format!("{len} items (untyped)"))?;
            return Ok(Value::List(Some(list)));
        };

        let anchor = Anchor::list(&list);
        if let Some(mut scope) = self.foldout(Some(&anchor), key, false, label, None)? {
            scope.draw_list_body(label, &list, &element)?;
        }
        Ok(Value::List(Some(list)))
    }

    fn draw_list_body(&mut self, label: &str, list: &ListHandle, element: &FieldType) -> Result<()> {
        let (fixed, len) = {
            let list = read_list(list, label)?;
            (list.is_fixed_size(), list.len())
        };

        if fixed {
            self.labeled_text("Size", &len.to_string())?;
        } else {
            let requested = self.ui.edit_count("Size", len)?;
            if requested != len {
                resize_list(&mut *write_list(list, label)?, requested, element);
            }
        }

        let mut index = 0;
        loop {
            let current = read_list(list, label)?.get(index);
            let Some(current) = current else {
                break;
            };
            let edited = self.field_value(&format!("Element {index}"), element, current, Some(ChildKey::Element(index)))?;
            let mut elements = write_list(list, label)?;
            if !elements.is_read_only() {
                elements.set(index, edited);
            }
            index += 1;
        }
        Ok(())
    }
}

// ───────────────────────────────────────── borrows ───────────

fn read<'h>(value: &'h Handle, label: &str) -> Result<Ref<'h, dyn Inspect>> {
    value.try_borrow().map_err(|_| InspectError::Borrowed {
        label: label.to_string(),
    })
}

fn write<'h>(value: &'h Handle, label: &str) -> Result<RefMut<'h, dyn Inspect>> {
    value.try_borrow_mut().map_err(|_| InspectError::Borrowed {
        label: label.to_string(),
    })
}

fn read_list<'h>(list: &'h ListHandle, label: &str) -> Result<Ref<'h, dyn InspectList>> {
    list.try_borrow().map_err(|_| InspectError::Borrowed {
        label: label.to_string(),
    })
}

fn write_list<'h>(list: &'h ListHandle, label: &str) -> Result<RefMut<'h, dyn InspectList>> {
    list.try_borrow_mut().map_err(|_| InspectError::Borrowed {
        label: label.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::core::reflect::{handle, list_handle, ReadOnlyList, UntypedList};
    use crate::core::session::{ChildKeying, SessionSettings};
    use crate::core::reflect::StaticFields;
    use crate::core::testing::{Gauge, Link, Point, RecordingSurface, GAUGE_STATICS};
    use crate::core::value::IntKind;

    fn frame(session: &mut InspectorSession, ui: &mut RecordingSurface, label: &str, root: &Handle) -> Vec<String> {
        session.begin_frame();
        session.inspector(ui).show(label, Some(root)).unwrap();
        assert_eq!(session.open_depth(), 0);
        ui.take()
    }

    fn link(items: Vec<u8>) -> Handle {
        handle(Link {
            next: None,
            items: Some(list_handle(items)),
        })
    }

    #[fixture]
    fn session() -> InspectorSession {
        InspectorSession::default()
    }

    #[rstest]
    fn point_round_trip(mut session: InspectorSession) {
        let point = handle(Point { x: 5, y: 2.5 });
        let mut ui = RecordingSurface::default();

        assert_eq!(frame(&mut session, &mut ui, "Point", &point), vec!["> Point"]);

        ui.click("Point");
        ui.click("Public fields");
        assert_eq!(
            frame(&mut session, &mut ui, "Point", &point),
            vec![
                "v Point",
                "  --",
                "  _y = Float(2.5)",
                "  --",
                "  v Public fields",
                "    x = Int(5)",
            ]
        );

        ui.edit("x", Value::Int(12));
        frame(&mut session, &mut ui, "Point", &point);
        let lines = frame(&mut session, &mut ui, "Point", &point);
        assert_eq!(lines.last().map(String::as_str), Some("    x = Int(12)"));
        assert!(lines.contains(&"  _y = Float(2.5)".to_string()));
        assert!(matches!(point.borrow().get("_y"), Some(Value::Float(y)) if y == 2.5));
        assert_eq!(session.root_count(), 1);
    }

    #[test]
    fn constants_render_as_text_and_ignore_edits() {
        let gauge = handle(Gauge { level: 3 });
        let mut session = InspectorSession::default();
        let mut ui = RecordingSurface::default();
        ui.click("Gauge");
        ui.click("Static fields");
        ui.click("Public fields");
        ui.edit("LIMIT", Value::Int(1));
        ui.edit("_level", Value::Int(4));

        let lines = frame(&mut session, &mut ui, "Gauge", &gauge);
        assert_eq!(
            lines,
            vec![
                "v Gauge",
                "  --",
                "  _level = Int(4)",
                "  --",
                "  v Static fields",
                "    v Public fields",
                "      LIMIT: 100",
            ]
        );
        assert!(matches!(GAUGE_STATICS.get("LIMIT"), Some(Value::Int(100))));
        assert!(matches!(gauge.borrow().get("_level"), Some(Value::Int(4))));
    }

    #[test]
    fn wide_unsigned_elements_survive_a_pass() {
        let ty = FieldType::List(Some(&FieldType::Int(IntKind::U64)));
        let list = list_handle(vec![u64::MAX, 1 << 63, 7]);
        let mut session = InspectorSession::default();
        let mut ui = RecordingSurface::default();
        ui.click("wide");

        for _ in 0..2 {
            session.begin_frame();
            session
                .inspector(&mut ui)
                .field_value("wide", &ty, Value::List(Some(list.clone())), None)
                .unwrap();
        }
        let lines = ui.take();
        assert!(lines.contains(&"  Element 0 = Int(18446744073709551615)".to_string()));
        assert!(lines.contains(&"  Element 1 = Int(9223372036854775808)".to_string()));

        let stored: Vec<Value> = {
            let list = list.borrow();
            (0..list.len()).filter_map(|i| list.get(i)).collect()
        };
        let expected: [i128; 3] = [u64::MAX.into(), (1u64 << 63).into(), 7];
        assert_eq!(stored.len(), 3);
        for (value, want) in stored.iter().zip(expected) {
            assert!(matches!(value, Value::Int(n) if *n == want), "{value:?} != {want}");
        }
    }

    #[test]
    fn oversized_resize_is_capped() {
        let mut list: Vec<u8> = vec![1, 2];
        let ty = FieldType::Int(IntKind::U8);
        assert_eq!(resize_list(&mut list, MAX_LIST_LEN + 5, &ty), MAX_LIST_LEN);
        assert_eq!(list.len(), MAX_LIST_LEN);
        assert_eq!(resize_list(&mut list, usize::MAX, &ty), MAX_LIST_LEN);
        assert_eq!(resize_list(&mut list, 1, &ty), 1);
    }

    #[rstest]
    fn roots_are_keyed_by_identity(mut session: InspectorSession) {
        let a = handle(Point { x: 1, y: 0.0 });
        let b = handle(Point { x: 1, y: 0.0 });
        let mut ui = RecordingSurface::default();

        ui.click("Point");
        frame(&mut session, &mut ui, "Point", &a);
        assert_eq!(frame(&mut session, &mut ui, "Point", &b), vec!["> Point"]);
        assert_eq!(frame(&mut session, &mut ui, "Point", &a)[0], "v Point");
    }

    #[rstest]
    fn missing_root_is_an_error(mut session: InspectorSession) {
        let mut ui = RecordingSurface::default();
        let result = session.inspector(&mut ui).show("nothing", None);
        assert!(matches!(result, Err(InspectError::NullRoot)));
    }

    #[rstest]
    #[case::grow(2, 4, vec![1, 2, 0, 0])]
    #[case::shrink(3, 1, vec![1])]
    #[case::unchanged(2, 2, vec![1, 2])]
    fn list_size_edits(mut session: InspectorSession, #[case] initial: usize, #[case] requested: usize, #[case] expected: Vec<u8>) {
        let items: Vec<u8> = (1..=initial as u8).collect();
        let list = list_handle(items);
        let root = handle(Link {
            next: None,
            items: Some(list.clone()),
        });
        let mut ui = RecordingSurface::default();
        ui.click("Link");
        ui.click("Public fields");
        ui.click("items");
        frame(&mut session, &mut ui, "Link", &root);

        ui.resize("Size", requested);
        frame(&mut session, &mut ui, "Link", &root);

        let stored: Vec<Value> = {
            let list = list.borrow();
            (0..list.len()).filter_map(|i| list.get(i)).collect()
        };
        let stored: Vec<u8> = stored
            .into_iter()
            .filter_map(|v| match v {
                Value::Int(n) => Some(n as u8),
                _ => None,
            })
            .collect();
        assert_eq!(stored, expected);
    }

    #[test]
    fn fixed_and_read_only_lists() {
        let ty = FieldType::List(Some(&FieldType::Int(IntKind::U8)));
        let fixed = list_handle([7u8, 8]);
        let frozen = list_handle(ReadOnlyList(vec![1u8]));
        let mut session = InspectorSession::default();
        let mut ui = RecordingSurface::default();

        for (list, label) in [(&fixed, "fixed"), (&frozen, "frozen")] {
            ui.click(label);
            ui.edit("Element 0", Value::Int(99));
            session.begin_frame();
            let out = session
                .inspector(&mut ui)
                .field_value(label, &ty, Value::List(Some(list.clone())), None)
                .unwrap();
            assert!(matches!(out, Value::List(Some(_))));
        }
        let lines = ui.take();
        assert!(lines.contains(&"  Size: 2".to_string()));
        assert!(lines.contains(&"  Size: 1".to_string()));
        assert!(matches!(fixed.borrow().get(0), Some(Value::Int(99))));
        assert!(matches!(frozen.borrow().get(0), Some(Value::Int(1))));
    }

    #[test]
    fn untyped_lists_do_not_consume_a_slot() {
        let mut session = InspectorSession::default();
        let mut ui = RecordingSurface::default();
        let untyped = list_handle(UntypedList(vec![Value::Int(1), Value::Bool(true)]));
        let ty = FieldType::List(None);
        let owner = handle(Point { x: 0, y: 0.0 });
        let anchor = Anchor::object(&owner);
        let mut inspector = session.inspector(&mut ui);
        let mut scope = inspector.foldout(Some(&anchor), None, true, "root", None).unwrap().unwrap();
        scope.field_value("bag", &ty, Value::List(Some(untyped)), None).unwrap();
        drop(scope);
        assert_eq!(ui.take(), vec!["v root", "  bag: 2 items (untyped)"]);
    }

    #[test]
    fn null_values_render_as_null_rows() {
        let root = handle(Link { next: None, items: None });
        let mut session = InspectorSession::default();
        let mut ui = RecordingSurface::default();
        ui.click("Link");
        ui.click("Public fields");
        let lines = frame(&mut session, &mut ui, "Link", &root);
        assert!(lines.contains(&"    next: null (Link)".to_string()));
        assert!(lines.contains(&"    items: null (List<u8>)".to_string()));
    }

    #[test]
    fn cycles_render_without_deadlock() {
        let a = link(vec![]);
        let b = link(vec![]);
        a.borrow_mut().set("next", Value::Object(Some(b.clone())));
        b.borrow_mut().set("next", Value::Object(Some(a.clone())));

        let mut session = InspectorSession::default();
        let mut ui = RecordingSurface::default();
        ui.click("Link");
        ui.click("Public fields");
        let lines = frame(&mut session, &mut ui, "Link", &a);
        assert!(lines.contains(&"    > next (Link)".to_string()));

        ui.click("next (Link)");
        let lines = frame(&mut session, &mut ui, "Link", &a);
        assert!(lines.contains(&"    v next (Link)".to_string()));
        // Groups of the nested object start closed.
        assert!(lines.contains(&"      > Public fields".to_string()));

        a.borrow_mut().set("next", Value::Object(None));
    }

    #[test]
    fn surface_failure_unwinds_all_scopes() {
        let root = link(vec![1, 2, 3]);
        let mut session = InspectorSession::default();
        let mut ui = RecordingSurface::default();
        ui.click("Link");
        ui.click("Public fields");
        ui.click("items");
        frame(&mut session, &mut ui, "Link", &root);

        ui.fail_on("Element 1");
        session.begin_frame();
        let result = session.inspector(&mut ui).show("Link", Some(&root));
        assert!(matches!(result, Err(InspectError::Surface(_))));
        assert_eq!(session.open_depth(), 0);
        assert_eq!(session.indent(), 0);
        assert_eq!(ui.depth(), 0);
    }

    #[test]
    fn debug_view_requires_a_playing_live_target() {
        let target = handle(Point { x: 0, y: 0.0 });
        let mut session = InspectorSession::default();
        let mut ui = RecordingSurface::default();

        let stopped = HostState { playing: false };
        assert!(!draw_debug_view(&mut session, &mut ui, stopped, &target).unwrap());
        assert!(ui.take().is_empty());

        let playing = HostState { playing: true };
        assert!(draw_debug_view(&mut session, &mut ui, playing, &target).unwrap());
        assert_eq!(ui.take(), vec!["> Debug view"]);
    }

    #[test]
    fn structural_keys_follow_members_not_positions() {
        let mut session = InspectorSession::new(SessionSettings {
            keying: ChildKeying::Structural,
            evict_after: None,
        });
        let inner = link(vec![1]);
        let root = handle(Link {
            next: Some(inner.clone()),
            items: Some(list_handle(vec![5u8])),
        });
        let mut ui = RecordingSurface::default();
        ui.click("Link");
        ui.click("Public fields");
        ui.click("items");
        frame(&mut session, &mut ui, "Link", &root);

        // Dropping `next` shifts every later foldout up one position.
        root.borrow_mut().set("next", Value::Object(None));
        let lines = frame(&mut session, &mut ui, "Link", &root);
        assert!(lines.contains(&"    v items".to_string()));
    }

    #[test]
    fn positional_keys_follow_arrival_order() {
        let mut session = InspectorSession::default();
        let inner = link(vec![1]);
        let root = handle(Link {
            next: Some(inner),
            items: Some(list_handle(vec![5u8])),
        });
        let mut ui = RecordingSurface::default();
        ui.click("Link");
        ui.click("Public fields");
        ui.click("items");
        frame(&mut session, &mut ui, "Link", &root);

        root.borrow_mut().set("next", Value::Object(None));
        let lines = frame(&mut session, &mut ui, "Link", &root);
        // `next` is now a plain row; `items` arrives first and is unknown.
        assert!(lines.contains(&"    > items".to_string()));
    }

    #[test]
    fn resize_without_default_does_not_grow() {
        let mut list: Vec<Option<Handle>> = vec![None];
        assert_eq!(resize_list(&mut list, 3, &FieldType::Unsupported("Opaque")), 1);
        assert_eq!(resize_list(&mut list, 3, &FieldType::Object("object")), 3);
        assert_eq!(resize_list(&mut list, 0, &FieldType::Object("object")), 0);
    }

    proptest! {
        #[test]
        fn open_state_survives_value_changes(values in prop::collection::vec(prop::collection::vec(any::<u8>(), 3), 1..8)) {
            let list = list_handle(vec![0u8; 3]);
            let root = handle(Link { next: None, items: Some(list.clone()) });
            let mut session = InspectorSession::default();
            let mut ui = RecordingSurface::default();
            ui.click("Link");
            ui.click("Public fields");
            ui.click("items");
            frame(&mut session, &mut ui, "Link", &root);
            let nodes = session.node_count();

            for row in values {
                for (i, v) in row.into_iter().enumerate() {
                    list.borrow_mut().set(i, Value::Int(v.into()));
                }
                let lines = frame(&mut session, &mut ui, "Link", &root);
                prop_assert!(lines.contains(&"    v items".to_string()));
                prop_assert_eq!(session.node_count(), nodes);
            }
        }
    }
}
