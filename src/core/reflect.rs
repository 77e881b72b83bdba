//! Introspection surface for live objects.
//!
//! Objects are shared handles (`Rc<RefCell<dyn Inspect>>`) so the graph may
//! contain cycles and the same object may be reachable from several fields.
//! Each concrete type publishes a static [`TypeDesc`] listing the fields
//! declared at its own level; inheritance is modelled by embedding the base
//! value and pointing [`TypeDesc::base`] at the base's descriptor.

use std::cell::RefCell;
use std::ptr;
use std::rc::{Rc, Weak};

use super::value::{FieldType, FloatKind, IntKind, Value};

pub type Handle = Rc<RefCell<dyn Inspect>>;
pub type ListHandle = Rc<RefCell<dyn InspectList>>;

/// Wrap a value into a shared object handle.
pub fn handle<T: Inspect>(value: T) -> Handle {
    Rc::new(RefCell::new(value))
}

/// Wrap a list into a shared list handle.
pub fn list_handle<L: InspectList>(list: L) -> ListHandle {
    Rc::new(RefCell::new(list))
}

/// Identity of a handle: the address of its allocation.
pub fn handle_id(handle: &Handle) -> usize {
    Rc::as_ptr(handle).cast::<()>() as usize
}

pub fn list_id(list: &ListHandle) -> usize {
    Rc::as_ptr(list).cast::<()>() as usize
}

// ───────────────────────────────────────── descriptors ───────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
    Instance,
    Static,
}

/// One field declared at a single type level.
#[derive(Debug, Clone, Copy)]
pub struct FieldDesc {
    pub name: &'static str,
    pub ty: FieldType,
    pub visibility: Visibility,
    pub storage: Storage,
    /// Compile-time constant: always shown, never written back.
    pub constant: bool,
}

impl FieldDesc {
    pub const fn public(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            visibility: Visibility::Public,
            storage: Storage::Instance,
            constant: false,
        }
    }

    pub const fn private(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            visibility: Visibility::Private,
            storage: Storage::Instance,
            constant: false,
        }
    }

    /// Move the field to type-level storage.
    pub const fn shared(self) -> Self {
        Self {
            storage: Storage::Static,
            ..self
        }
    }

    pub const fn constant(self) -> Self {
        Self {
            storage: Storage::Static,
            constant: true,
            ..self
        }
    }
}

/// Accessor for fields stored at type level rather than per instance.
pub trait StaticFields: Sync {
    fn get(&self, name: &str) -> Option<Value>;
    fn set(&self, name: &str, value: Value);
}

/// Static description of one type level.
pub struct TypeDesc {
    pub name: &'static str,
    pub base: Option<&'static TypeDesc>,
    /// Fields declared at this level only, in declaration order.
    pub fields: &'static [FieldDesc],
    pub statics: Option<&'static dyn StaticFields>,
}

impl TypeDesc {
    /// Public fields matching `storage` as the host reports them for this
    /// level: its own plus everything public inherited from the base chain.
    fn visible_public(&'static self, storage: Storage) -> Vec<&'static FieldDesc> {
        let mut out = Vec::new();
        let mut level = Some(self);
        while let Some(ty) = level {
            out.extend(
                ty.fields
                    .iter()
                    .filter(|f| f.visibility == Visibility::Public && f.storage == storage),
            );
            level = ty.base;
        }
        out
    }

    /// First instance field name declared on more than one level of the
    /// chain.  [`Inspect::get`] cannot tell such fields apart.
    pub fn shadowed_field(&'static self) -> Option<&'static str> {
        let mut seen: Vec<&'static str> = Vec::new();
        let mut level = Some(self);
        while let Some(ty) = level {
            for field in ty.fields.iter().filter(|f| f.storage == Storage::Instance) {
                if seen.contains(&field.name) {
                    return Some(field.name);
                }
                seen.push(field.name);
            }
            level = ty.base;
        }
        None
    }
}

impl std::fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDesc")
            .field("name", &self.name)
            .field("base", &self.base.map(|b| b.name))
            .field("fields", &self.fields.len())
            .finish()
    }
}

// ───────────────────────────────────────── member enumerator ──

/// Fields to render for one type level, split by visibility.
#[derive(Debug, Default)]
pub struct Members {
    pub private: Vec<&'static FieldDesc>,
    pub public: Vec<&'static FieldDesc>,
}

impl Members {
    pub fn is_empty(&self) -> bool {
        self.private.is_empty() && self.public.is_empty()
    }
}

/// Enumerate the members of `ty` for one storage class.
///
/// Public fields already visible on any base level are removed so that each
/// inherited public field is listed once, at the level that declares it.
/// Order follows declaration order.
pub fn members_of(ty: &'static TypeDesc, storage: Storage) -> Members {
    let private = ty
        .fields
        .iter()
        .filter(|f| f.visibility == Visibility::Private && f.storage == storage)
        .collect();

    let mut public = ty.visible_public(storage);
    let mut base = ty.base;
    while let Some(level) = base {
        let inherited = level.visible_public(storage);
        public.retain(|f| !inherited.iter().any(|b| ptr::eq(*b, *f)));
        base = level.base;
    }

    Members { private, public }
}

// ───────────────────────────────────────── objects ───────────

/// A live object the inspector can walk.
///
/// `get`/`set` answer for every instance field in the type chain; derived
/// types delegate names they do not own to their embedded base.
///
/// Lookup is by name alone, so instance field names must be unique across
/// the whole chain.  A derived field reusing a base name hides the base one:
/// both rows read and write the derived value.  The object renderer logs a
/// warning for such types (see [`TypeDesc::shadowed_field`]).
pub trait Inspect: 'static {
    fn type_desc(&self) -> &'static TypeDesc;

    fn get(&self, name: &str) -> Option<Value>;

    fn set(&mut self, name: &str, value: Value);

    /// Saved assets are not live instances and get no debug view.
    fn is_persistent(&self) -> bool {
        false
    }
}

// ───────────────────────────────────────── lists ─────────────

/// A growable (or fixed-size) sequence of values.
pub trait InspectList: 'static {
    /// Declared element type; `None` for untyped lists.
    fn element_type(&self) -> Option<FieldType>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_fixed_size(&self) -> bool {
        false
    }

    fn is_read_only(&self) -> bool {
        false
    }

    fn get(&self, index: usize) -> Option<Value>;

    fn set(&mut self, index: usize, value: Value);

    fn truncate(&mut self, len: usize);

    fn push(&mut self, value: Value);
}

/// Conversion between a Rust element type and [`Value`].
pub trait Element: Clone + 'static {
    const TYPE: FieldType;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! int_element {
    ($($t:ty => $kind:ident),* $(,)?) => {$(
        impl Element for $t {
            const TYPE: FieldType = FieldType::Int(IntKind::$kind);

            fn to_value(&self) -> Value {
                Value::Int((*self).into())
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::Int(n) => Some(IntKind::$kind.clamp(n) as $t),
                    _ => None,
                }
            }
        }
    )*};
}

int_element!(i8 => I8, u8 => U8, i16 => I16, u16 => U16, i32 => I32, u32 => U32, i64 => I64, u64 => U64);

impl Element for f32 {
    const TYPE: FieldType = FieldType::Float(FloatKind::F32);

    fn to_value(&self) -> Value {
        Value::Float(*self as f64)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(FloatKind::F32.narrow(f) as f32),
            _ => None,
        }
    }
}

impl Element for f64 {
    const TYPE: FieldType = FieldType::Float(FloatKind::F64);

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(f),
            _ => None,
        }
    }
}

impl Element for bool {
    const TYPE: FieldType = FieldType::Bool;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl Element for String {
    const TYPE: FieldType = FieldType::Text;

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Element for Option<Handle> {
    const TYPE: FieldType = FieldType::Object("object");

    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl<T: Element> InspectList for Vec<T> {
    fn element_type(&self) -> Option<FieldType> {
        Some(T::TYPE)
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<Value> {
        self.as_slice().get(index).map(Element::to_value)
    }

    fn set(&mut self, index: usize, value: Value) {
        if let (Some(slot), Some(v)) = (self.get_mut(index), T::from_value(value)) {
            *slot = v;
        }
    }

    fn truncate(&mut self, len: usize) {
        Vec::truncate(self, len);
    }

    fn push(&mut self, value: Value) {
        if let Some(v) = T::from_value(value) {
            Vec::push(self, v);
        }
    }
}

impl<T: Element, const N: usize> InspectList for [T; N] {
    fn element_type(&self) -> Option<FieldType> {
        Some(T::TYPE)
    }

    fn len(&self) -> usize {
        N
    }

    fn is_fixed_size(&self) -> bool {
        true
    }

    fn get(&self, index: usize) -> Option<Value> {
        self.as_slice().get(index).map(Element::to_value)
    }

    fn set(&mut self, index: usize, value: Value) {
        if let (Some(slot), Some(v)) = (self.get_mut(index), T::from_value(value)) {
            *slot = v;
        }
    }

    fn truncate(&mut self, _len: usize) {}

    fn push(&mut self, _value: Value) {}
}

/// Fixed-size view that rejects element writes.
#[derive(Debug, Clone, Default)]
pub struct ReadOnlyList<T>(pub Vec<T>);

impl<T: Element> InspectList for ReadOnlyList<T> {
    fn element_type(&self) -> Option<FieldType> {
        Some(T::TYPE)
    }

    fn len(&self) -> usize {
        Vec::len(&self.0)
    }

    fn is_fixed_size(&self) -> bool {
        true
    }

    fn is_read_only(&self) -> bool {
        true
    }

    fn get(&self, index: usize) -> Option<Value> {
        self.0.as_slice().get(index).map(Element::to_value)
    }

    fn set(&mut self, _index: usize, _value: Value) {}

    fn truncate(&mut self, _len: usize) {}

    fn push(&mut self, _value: Value) {}
}

/// Heterogeneous list with no declared element type.
#[derive(Debug, Clone, Default)]
pub struct UntypedList(pub Vec<Value>);

impl InspectList for UntypedList {
    fn element_type(&self) -> Option<FieldType> {
        None
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn get(&self, index: usize) -> Option<Value> {
        self.0.get(index).cloned()
    }

    fn set(&mut self, index: usize, value: Value) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = value;
        }
    }

    fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    fn push(&mut self, value: Value) {
        self.0.push(value);
    }
}

// ───────────────────────────────────────── liveness ──────────

/// Weak back-reference used to detect that a keyed root has been dropped
/// (and its address possibly reused by a new allocation).
#[derive(Clone)]
pub enum Liveness {
    Object(Weak<RefCell<dyn Inspect>>),
    List(Weak<RefCell<dyn InspectList>>),
}

impl Liveness {
    pub fn is_alive(&self) -> bool {
        match self {
            Liveness::Object(weak) => weak.strong_count() > 0,
            Liveness::List(weak) => weak.strong_count() > 0,
        }
    }
}

impl std::fmt::Debug for Liveness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Liveness(alive = {})", self.is_alive())
    }
}

/// Identity key for a top-level foldout.
#[derive(Debug, Clone)]
pub struct Anchor {
    pub id: usize,
    pub liveness: Liveness,
}

impl Anchor {
    pub fn object(handle: &Handle) -> Self {
        Self {
            id: handle_id(handle),
            liveness: Liveness::Object(Rc::downgrade(handle)),
        }
    }

    pub fn list(list: &ListHandle) -> Self {
        Self {
            id: list_id(list),
            liveness: Liveness::List(Rc::downgrade(list)),
        }
    }
}
