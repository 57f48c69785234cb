//! Member metadata and registration.
//!
//! Types opt into persistence by implementing [`Persistable`], whose
//! [`describe`](Persistable::describe) returns a [`TypeDescriptor`]: an ordered
//! table of members with their visibility, declared type, markers and
//! accessors. The table is the only source of type metadata; nothing here
//! inspects values at runtime to discover structure.
//!
//! # Example
//!
//! ```
//! use native_store::member::{Marker, Persistable, TypeDescriptor, Visibility};
//!
//! #[derive(Default)]
//! struct Account {
//!     name: String,
//!     cache: String,
//!     token: String,
//! }
//!
//! impl Persistable for Account {
//!     const TYPE_NAME: &'static str = "Account";
//!
//!     fn describe() -> TypeDescriptor<Self> {
//!         Self::descriptor()
//!             .field("name", Visibility::Public, |a| &a.name, |a, v| a.name = v)
//!             .field("cache", Visibility::Public, |a| &a.cache, |a, v| a.cache = v)
//!             .marked(Marker::Ignore)
//!             .field("token", Visibility::Private, |a| &a.token, |a, v| a.token = v)
//!             .marked(Marker::Encrypt)
//!     }
//! }
//!
//! assert_eq!(Account::describe().members().len(), 3);
//! ```

use crate::convert::{json_kind, ConvertContext};
use crate::errors::{AccessError, AccessorResult, ConversionError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Tag altering how a member is resolved or converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Persist the member even though it is not public.
    Include,
    /// Never persist the member. Wins over every other marker.
    Ignore,
    /// Encrypt the member's string value regardless of the class flag.
    /// Also makes a non-public member eligible.
    Encrypt,
}

impl Marker {
    const fn bit(self) -> u8 {
        match self {
            Marker::Include => 0b001,
            Marker::Ignore => 0b010,
            Marker::Encrypt => 0b100,
        }
    }
}

/// Set of markers attached to one member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerSet(u8);

impl MarkerSet {
    /// The empty set.
    pub const EMPTY: MarkerSet = MarkerSet(0);

    /// Returns a copy of this set with `marker` added.
    pub const fn with(self, marker: Marker) -> Self {
        MarkerSet(self.0 | marker.bit())
    }

    /// Whether `marker` is in the set.
    pub const fn contains(self, marker: Marker) -> bool {
        self.0 & marker.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<Marker> for MarkerSet {
    fn from_iter<I: IntoIterator<Item = Marker>>(iter: I) -> Self {
        iter.into_iter().fold(MarkerSet::EMPTY, MarkerSet::with)
    }
}

/// Visibility of a member on its owning type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// Whether a member is accessor-backed or direct storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Property,
    Field,
}

/// The static type a member declares, as far as conversion cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredType {
    /// Text; the only type eligible for encryption.
    Text,
    Boolean,
    Integer,
    Float,
    /// A list of scalars, carried as a JSON array.
    Sequence,
    /// A nested [`Persistable`] type, carried as a JSON object tree.
    Object(&'static str),
    /// A list of nested [`Persistable`] values, carried as an array of trees.
    ObjectList(&'static str),
}

impl DeclaredType {
    pub fn is_text(self) -> bool {
        matches!(self, DeclaredType::Text)
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Text => write!(f, "string"),
            DeclaredType::Boolean => write!(f, "boolean"),
            DeclaredType::Integer => write!(f, "integer"),
            DeclaredType::Float => write!(f, "float"),
            DeclaredType::Sequence => write!(f, "sequence"),
            DeclaredType::Object(name) => write!(f, "object {}", name),
            DeclaredType::ObjectList(name) => write!(f, "list of {}", name),
        }
    }
}

/// Value types a member can hold directly.
///
/// A JSON `null` coerces to `Default::default()`, so `Option<S>` members
/// become `None` and plain members fall back to their zero value.
pub trait Scalar: Serialize + DeserializeOwned + Default + 'static {
    const DECLARED: DeclaredType;

    /// Whether JSON can carry this value. Only non-finite floats cannot.
    fn is_representable(&self) -> bool {
        true
    }
}

macro_rules! impl_scalar {
    ($declared:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Scalar for $ty {
                const DECLARED: DeclaredType = $declared;
            }
        )+
    };
}

impl_scalar!(DeclaredType::Text => String);
impl_scalar!(DeclaredType::Boolean => bool);
impl_scalar!(DeclaredType::Integer => i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

impl Scalar for f32 {
    const DECLARED: DeclaredType = DeclaredType::Float;

    fn is_representable(&self) -> bool {
        self.is_finite()
    }
}

impl Scalar for f64 {
    const DECLARED: DeclaredType = DeclaredType::Float;

    fn is_representable(&self) -> bool {
        self.is_finite()
    }
}

impl<S: Scalar> Scalar for Option<S> {
    const DECLARED: DeclaredType = S::DECLARED;

    fn is_representable(&self) -> bool {
        self.as_ref().map_or(true, S::is_representable)
    }
}

impl<S: Scalar> Scalar for Vec<S> {
    const DECLARED: DeclaredType = DeclaredType::Sequence;

    fn is_representable(&self) -> bool {
        self.iter().all(S::is_representable)
    }
}

/// A type whose members can be resolved and converted.
pub trait Persistable: Sized + 'static {
    /// Name used in diagnostics and as the declared type of nested members.
    const TYPE_NAME: &'static str;

    /// Class-level encryption marker. Used as the class flag when a whole
    /// object is converted through [`StoreResolver::encode`](crate::StoreResolver::encode)
    /// or nested inside another object.
    const ENCRYPT_ALL: bool = false;

    /// Members of this type in declaration order.
    fn describe() -> TypeDescriptor<Self>;

    /// Empty descriptor named after [`TYPE_NAME`](Persistable::TYPE_NAME).
    fn descriptor() -> TypeDescriptor<Self> {
        TypeDescriptor::new(Self::TYPE_NAME)
    }
}

pub(crate) type ReadFn<T> =
    Arc<dyn Fn(&T, &ConvertContext<'_>) -> StoreResult<Value> + Send + Sync>;
pub(crate) type WriteFn<T> =
    Arc<dyn Fn(&mut T, Value, &ConvertContext<'_>) -> StoreResult<()> + Send + Sync>;

fn reader<T, F>(f: F) -> ReadFn<T>
where
    F: Fn(&T, &ConvertContext<'_>) -> StoreResult<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn writer<T, F>(f: F) -> WriteFn<T>
where
    F: Fn(&mut T, Value, &ConvertContext<'_>) -> StoreResult<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn to_transportable<V: Scalar>(
    type_name: &'static str,
    member: &'static str,
    value: &V,
) -> StoreResult<Value> {
    // serde_json writes NaN and infinities as null, which would read back as zero
    if !value.is_representable() {
        return Err(ConversionError::NotRepresentable {
            type_name,
            member,
            expected: V::DECLARED,
        }
        .into());
    }
    serde_json::to_value(value).map_err(|source| {
        ConversionError::TypeMismatch {
            type_name,
            member,
            expected: V::DECLARED,
            source,
        }
        .into()
    })
}

fn coerce<V: Scalar>(type_name: &'static str, member: &'static str, value: Value) -> StoreResult<V> {
    if value.is_null() {
        return Ok(V::default());
    }
    serde_json::from_value(value).map_err(|source| {
        ConversionError::TypeMismatch {
            type_name,
            member,
            expected: V::DECLARED,
            source,
        }
        .into()
    })
}

/// A named, typed slot on `T` with its accessors and markers.
pub struct Member<T> {
    name: &'static str,
    owner: &'static str,
    kind: MemberKind,
    visibility: Visibility,
    declared: DeclaredType,
    markers: MarkerSet,
    read: ReadFn<T>,
    write: Option<WriteFn<T>>,
}

impl<T> Member<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name of the type declaring this member.
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn declared_type(&self) -> DeclaredType {
        self.declared
    }

    pub fn markers(&self) -> MarkerSet {
        self.markers
    }

    pub fn has_marker(&self, marker: Marker) -> bool {
        self.markers.contains(marker)
    }

    /// False for read-only properties.
    pub fn is_writable(&self) -> bool {
        self.write.is_some()
    }

    pub(crate) fn read_raw(&self, instance: &T, ctx: &ConvertContext<'_>) -> StoreResult<Value> {
        (self.read)(instance, ctx)
    }

    pub(crate) fn write_raw(
        &self,
        instance: &mut T,
        value: Value,
        ctx: &ConvertContext<'_>,
    ) -> StoreResult<()> {
        match &self.write {
            Some(write) => write(instance, value, ctx),
            None => Err(AccessError::ReadOnly {
                type_name: self.owner,
                member: self.name,
            }
            .into()),
        }
    }
}

impl<T> Clone for Member<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            owner: self.owner,
            kind: self.kind,
            visibility: self.visibility,
            declared: self.declared,
            markers: self.markers,
            read: Arc::clone(&self.read),
            write: self.write.clone(),
        }
    }
}

impl<T> fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("kind", &self.kind)
            .field("visibility", &self.visibility)
            .field("declared", &self.declared)
            .field("markers", &self.markers)
            .field("writable", &self.write.is_some())
            .finish()
    }
}

/// Ordered registration table of a type's members.
///
/// Members are kept in the order they are declared. Builder methods append a
/// member; [`marked`](TypeDescriptor::marked) tags the member declared last.
pub struct TypeDescriptor<T> {
    type_name: &'static str,
    members: Vec<Member<T>>,
}

impl<T: 'static> TypeDescriptor<T> {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            members: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// All declared members, eligible or not, in declaration order.
    pub fn members(&self) -> &[Member<T>] {
        &self.members
    }

    pub fn into_members(self) -> Vec<Member<T>> {
        self.members
    }

    /// Declares a field: direct storage read by reference and assigned by value.
    pub fn field<V, G, S>(self, name: &'static str, visibility: Visibility, get: G, set: S) -> Self
    where
        V: Scalar,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let owner = self.type_name;
        let read = reader(move |instance: &T, _ctx| to_transportable(owner, name, get(instance)));
        let write = writer(move |instance: &mut T, value, _ctx| {
            set(instance, coerce::<V>(owner, name, value)?);
            Ok(())
        });
        self.push(MemberKind::Field, name, visibility, V::DECLARED, read, Some(write))
    }

    /// Declares a property whose getter and setter may fail.
    pub fn property<V, G, S>(self, name: &'static str, visibility: Visibility, get: G, set: S) -> Self
    where
        V: Scalar,
        G: Fn(&T) -> AccessorResult<V> + Send + Sync + 'static,
        S: Fn(&mut T, V) -> AccessorResult<()> + Send + Sync + 'static,
    {
        let owner = self.type_name;
        let read = reader(move |instance: &T, _ctx| {
            let value = get(instance).map_err(|source| AccessError::Getter {
                type_name: owner,
                member: name,
                source,
            })?;
            to_transportable(owner, name, &value)
        });
        let write = writer(move |instance: &mut T, value, _ctx| {
            let value = coerce::<V>(owner, name, value)?;
            set(instance, value).map_err(|source| AccessError::Setter {
                type_name: owner,
                member: name,
                source,
            })?;
            Ok(())
        });
        self.push(MemberKind::Property, name, visibility, V::DECLARED, read, Some(write))
    }

    /// Declares a property without a setter. Writing it fails with
    /// [`AccessError::ReadOnly`].
    pub fn read_only_property<V, G>(self, name: &'static str, visibility: Visibility, get: G) -> Self
    where
        V: Scalar,
        G: Fn(&T) -> AccessorResult<V> + Send + Sync + 'static,
    {
        let owner = self.type_name;
        let read = reader(move |instance: &T, _ctx| {
            let value = get(instance).map_err(|source| AccessError::Getter {
                type_name: owner,
                member: name,
                source,
            })?;
            to_transportable(owner, name, &value)
        });
        self.push(MemberKind::Property, name, visibility, V::DECLARED, read, None)
    }

    /// Declares a field holding an optional nested [`Persistable`] object.
    ///
    /// The nested object is converted with its own descriptor, using
    /// `U::ENCRYPT_ALL` as its class flag.
    pub fn nested_field<U, G, S>(self, name: &'static str, visibility: Visibility, get: G, set: S) -> Self
    where
        U: Persistable + Default,
        G: Fn(&T) -> &Option<U> + Send + Sync + 'static,
        S: Fn(&mut T, Option<U>) + Send + Sync + 'static,
    {
        let read = reader(move |instance: &T, ctx| match get(instance) {
            Some(nested) => ctx.encode_nested(nested),
            None => Ok(Value::Null),
        });
        let write = writer(move |instance: &mut T, value: Value, ctx| {
            if value.is_null() {
                set(instance, None);
            } else {
                set(instance, Some(ctx.decode_nested::<U>(&value)?));
            }
            Ok(())
        });
        self.push(
            MemberKind::Field,
            name,
            visibility,
            DeclaredType::Object(U::TYPE_NAME),
            read,
            Some(write),
        )
    }

    /// Declares a field holding a nested object directly. A `null` in the
    /// tree assigns `U::default()`, like scalar members.
    pub fn embedded_field<U, G, S>(self, name: &'static str, visibility: Visibility, get: G, set: S) -> Self
    where
        U: Persistable + Default,
        G: Fn(&T) -> &U + Send + Sync + 'static,
        S: Fn(&mut T, U) + Send + Sync + 'static,
    {
        let read = reader(move |instance: &T, ctx| ctx.encode_nested(get(instance)));
        let write = writer(move |instance: &mut T, value: Value, ctx| {
            let nested = if value.is_null() {
                U::default()
            } else {
                ctx.decode_nested::<U>(&value)?
            };
            set(instance, nested);
            Ok(())
        });
        self.push(
            MemberKind::Field,
            name,
            visibility,
            DeclaredType::Object(U::TYPE_NAME),
            read,
            Some(write),
        )
    }

    /// Declares a property holding an optional nested object, with fallible
    /// accessors like [`property`](TypeDescriptor::property).
    pub fn nested_property<U, G, S>(self, name: &'static str, visibility: Visibility, get: G, set: S) -> Self
    where
        U: Persistable + Default,
        G: Fn(&T) -> AccessorResult<Option<U>> + Send + Sync + 'static,
        S: Fn(&mut T, Option<U>) -> AccessorResult<()> + Send + Sync + 'static,
    {
        let owner = self.type_name;
        let read = reader(move |instance: &T, ctx| {
            let nested = get(instance).map_err(|source| AccessError::Getter {
                type_name: owner,
                member: name,
                source,
            })?;
            match nested {
                Some(nested) => ctx.encode_nested(&nested),
                None => Ok(Value::Null),
            }
        });
        let write = writer(move |instance: &mut T, value: Value, ctx| {
            let nested = if value.is_null() {
                None
            } else {
                Some(ctx.decode_nested::<U>(&value)?)
            };
            set(instance, nested).map_err(|source| AccessError::Setter {
                type_name: owner,
                member: name,
                source,
            })?;
            Ok(())
        });
        self.push(
            MemberKind::Property,
            name,
            visibility,
            DeclaredType::Object(U::TYPE_NAME),
            read,
            Some(write),
        )
    }

    /// Declares a field holding a list of nested objects, each converted with
    /// its own descriptor. A `null` in the tree assigns an empty list.
    pub fn nested_list_field<U, G, S>(self, name: &'static str, visibility: Visibility, get: G, set: S) -> Self
    where
        U: Persistable + Default,
        G: Fn(&T) -> &Vec<U> + Send + Sync + 'static,
        S: Fn(&mut T, Vec<U>) + Send + Sync + 'static,
    {
        let owner = self.type_name;
        let read = reader(move |instance: &T, ctx| {
            let trees = get(instance)
                .iter()
                .map(|nested| ctx.encode_nested(nested))
                .collect::<StoreResult<Vec<_>>>()?;
            Ok(Value::Array(trees))
        });
        let write = writer(move |instance: &mut T, value: Value, ctx| {
            let items = match &value {
                Value::Null => Vec::new(),
                Value::Array(trees) => trees
                    .iter()
                    .map(|tree| ctx.decode_nested::<U>(tree))
                    .collect::<StoreResult<Vec<_>>>()?,
                other => {
                    return Err(ConversionError::MalformedList {
                        type_name: owner,
                        member: name,
                        found: json_kind(other),
                    }
                    .into())
                }
            };
            set(instance, items);
            Ok(())
        });
        self.push(
            MemberKind::Field,
            name,
            visibility,
            DeclaredType::ObjectList(U::TYPE_NAME),
            read,
            Some(write),
        )
    }

    /// Adds `marker` to the most recently declared member.
    pub fn marked(mut self, marker: Marker) -> Self {
        if let Some(last) = self.members.last_mut() {
            last.markers = last.markers.with(marker);
        }
        self
    }

    fn push(
        mut self,
        kind: MemberKind,
        name: &'static str,
        visibility: Visibility,
        declared: DeclaredType,
        read: ReadFn<T>,
        write: Option<WriteFn<T>>,
    ) -> Self {
        self.members.push(Member {
            name,
            owner: self.type_name,
            kind,
            visibility,
            declared,
            markers: MarkerSet::EMPTY,
            read,
            write,
        });
        self
    }
}

impl<T> fmt::Debug for TypeDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("members", &self.members)
            .finish()
    }
}
