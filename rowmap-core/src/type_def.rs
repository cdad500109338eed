use crate::{AsValue, Context, Error, Result, Value, ValueType};
use rust_decimal::Decimal;
use std::{
    fmt::{self, Debug},
    mem,
};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// A type the mapper can produce from rows or read parameters from.
///
/// Implemented by `#[derive(Mapped)]` for structs, by [`crate::mapped_enum`]
/// for fieldless enumerations and here for the scalar types.
pub trait Mapped: Sized + 'static {
    fn type_def() -> TypeDef<Self>;
}

/// Metadata describing how to build and inspect `T`.
pub enum TypeDef<T> {
    /// Directly convertible from a single field.
    Scalar(ScalarDef<T>),
    /// Built through constructors and members.
    Entity(EntityDef<T>),
}

impl<T: AsValue> TypeDef<T> {
    pub fn scalar() -> Self {
        TypeDef::Scalar(ScalarDef {
            value_type: T::value_type(),
            nullable: T::nullable(),
            from_value: T::try_from_value,
        })
    }
}

impl<T> TypeDef<T> {
    pub fn name(&self) -> &'static str {
        match self {
            TypeDef::Scalar(..) => std::any::type_name::<T>(),
            TypeDef::Entity(def) => def.name,
        }
    }
    pub fn is_scalar(&self) -> bool {
        matches!(self, TypeDef::Scalar(..))
    }
}

pub struct ScalarDef<T> {
    pub value_type: ValueType,
    pub nullable: bool,
    pub from_value: fn(Value) -> Result<T>,
}

pub struct EntityDef<T> {
    pub name: &'static str,
    /// In declaration order, the order breaks ties between constructors.
    pub constructors: Vec<ConstructorDef<T>>,
    pub members: Vec<MemberDef<T>>,
}

impl<T> EntityDef<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            constructors: Vec::new(),
            members: Vec::new(),
        }
    }
    pub fn constructor(mut self, constructor: ConstructorDef<T>) -> Self {
        self.constructors.push(constructor);
        self
    }
    pub fn member(mut self, member: MemberDef<T>) -> Self {
        self.members.push(member);
        self
    }
    /// Member by raw name, case-insensitive.
    pub fn member_named(&self, name: &str) -> Option<(usize, &MemberDef<T>)> {
        self.members
            .iter()
            .enumerate()
            .find(|(_, m)| m.name.eq_ignore_ascii_case(name))
    }
}

pub struct ConstructorDef<T> {
    pub name: &'static str,
    pub params: Vec<ParamDef>,
    /// Receives the arguments in `params` order.
    pub build: fn(&mut Args) -> Result<T>,
}

impl<T> ConstructorDef<T> {
    pub fn new(name: &'static str, params: Vec<ParamDef>, build: fn(&mut Args) -> Result<T>) -> Self {
        Self {
            name,
            params,
            build,
        }
    }
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl<T> Debug for ConstructorDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDef")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamDef {
    pub name: &'static str,
    pub value_type: ValueType,
    pub nullable: bool,
}

impl ParamDef {
    pub fn of<V: AsValue>(name: &'static str) -> Self {
        Self {
            name,
            value_type: V::value_type(),
            nullable: V::nullable(),
        }
    }
}

pub struct MemberDef<T> {
    /// Name of the member in the Rust type.
    pub name: &'static str,
    /// Name of the store field when it differs from `name`.
    pub mapped_name: Option<&'static str>,
    pub value_type: ValueType,
    pub nullable: bool,
    pub get: fn(&T) -> Value,
    /// `None` for read-only members.
    pub set: Option<fn(&mut T, Value) -> Result<()>>,
}

impl<T> MemberDef<T> {
    /// Read-only member, add a setter with [`MemberDef::with_setter`].
    pub fn new<V: AsValue>(name: &'static str, get: fn(&T) -> Value) -> Self {
        Self {
            name,
            mapped_name: None,
            value_type: V::value_type(),
            nullable: V::nullable(),
            get,
            set: None,
        }
    }
    pub fn mapped(mut self, mapped_name: &'static str) -> Self {
        self.mapped_name = Some(mapped_name);
        self
    }
    pub fn with_setter(mut self, set: fn(&mut T, Value) -> Result<()>) -> Self {
        self.set = Some(set);
        self
    }
    /// The store field name this member maps to.
    pub fn field_name(&self) -> &'static str {
        self.mapped_name.unwrap_or(self.name)
    }
    pub fn is_writable(&self) -> bool {
        self.set.is_some()
    }
}

impl<T> Debug for MemberDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDef")
            .field("name", &self.name)
            .field("mapped_name", &self.mapped_name)
            .field("value_type", &self.value_type)
            .field("nullable", &self.nullable)
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// Constructor arguments, produced by a compiled routine.
#[derive(Default, Debug)]
pub struct Args {
    values: Vec<Value>,
}

impl Args {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    /// Moves the argument at `index` out and converts it.
    pub fn take<V: AsValue>(&mut self, index: usize) -> Result<V> {
        let value = self
            .values
            .get_mut(index)
            .map(mem::take)
            .ok_or_else(|| Error::msg(format!("Missing constructor argument {index}")))?;
        V::try_from_value(value).with_context(|| format!("While reading constructor argument {index}"))
    }
}

macro_rules! impl_mapped_scalar {
    ($($source:ty),+ $(,)?) => {
        $(
            impl Mapped for $source {
                fn type_def() -> TypeDef<Self> {
                    TypeDef::scalar()
                }
            }
        )+
    };
}
impl_mapped_scalar!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    Decimal,
    String,
    Box<[u8]>,
    Vec<u8>,
    Date,
    Time,
    PrimitiveDateTime,
    OffsetDateTime,
    Uuid,
);

impl<T: AsValue + 'static> Mapped for Option<T> {
    fn type_def() -> TypeDef<Self> {
        TypeDef::scalar()
    }
}
