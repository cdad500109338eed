use crate::{EnumDef, Error, Result, Value, ValueType};
use rust_decimal::Decimal;
use std::any;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// Every member, constructor parameter and scalar target goes through this
/// trait: `value_type` and `nullable` are read once while a routine is
/// planned, `as_value` and `try_from_value` run for every row.
///
/// `try_from_value` accepts the canonical variant directly and otherwise
/// falls back to the checked [`Value::convert`], so a value handler may return
/// any compatible variant.
///
/// # Examples
/// ```rust
/// use rowmap_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i64 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// Declared type, used as the member type in shape analysis.
    fn value_type() -> ValueType;
    /// Whether NULL is a legal value, `true` for `Option<T>`.
    fn nullable() -> bool {
        false
    }
    /// Typed NULL of this type.
    fn as_empty_value() -> Value {
        Self::value_type().empty()
    }
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&'static str> for Value {
    fn from(value: &'static str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

fn null_error<T>() -> Error {
    Error::msg(format!(
        "Cannot convert NULL to {}, use Option<{}> for nullable values",
        any::type_name::<T>(),
        any::type_name::<T>(),
    ))
}

macro_rules! impl_as_value {
    ($source:ty, $variant:ident) => {
        impl AsValue for $source {
            fn value_type() -> ValueType {
                ValueType::$variant
            }
            fn as_value(self) -> Value {
                Value::$variant(Some(self.into()))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(Some(v)) => Ok(v.into()),
                    v if v.is_null() => Err(null_error::<Self>()),
                    v => match v.convert(ValueType::$variant)? {
                        Value::$variant(Some(v)) => Ok(v.into()),
                        v => Err(Error::msg(format!(
                            "Cannot convert {v:?} to {}",
                            any::type_name::<Self>(),
                        ))),
                    },
                }
            }
        }
    };
}
impl_as_value!(bool, Boolean);
impl_as_value!(i8, Int8);
impl_as_value!(i16, Int16);
impl_as_value!(i32, Int32);
impl_as_value!(i64, Int64);
impl_as_value!(u8, UInt8);
impl_as_value!(u16, UInt16);
impl_as_value!(u32, UInt32);
impl_as_value!(u64, UInt64);
impl_as_value!(f32, Float32);
impl_as_value!(f64, Float64);
impl_as_value!(Decimal, Decimal);
impl_as_value!(String, Varchar);
impl_as_value!(Box<[u8]>, Blob);
impl_as_value!(Vec<u8>, Blob);
impl_as_value!(Date, Date);
impl_as_value!(Time, Time);
impl_as_value!(PrimitiveDateTime, Timestamp);
impl_as_value!(OffsetDateTime, TimestampWithTimezone);
impl_as_value!(Uuid, Uuid);

impl<T: AsValue> AsValue for Option<T> {
    fn value_type() -> ValueType {
        T::value_type()
    }
    fn nullable() -> bool {
        true
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(if value.is_null() {
            None
        } else {
            Some(<T as AsValue>::try_from_value(value)?)
        })
    }
}

impl<T: AsValue> AsValue for Box<T> {
    fn value_type() -> ValueType {
        T::value_type()
    }
    fn nullable() -> bool {
        T::nullable()
    }
    fn as_value(self) -> Value {
        (*self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(Self::new(<T as AsValue>::try_from_value(value)?))
    }
}

/// Fieldless enumeration that can be stored by name or by discriminant.
///
/// Implemented by [`crate::mapped_enum`], which also implements [`AsValue`]
/// and [`crate::Mapped`] on top of it.
pub trait MappedEnum: Sized {
    fn enum_def() -> &'static EnumDef;
    fn from_discriminant(discriminant: i64) -> Option<Self>;
    fn discriminant(&self) -> i64;
}

/// Conversion of a [`MappedEnum`] out of a [`Value`]: accepts the enumeration
/// itself, its variant name (case-insensitive) or a defined discriminant.
pub fn enum_from_value<E: MappedEnum>(value: Value) -> Result<E> {
    if value.is_null() {
        return Err(null_error::<E>());
    }
    let def = E::enum_def();
    let Value::Enum(Some(discriminant), ..) = value.convert(ValueType::Enum(def))? else {
        return Err(Error::msg(format!(
            "Cannot convert to {}",
            any::type_name::<E>()
        )));
    };
    E::from_discriminant(discriminant).ok_or_else(|| {
        Error::msg(format!(
            "Value {discriminant} is not a variant of {}",
            def.name
        ))
    })
}

/// Makes a fieldless enumeration mappable as a scalar value.
///
/// ```rust
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Status {
///     Active = 1,
///     Disabled = 2,
/// }
/// rowmap_core::mapped_enum!(Status { Active, Disabled });
///
/// use rowmap_core::AsValue;
/// assert_eq!(Status::try_from_value("disabled".into()).unwrap(), Status::Disabled);
/// ```
#[macro_export]
macro_rules! mapped_enum {
    ($name:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::MappedEnum for $name {
            fn enum_def() -> &'static $crate::EnumDef {
                static DEF: $crate::EnumDef = $crate::EnumDef {
                    name: stringify!($name),
                    variants: &[$((stringify!($variant), $name::$variant as i64)),+],
                };
                &DEF
            }
            fn from_discriminant(discriminant: i64) -> Option<Self> {
                $(
                    if discriminant == $name::$variant as i64 {
                        return Some($name::$variant);
                    }
                )+
                None
            }
            fn discriminant(&self) -> i64 {
                match self {
                    $($name::$variant => $name::$variant as i64,)+
                }
            }
        }
        impl $crate::AsValue for $name {
            fn value_type() -> $crate::ValueType {
                $crate::ValueType::Enum(<Self as $crate::MappedEnum>::enum_def())
            }
            fn as_value(self) -> $crate::Value {
                $crate::Value::Enum(
                    Some($crate::MappedEnum::discriminant(&self)),
                    <Self as $crate::MappedEnum>::enum_def(),
                )
            }
            fn try_from_value(value: $crate::Value) -> $crate::Result<Self> {
                $crate::enum_from_value::<Self>(value)
            }
        }
        impl $crate::Mapped for $name {
            fn type_def() -> $crate::TypeDef<Self> {
                $crate::TypeDef::scalar()
            }
        }
    };
}
