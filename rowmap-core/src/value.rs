use rust_decimal::Decimal;
use std::fmt::{self, Display};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time,
    macros::{date, datetime},
};
use uuid::Uuid;

/// Static description of a fieldless enumeration, see [`crate::mapped_enum`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct EnumDef {
    /// Rust name of the enumeration.
    pub name: &'static str,
    /// Variant names with their discriminants, in declaration order.
    pub variants: &'static [(&'static str, i64)],
}

impl EnumDef {
    pub fn name_of(&self, discriminant: i64) -> Option<&'static str> {
        self.variants
            .iter()
            .find(|(_, d)| *d == discriminant)
            .map(|(n, _)| *n)
    }
    /// Case-insensitive lookup of a variant by name.
    pub fn discriminant_of(&self, name: &str) -> Option<i64> {
        self.variants
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, d)| *d)
    }
    pub fn contains(&self, discriminant: i64) -> bool {
        self.name_of(discriminant).is_some()
    }
}

/// Dynamically typed value moved between rows, objects and parameters.
///
/// Every variant but `Null` carries an `Option`: `None` is a typed null, it
/// keeps the declared type of the column or member it came from.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
    Enum(Option<i64>, &'static EnumDef),
}

/// Declared type of a column, member or parameter, the payload-free twin of [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Decimal,
    Varchar,
    Blob,
    Date,
    Time,
    Timestamp,
    TimestampWithTimezone,
    Uuid,
    Enum(&'static EnumDef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(v) => v.is_none(),
            Value::Int8(v) => v.is_none(),
            Value::Int16(v) => v.is_none(),
            Value::Int32(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::UInt8(v) => v.is_none(),
            Value::UInt16(v) => v.is_none(),
            Value::UInt32(v) => v.is_none(),
            Value::UInt64(v) => v.is_none(),
            Value::Float32(v) => v.is_none(),
            Value::Float64(v) => v.is_none(),
            Value::Decimal(v) => v.is_none(),
            Value::Varchar(v) => v.is_none(),
            Value::Blob(v) => v.is_none(),
            Value::Date(v) => v.is_none(),
            Value::Time(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::TimestampWithTimezone(v) => v.is_none(),
            Value::Uuid(v) => v.is_none(),
            Value::Enum(v, ..) => v.is_none(),
        }
    }

    /// The declared type, `None` only for the untyped `Value::Null`.
    pub fn value_type(&self) -> Option<ValueType> {
        Some(match self {
            Value::Null => return None,
            Value::Boolean(..) => ValueType::Boolean,
            Value::Int8(..) => ValueType::Int8,
            Value::Int16(..) => ValueType::Int16,
            Value::Int32(..) => ValueType::Int32,
            Value::Int64(..) => ValueType::Int64,
            Value::UInt8(..) => ValueType::UInt8,
            Value::UInt16(..) => ValueType::UInt16,
            Value::UInt32(..) => ValueType::UInt32,
            Value::UInt64(..) => ValueType::UInt64,
            Value::Float32(..) => ValueType::Float32,
            Value::Float64(..) => ValueType::Float64,
            Value::Decimal(..) => ValueType::Decimal,
            Value::Varchar(..) => ValueType::Varchar,
            Value::Blob(..) => ValueType::Blob,
            Value::Date(..) => ValueType::Date,
            Value::Time(..) => ValueType::Time,
            Value::Timestamp(..) => ValueType::Timestamp,
            Value::TimestampWithTimezone(..) => ValueType::TimestampWithTimezone,
            Value::Uuid(..) => ValueType::Uuid,
            Value::Enum(.., def) => ValueType::Enum(def),
        })
    }

    pub fn same_type(&self, other: &Self) -> bool {
        self.value_type() == other.value_type()
    }
}

impl ValueType {
    /// Typed null of this type.
    pub fn empty(&self) -> Value {
        match *self {
            ValueType::Boolean => Value::Boolean(None),
            ValueType::Int8 => Value::Int8(None),
            ValueType::Int16 => Value::Int16(None),
            ValueType::Int32 => Value::Int32(None),
            ValueType::Int64 => Value::Int64(None),
            ValueType::UInt8 => Value::UInt8(None),
            ValueType::UInt16 => Value::UInt16(None),
            ValueType::UInt32 => Value::UInt32(None),
            ValueType::UInt64 => Value::UInt64(None),
            ValueType::Float32 => Value::Float32(None),
            ValueType::Float64 => Value::Float64(None),
            ValueType::Decimal => Value::Decimal(None),
            ValueType::Varchar => Value::Varchar(None),
            ValueType::Blob => Value::Blob(None),
            ValueType::Date => Value::Date(None),
            ValueType::Time => Value::Time(None),
            ValueType::Timestamp => Value::Timestamp(None),
            ValueType::TimestampWithTimezone => Value::TimestampWithTimezone(None),
            ValueType::Uuid => Value::Uuid(None),
            ValueType::Enum(def) => Value::Enum(None, def),
        }
    }

    /// The value a non nullable member receives when the store returns NULL.
    pub fn zero(&self) -> Value {
        match *self {
            ValueType::Boolean => Value::Boolean(Some(false)),
            ValueType::Int8 => Value::Int8(Some(0)),
            ValueType::Int16 => Value::Int16(Some(0)),
            ValueType::Int32 => Value::Int32(Some(0)),
            ValueType::Int64 => Value::Int64(Some(0)),
            ValueType::UInt8 => Value::UInt8(Some(0)),
            ValueType::UInt16 => Value::UInt16(Some(0)),
            ValueType::UInt32 => Value::UInt32(Some(0)),
            ValueType::UInt64 => Value::UInt64(Some(0)),
            ValueType::Float32 => Value::Float32(Some(0.0)),
            ValueType::Float64 => Value::Float64(Some(0.0)),
            ValueType::Decimal => Value::Decimal(Some(Decimal::ZERO)),
            ValueType::Varchar => Value::Varchar(Some(String::new())),
            ValueType::Blob => Value::Blob(Some(Box::default())),
            ValueType::Date => Value::Date(Some(date!(0001-01-01))),
            ValueType::Time => Value::Time(Some(Time::MIDNIGHT)),
            ValueType::Timestamp => Value::Timestamp(Some(datetime!(0001-01-01 0:00))),
            ValueType::TimestampWithTimezone => {
                Value::TimestampWithTimezone(Some(datetime!(0001-01-01 0:00 UTC)))
            }
            ValueType::Uuid => Value::Uuid(Some(Uuid::nil())),
            ValueType::Enum(def) => Value::Enum(def.variants.first().map(|(_, d)| *d), def),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ValueType::Int8
                | ValueType::Int16
                | ValueType::Int32
                | ValueType::Int64
                | ValueType::UInt8
                | ValueType::UInt16
                | ValueType::UInt32
                | ValueType::UInt64
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer()
            || matches!(
                self,
                ValueType::Float32 | ValueType::Float64 | ValueType::Decimal
            )
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, ValueType::Enum(..))
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Enum(def) => write!(f, "Enum({})", def.name),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl Display for Value {
    /// Text form used when a value is converted to `Varchar`, `NULL` for nulls.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        macro_rules! display {
            ($v:expr) => {
                match $v {
                    Some(v) => write!(f, "{}", v),
                    None => f.write_str("NULL"),
                }
            };
        }
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Boolean(v) => display!(v),
            Value::Int8(v) => display!(v),
            Value::Int16(v) => display!(v),
            Value::Int32(v) => display!(v),
            Value::Int64(v) => display!(v),
            Value::UInt8(v) => display!(v),
            Value::UInt16(v) => display!(v),
            Value::UInt32(v) => display!(v),
            Value::UInt64(v) => display!(v),
            Value::Float32(v) => display!(v),
            Value::Float64(v) => display!(v),
            Value::Decimal(v) => display!(v),
            Value::Varchar(v) => display!(v),
            Value::Blob(Some(v)) => {
                for b in v.iter() {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            Value::Blob(None) => f.write_str("NULL"),
            Value::Date(v) => display!(v),
            Value::Time(v) => display!(v),
            Value::Timestamp(v) => display!(v),
            Value::TimestampWithTimezone(v) => display!(v),
            Value::Uuid(v) => display!(v),
            Value::Enum(Some(v), def) => match def.name_of(*v) {
                Some(name) => f.write_str(name),
                None => write!(f, "{}", v),
            },
            Value::Enum(None, ..) => f.write_str("NULL"),
        }
    }
}

