use crate::{Error, Result, ValueType};
use std::{
    fmt::{self, Display},
    str::FromStr,
};

/// Native value-type tag understood by the store's parameter mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageType {
    AnsiString,
    Binary,
    Boolean,
    Byte,
    Currency,
    Date,
    DateTime,
    DateTime2,
    DateTimeOffset,
    Decimal,
    Double,
    Guid,
    Int16,
    Int32,
    Int64,
    Object,
    SByte,
    Single,
    String,
    Time,
    UInt16,
    UInt32,
    UInt64,
}

const NAMES: &[(StorageType, &str)] = &[
    (StorageType::AnsiString, "AnsiString"),
    (StorageType::Binary, "Binary"),
    (StorageType::Boolean, "Boolean"),
    (StorageType::Byte, "Byte"),
    (StorageType::Currency, "Currency"),
    (StorageType::Date, "Date"),
    (StorageType::DateTime, "DateTime"),
    (StorageType::DateTime2, "DateTime2"),
    (StorageType::DateTimeOffset, "DateTimeOffset"),
    (StorageType::Decimal, "Decimal"),
    (StorageType::Double, "Double"),
    (StorageType::Guid, "Guid"),
    (StorageType::Int16, "Int16"),
    (StorageType::Int32, "Int32"),
    (StorageType::Int64, "Int64"),
    (StorageType::Object, "Object"),
    (StorageType::SByte, "SByte"),
    (StorageType::Single, "Single"),
    (StorageType::String, "String"),
    (StorageType::Time, "Time"),
    (StorageType::UInt16, "UInt16"),
    (StorageType::UInt32, "UInt32"),
    (StorageType::UInt64, "UInt64"),
];

impl StorageType {
    /// Primitive fallback table, `None` for enumerations.
    pub fn for_value_type(value_type: ValueType) -> Option<StorageType> {
        Some(match value_type {
            ValueType::Boolean => StorageType::Boolean,
            ValueType::Int8 => StorageType::SByte,
            ValueType::Int16 => StorageType::Int16,
            ValueType::Int32 => StorageType::Int32,
            ValueType::Int64 => StorageType::Int64,
            ValueType::UInt8 => StorageType::Byte,
            ValueType::UInt16 => StorageType::UInt16,
            ValueType::UInt32 => StorageType::UInt32,
            ValueType::UInt64 => StorageType::UInt64,
            ValueType::Float32 => StorageType::Single,
            ValueType::Float64 => StorageType::Double,
            ValueType::Decimal => StorageType::Decimal,
            ValueType::Varchar => StorageType::String,
            ValueType::Blob => StorageType::Binary,
            ValueType::Date => StorageType::Date,
            ValueType::Time => StorageType::Time,
            ValueType::Timestamp => StorageType::DateTime2,
            ValueType::TimestampWithTimezone => StorageType::DateTimeOffset,
            ValueType::Uuid => StorageType::Guid,
            ValueType::Enum(..) => return None,
        })
    }

    /// The value type a parameter of this storage type carries, `None` for `Object`.
    pub fn value_type(&self) -> Option<ValueType> {
        Some(match self {
            StorageType::AnsiString | StorageType::String => ValueType::Varchar,
            StorageType::Binary => ValueType::Blob,
            StorageType::Boolean => ValueType::Boolean,
            StorageType::Byte => ValueType::UInt8,
            StorageType::Currency | StorageType::Decimal => ValueType::Decimal,
            StorageType::Date => ValueType::Date,
            StorageType::DateTime | StorageType::DateTime2 => ValueType::Timestamp,
            StorageType::DateTimeOffset => ValueType::TimestampWithTimezone,
            StorageType::Double => ValueType::Float64,
            StorageType::Guid => ValueType::Uuid,
            StorageType::Int16 => ValueType::Int16,
            StorageType::Int32 => ValueType::Int32,
            StorageType::Int64 => ValueType::Int64,
            StorageType::Object => return None,
            StorageType::SByte => ValueType::Int8,
            StorageType::Single => ValueType::Float32,
            StorageType::Time => ValueType::Time,
            StorageType::UInt16 => ValueType::UInt16,
            StorageType::UInt32 => ValueType::UInt32,
            StorageType::UInt64 => ValueType::UInt64,
        })
    }
}

impl Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = NAMES
            .iter()
            .find(|(v, _)| v == self)
            .map(|(_, n)| *n)
            .unwrap_or("Object");
        f.write_str(name)
    }
}

impl FromStr for StorageType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(s.trim()))
            .map(|(v, _)| *v)
            .ok_or_else(|| Error::msg(format!("Unknown storage type `{s}`")))
    }
}
