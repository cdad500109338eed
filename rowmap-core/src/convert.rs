use crate::{Context, Error, Result, Value, ValueType, truncate_long};
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::str::FromStr;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};
use uuid::Uuid;

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[hour]:[minute]:[second][optional [.[subsecond]]]");
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
);

enum Number {
    Int(i128),
    Float(f64),
    Decimal(Decimal),
}

fn number(value: &Value) -> Option<Number> {
    Some(match *value {
        Value::Boolean(Some(v)) => Number::Int(v as i128),
        Value::Int8(Some(v)) => Number::Int(v as i128),
        Value::Int16(Some(v)) => Number::Int(v as i128),
        Value::Int32(Some(v)) => Number::Int(v as i128),
        Value::Int64(Some(v)) => Number::Int(v as i128),
        Value::UInt8(Some(v)) => Number::Int(v as i128),
        Value::UInt16(Some(v)) => Number::Int(v as i128),
        Value::UInt32(Some(v)) => Number::Int(v as i128),
        Value::UInt64(Some(v)) => Number::Int(v as i128),
        Value::Float32(Some(v)) => Number::Float(v as f64),
        Value::Float64(Some(v)) => Number::Float(v),
        Value::Decimal(Some(v)) => Number::Decimal(v),
        Value::Enum(Some(v), ..) => Number::Int(v as i128),
        _ => return None,
    })
}

/// Two's complement reinterpretation, the semantics of `as`.
fn wrapping_integer(target: ValueType, v: i128) -> Option<Value> {
    Some(match target {
        ValueType::Boolean => Value::Boolean(Some(v != 0)),
        ValueType::Int8 => Value::Int8(Some(v as _)),
        ValueType::Int16 => Value::Int16(Some(v as _)),
        ValueType::Int32 => Value::Int32(Some(v as _)),
        ValueType::Int64 => Value::Int64(Some(v as _)),
        ValueType::UInt8 => Value::UInt8(Some(v as _)),
        ValueType::UInt16 => Value::UInt16(Some(v as _)),
        ValueType::UInt32 => Value::UInt32(Some(v as _)),
        ValueType::UInt64 => Value::UInt64(Some(v as _)),
        ValueType::Float32 => Value::Float32(Some(v as _)),
        ValueType::Float64 => Value::Float64(Some(v as _)),
        ValueType::Decimal => Value::Decimal(Some(Decimal::try_from_i128_with_scale(v, 0).ok()?)),
        ValueType::Enum(def) => Value::Enum(Some(v as _), def),
        _ => return None,
    })
}

fn checked_integer(target: ValueType, v: i128) -> Result<Option<Value>> {
    macro_rules! checked {
        ($variant:ident, $ty:ty) => {
            Value::$variant(Some(<$ty>::try_from(v).map_err(|_| {
                Error::msg(format!("Value {v} is out of range for {}", target))
            })?))
        };
    }
    Ok(Some(match target {
        ValueType::Boolean => Value::Boolean(Some(v != 0)),
        ValueType::Int8 => checked!(Int8, i8),
        ValueType::Int16 => checked!(Int16, i16),
        ValueType::Int32 => checked!(Int32, i32),
        ValueType::Int64 => checked!(Int64, i64),
        ValueType::UInt8 => checked!(UInt8, u8),
        ValueType::UInt16 => checked!(UInt16, u16),
        ValueType::UInt32 => checked!(UInt32, u32),
        ValueType::UInt64 => checked!(UInt64, u64),
        ValueType::Float32 => Value::Float32(Some(v as _)),
        ValueType::Float64 => Value::Float64(Some(v as _)),
        ValueType::Decimal => Value::Decimal(Some(
            Decimal::try_from_i128_with_scale(v, 0)
                .with_context(|| format!("Value {v} does not fit into a Decimal"))?,
        )),
        ValueType::Enum(def) => {
            let discriminant = i64::try_from(v)
                .ok()
                .filter(|d| def.contains(*d))
                .ok_or_else(|| {
                    Error::msg(format!("Value {v} is not a variant of {}", def.name))
                })?;
            Value::Enum(Some(discriminant), def)
        }
        _ => return Ok(None),
    }))
}

fn invalid_cast(value: &Value, target: ValueType) -> Error {
    Error::msg(format!(
        "Cannot convert {} to {}",
        truncate_long!(format!("{value:?}")),
        target
    ))
}

fn parse(text: &str, target: ValueType) -> Result<Value> {
    let trimmed = text.trim();
    let context = || format!("Cannot convert `{}` to {}", truncate_long!(text), target);
    Ok(match target {
        ValueType::Boolean => Value::Boolean(Some(match trimmed {
            x if x.eq_ignore_ascii_case("true") || x.eq_ignore_ascii_case("t") || x == "1" => true,
            x if x.eq_ignore_ascii_case("false") || x.eq_ignore_ascii_case("f") || x == "0" => {
                false
            }
            _ => return Err(Error::msg(context())),
        })),
        ValueType::Float32 => Value::Float32(Some(trimmed.parse().with_context(context)?)),
        ValueType::Float64 => Value::Float64(Some(trimmed.parse().with_context(context)?)),
        ValueType::Decimal => Value::Decimal(Some(Decimal::from_str(trimmed).with_context(context)?)),
        ValueType::Varchar => Value::Varchar(Some(text.to_owned())),
        ValueType::Blob => Value::Blob(Some(text.as_bytes().into())),
        ValueType::Date => Value::Date(Some(Date::parse(trimmed, DATE_FORMAT).with_context(context)?)),
        ValueType::Time => Value::Time(Some(Time::parse(trimmed, TIME_FORMAT).with_context(context)?)),
        ValueType::Timestamp => Value::Timestamp(Some(
            PrimitiveDateTime::parse(trimmed, TIMESTAMP_FORMAT).with_context(context)?,
        )),
        ValueType::TimestampWithTimezone => Value::TimestampWithTimezone(Some(
            OffsetDateTime::parse(trimmed, &Rfc3339).with_context(context)?,
        )),
        ValueType::Uuid => Value::Uuid(Some(Uuid::parse_str(trimmed).with_context(context)?)),
        ValueType::Enum(def) => match def.discriminant_of(trimmed) {
            Some(discriminant) => Value::Enum(Some(discriminant), def),
            None => {
                let v = trimmed.parse::<i128>().with_context(context)?;
                checked_integer(target, v)?.ok_or_else(|| Error::msg(context()))?
            }
        },
        _ => {
            let v = trimmed.parse::<i128>().with_context(context)?;
            checked_integer(target, v)?.ok_or_else(|| Error::msg(context()))?
        }
    })
}

fn to_utc(value: OffsetDateTime) -> PrimitiveDateTime {
    let value = value.to_offset(UtcOffset::UTC);
    PrimitiveDateTime::new(value.date(), value.time())
}

impl Value {
    /// Default cast between declared types.
    ///
    /// Numeric types are reinterpreted the way `as` does (integers wrap,
    /// floats truncate and saturate). Anything else must already have the
    /// target type, otherwise the cast fails. NULL becomes a typed NULL.
    pub fn cast(self, target: ValueType) -> Result<Value> {
        if self.is_null() {
            return Ok(target.empty());
        }
        if self.value_type() == Some(target) {
            return Ok(self);
        }
        let result = match number(&self) {
            Some(Number::Int(v)) => wrapping_integer(target, v),
            Some(Number::Float(v)) => match target {
                ValueType::Float32 => Some(Value::Float32(Some(v as _))),
                ValueType::Float64 => Some(Value::Float64(Some(v))),
                ValueType::Decimal => Decimal::from_f64(v).map(|v| Value::Decimal(Some(v))),
                _ => wrapping_integer(target, v as i128),
            },
            Some(Number::Decimal(v)) => match target {
                ValueType::Float32 => v.to_f32().map(|v| Value::Float32(Some(v))),
                ValueType::Float64 => v.to_f64().map(|v| Value::Float64(Some(v))),
                _ => v.trunc().to_i128().and_then(|v| wrapping_integer(target, v)),
            },
            None => None,
        };
        result.ok_or_else(|| invalid_cast(&self, target))
    }

    /// Safe conversion between declared types.
    ///
    /// Numeric conversions are range checked and never lose the integral
    /// part, text is parsed, temporal values move between their
    /// representations and everything can become `Varchar`.
    pub fn convert(self, target: ValueType) -> Result<Value> {
        if self.is_null() {
            return Ok(target.empty());
        }
        if self.value_type() == Some(target) {
            return Ok(self);
        }
        match (self, target) {
            (Value::Varchar(Some(v)), target) => parse(&v, target),
            (Value::Enum(Some(v), from), ValueType::Enum(def)) => from
                .name_of(v)
                .and_then(|name| def.discriminant_of(name))
                .map(|d| Value::Enum(Some(d), def))
                .ok_or_else(|| Error::msg(format!("Value {v} of {} has no match in {}", from.name, def.name))),
            (v, ValueType::Varchar) => Ok(Value::Varchar(Some(v.to_string()))),
            (Value::Blob(Some(v)), ValueType::Uuid) => Ok(Value::Uuid(Some(
                Uuid::from_slice(&v).context("A Uuid requires exactly 16 bytes")?,
            ))),
            (Value::Uuid(Some(v)), ValueType::Blob) => {
                Ok(Value::Blob(Some(v.as_bytes().as_slice().into())))
            }
            (Value::Date(Some(v)), ValueType::Timestamp) => Ok(Value::Timestamp(Some(v.midnight()))),
            (Value::Timestamp(Some(v)), ValueType::Date) => Ok(Value::Date(Some(v.date()))),
            (Value::Timestamp(Some(v)), ValueType::Time) => Ok(Value::Time(Some(v.time()))),
            (Value::Timestamp(Some(v)), ValueType::TimestampWithTimezone) => {
                Ok(Value::TimestampWithTimezone(Some(v.assume_utc())))
            }
            (Value::TimestampWithTimezone(Some(v)), ValueType::Timestamp) => {
                Ok(Value::Timestamp(Some(to_utc(v))))
            }
            (Value::TimestampWithTimezone(Some(v)), ValueType::Date) => {
                Ok(Value::Date(Some(to_utc(v).date())))
            }
            (value, target) => {
                let result = match number(&value) {
                    Some(Number::Int(v)) => checked_integer(target, v)?,
                    Some(Number::Float(v)) => match target {
                        ValueType::Float64 => Some(Value::Float64(Some(v))),
                        ValueType::Float32 => {
                            let result = v as f32;
                            if v.is_finite() && result.is_infinite() {
                                return Err(Error::msg(format!(
                                    "Value {v} is out of range for {}",
                                    target
                                )));
                            }
                            Some(Value::Float32(Some(result)))
                        }
                        ValueType::Decimal => Some(Value::Decimal(Some(
                            Decimal::from_f64(v).ok_or_else(|| invalid_cast(&value, target))?,
                        ))),
                        ValueType::Boolean => Some(Value::Boolean(Some(v != 0.0))),
                        _ => {
                            if !v.is_finite() || v.fract() != 0.0 {
                                return Err(Error::msg(format!(
                                    "Value {v} is not an integer and does not fit into {}",
                                    target
                                )));
                            }
                            checked_integer(target, v as i128)?
                        }
                    },
                    Some(Number::Decimal(v)) => match target {
                        ValueType::Float32 => v.to_f32().map(|v| Value::Float32(Some(v))),
                        ValueType::Float64 => v.to_f64().map(|v| Value::Float64(Some(v))),
                        _ => {
                            if !v.is_integer() {
                                return Err(Error::msg(format!(
                                    "Value {v} is not an integer and does not fit into {}",
                                    target
                                )));
                            }
                            match v.to_i128() {
                                Some(v) => checked_integer(target, v)?,
                                None => None,
                            }
                        }
                    },
                    None => None,
                };
                result.ok_or_else(|| invalid_cast(&value, target))
            }
        }
    }
}
