use crate::{FieldDescriptor, RowFields, Value, ValueType, row_fields};
use std::mem;

/// Owned row value slice matching the length of its `RowFields`.
pub type Row = Box<[Value]>;

/// A result row with the descriptors of its fields.
#[derive(Debug, Clone)]
pub struct RowLabeled {
    /// Field descriptors, shared between all the rows of a result.
    pub fields: RowFields,
    /// Data values (aligned by index with `fields`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(fields: RowFields, values: Row) -> Self {
        Self { fields, values }
    }
    /// Row whose declared types are taken from the values, an untyped
    /// `Value::Null` is declared as `Varchar`.
    pub fn from_values<N: Into<String>>(values: impl IntoIterator<Item = (N, Value)>) -> Self {
        let (fields, values): (Vec<_>, Vec<_>) = values
            .into_iter()
            .map(|(name, value)| {
                let value_type = value.value_type().unwrap_or(ValueType::Varchar);
                (FieldDescriptor::new(name, value_type), value)
            })
            .unzip();
        Self {
            fields: row_fields(fields),
            values: values.into(),
        }
    }
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get(&self, ordinal: usize) -> Option<&Value> {
        self.values.get(ordinal)
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .position(|f| f.matches(name))
            .and_then(|i| self.values.get(i))
    }
    /// Moves the value out, leaving `Value::Null` behind.
    pub fn take(&mut self, ordinal: usize) -> Option<Value> {
        self.values.get_mut(ordinal).map(mem::take)
    }
}

impl From<RowLabeled> for Row {
    fn from(value: RowLabeled) -> Self {
        value.values
    }
}
