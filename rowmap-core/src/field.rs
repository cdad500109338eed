use crate::{ValueType, separated_by};
use std::{
    any::{TypeId, type_name},
    fmt::{self, Display, Write},
    hash::{Hash, Hasher},
    sync::Arc,
};

/// A column of a result row, or a column of the store a parameter set targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Column name, matched case-insensitively.
    pub name: String,
    /// Alias the column was selected under, when it differs from `name`.
    pub alias: Option<String>,
    /// Declared type of the column.
    pub value_type: ValueType,
    pub nullable: bool,
    /// Position in the row or in the table definition.
    pub ordinal: usize,
    pub is_primary: bool,
    pub is_identity: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            alias: None,
            value_type,
            nullable: true,
            ordinal: 0,
            is_primary: false,
            is_identity: false,
        }
    }
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self.nullable = false;
        self
    }
    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self.nullable = false;
        self
    }
    /// Name the field is matched with: the alias when present.
    pub fn label(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
    pub fn matches(&self, name: &str) -> bool {
        self.label().eq_ignore_ascii_case(name)
    }
}

/// Shared field list of a shape, ordinals aligned with positions.
pub type RowFields = Arc<[FieldDescriptor]>;

/// Builds a field list assigning each descriptor its position as ordinal.
pub fn row_fields(fields: impl IntoIterator<Item = FieldDescriptor>) -> RowFields {
    fields
        .into_iter()
        .enumerate()
        .map(|(i, mut f)| {
            f.ordinal = i;
            f
        })
        .collect()
}

/// The first primary field, or else the first identity field.
pub fn primary_or_identity(fields: &[FieldDescriptor]) -> Option<&FieldDescriptor> {
    fields
        .iter()
        .find(|f| f.is_primary)
        .or_else(|| fields.iter().find(|f| f.is_identity))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    RowToObject,
    ObjectToParameters,
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::RowToObject => "row to object",
            Direction::ObjectToParameters => "object to parameters",
        })
    }
}

/// Key of a compiled routine: target type, source type, direction and the
/// ordered (name, declared type) list of the fields.
#[derive(Debug, Clone)]
pub struct ShapeFingerprint {
    pub target: TypeId,
    pub target_name: &'static str,
    /// Entity type the parameter values are read through, outbound only.
    pub source: Option<TypeId>,
    pub direction: Direction,
    pub fields: RowFields,
}

impl ShapeFingerprint {
    pub fn row_to_object<T: 'static>(fields: RowFields) -> Self {
        Self {
            target: TypeId::of::<T>(),
            target_name: type_name::<T>(),
            source: None,
            direction: Direction::RowToObject,
            fields,
        }
    }
    pub fn object_to_parameters<P: 'static, E: 'static>(fields: RowFields) -> Self {
        Self {
            target: TypeId::of::<P>(),
            target_name: type_name::<P>(),
            source: Some(TypeId::of::<E>()),
            direction: Direction::ObjectToParameters,
            fields,
        }
    }
    /// Renders the field list as `(name: Type, ...)`.
    pub fn shape(&self) -> String {
        let mut out = String::with_capacity(16 * self.fields.len() + 2);
        out.push('(');
        separated_by(
            &mut out,
            self.fields.iter(),
            |out, f| {
                let _ = write!(out, "{}: {}", f.label(), f.value_type);
            },
            ", ",
        );
        out.push(')');
        out
    }
}

impl PartialEq for ShapeFingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.source == other.source
            && self.direction == other.direction
            && self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(other.fields.iter())
                .all(|(l, r)| l.matches(r.label()) && l.value_type == r.value_type)
    }
}

impl Eq for ShapeFingerprint {}

impl Hash for ShapeFingerprint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
        self.source.hash(state);
        self.direction.hash(state);
        self.fields.len().hash(state);
        for field in self.fields.iter() {
            for b in field.label().bytes() {
                state.write_u8(b.to_ascii_lowercase());
            }
            state.write_u8(0xff);
            field.value_type.hash(state);
        }
    }
}

impl Display for ShapeFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` {} ({})",
            self.target_name,
            self.shape(),
            self.direction
        )
    }
}
