use crate::{
    FieldDescriptor, Mapped, Mapper, MappingError, Parameter, Result, Row, RowFields, RowLabeled,
    Value, primary_or_identity, row_fields,
};

/// In-memory table of rows, the staging form of bulk operations.
///
/// Built from entities through their object to parameters routine, so the
/// columns carry the same names, types and converted values a single-row
/// command would receive.
#[derive(Debug, Clone)]
pub struct BulkTable {
    fields: RowFields,
    rows: Vec<Row>,
}

impl BulkTable {
    pub fn new(fields: RowFields) -> Self {
        Self {
            fields,
            rows: Vec::new(),
        }
    }

    /// One row per entity, one column per member of `T`, in the order of
    /// `store_fields` when not empty.
    pub fn from_entities<'a, T: Mapped>(
        mapper: &Mapper,
        entities: impl IntoIterator<Item = &'a T>,
        store_fields: &RowFields,
    ) -> Result<Self> {
        let routine = mapper.compile_object_to_parameters::<T, T>(store_fields)?;
        let fields = row_fields(routine.plan().operations.iter().map(|op| {
            let store = store_fields.iter().find(|f| f.matches(&op.name));
            let mut field = FieldDescriptor::new(op.name.clone(), op.value_type);
            if let Some(store) = store {
                field.nullable = store.nullable;
                field.is_primary = store.is_primary;
                field.is_identity = store.is_identity;
            }
            field
        }));
        let mut table = Self::new(fields);
        let mut parameters: Vec<Parameter> = Vec::with_capacity(table.fields.len());
        for entity in entities {
            parameters.clear();
            routine.call(&mut parameters, entity)?;
            table
                .rows
                .push(parameters.drain(..).map(|p| p.value).collect());
        }
        log::debug!(
            "Staged {} rows of `{}` in a bulk table",
            table.rows.len(),
            routine.fingerprint().target_name
        );
        Ok(table)
    }

    /// Single column table holding `keys`, the column is the primary field
    /// of `store_fields` or, without one, its identity field.
    pub fn single_column(
        store_fields: &RowFields,
        keys: impl IntoIterator<Item = Value>,
    ) -> Result<Self> {
        let Some(key) = primary_or_identity(store_fields) else {
            return Err(MappingError::BindingError {
                target: "bulk key table",
                shape: format!(
                    "({})",
                    store_fields
                        .iter()
                        .map(|f| f.label())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                reason: "no primary or identity field found".into(),
            }
            .into());
        };
        let value_type = key.value_type;
        let mut field = key.clone();
        field.ordinal = 0;
        let mut table = Self::new([field].into());
        for key in keys {
            table.push(vec![key.convert(value_type)?])?;
        }
        Ok(table)
    }

    pub fn fields(&self) -> &RowFields {
        &self.fields
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: impl Into<Row>) -> Result<()> {
        let row = row.into();
        if row.len() != self.fields.len() {
            return Err(MappingError::ShapeMismatch {
                target: "bulk table",
                shape: format!("{} values", row.len()),
                reason: format!("the table has {} columns", self.fields.len()),
            }
            .into());
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn into_rows(self) -> impl Iterator<Item = RowLabeled> {
        let fields = self.fields;
        self.rows
            .into_iter()
            .map(move |values| RowLabeled::new(fields.clone(), values))
    }
}
