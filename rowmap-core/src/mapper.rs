use crate::{
    CacheStats, FunctionCache, Mapped, MapperSettings, ObjectHook, ObjectToParameters,
    ParameterSink, Result, RowFields, RowLabeled, RowToObject, Rules, ShapeFingerprint,
    StorageType, ValueHandler, ValueType,
};
use parking_lot::RwLock;
use std::sync::{Arc, LazyLock};

static GLOBAL: LazyLock<Mapper> = LazyLock::new(|| Mapper::new(MapperSettings::from_env()));

/// Compiles and caches the routines moving values between rows, objects and
/// command parameters.
///
/// Rules are read while a routine is compiled: changing a rule drops every
/// cached routine so that the next call compiles with the new rules.
///
/// # Examples
/// ```rust
/// use rowmap_core::{FieldDescriptor, Mapper, RowLabeled, Value, ValueType, row_fields};
/// let mapper = Mapper::default();
/// let row = RowLabeled::new(
///     row_fields([FieldDescriptor::new("count", ValueType::Int64)]),
///     [Value::Int64(Some(7))].into(),
/// );
/// let count: i32 = mapper.read(row).unwrap();
/// assert_eq!(count, 7);
/// ```
pub struct Mapper {
    rules: RwLock<Rules>,
    cache: FunctionCache,
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new(MapperSettings::default())
    }
}

impl Mapper {
    pub fn new(settings: MapperSettings) -> Self {
        Self {
            rules: RwLock::new(Rules::new(settings)),
            cache: FunctionCache::new(),
        }
    }

    /// Process-wide mapper, settings are read from the environment on first use.
    pub fn global() -> &'static Mapper {
        &GLOBAL
    }

    pub fn settings(&self) -> MapperSettings {
        self.rules.read().settings
    }

    pub fn set_settings(&self, settings: MapperSettings) -> Result<()> {
        self.update_rules(|rules| {
            rules.settings = settings;
            Ok(())
        })
    }

    /// Applies a rule change, then drops the routines compiled with the old rules.
    ///
    /// The exclusive lock waits for compilations in flight, none of them can
    /// publish a routine built with the old rules after the reset.
    fn update_rules<R>(&self, change: impl FnOnce(&mut Rules) -> Result<R>) -> Result<R> {
        let mut rules = self.rules.write();
        let result = change(&mut rules)?;
        let dropped = self.cache.len();
        if dropped > 0 {
            log::warn!("Conversion rules changed, dropping {dropped} compiled routines");
            self.cache.reset();
        }
        Ok(result)
    }

    /// Registers a value handler on `member` of `T`, fails with
    /// `RegistrationConflict` when one exists unless `force` is set.
    pub fn add_value_handler<T: Mapped>(
        &self,
        member: &str,
        handler: impl ValueHandler + 'static,
        force: bool,
    ) -> Result<()> {
        self.update_rules(|rules| rules.add_value_handler::<T>(member, handler, force))
    }

    pub fn remove_value_handler<T: Mapped>(&self, member: &str) -> bool {
        self.update_rules(|rules| Ok(rules.remove_value_handler::<T>(member)))
            .unwrap_or_default()
    }

    pub fn add_object_hook<T: Mapped>(
        &self,
        hook: impl ObjectHook<T> + 'static,
        force: bool,
    ) -> Result<()> {
        self.update_rules(|rules| rules.add_object_hook::<T>(hook, force))
    }

    pub fn add_member_storage_type<T: Mapped>(
        &self,
        member: &str,
        storage_type: StorageType,
        force: bool,
    ) -> Result<()> {
        self.update_rules(|rules| rules.add_member_storage_type::<T>(member, storage_type, force))
    }

    pub fn add_type_storage_type(
        &self,
        value_type: ValueType,
        storage_type: StorageType,
        force: bool,
    ) -> Result<()> {
        self.update_rules(|rules| rules.add_type_storage_type(value_type, storage_type, force))
    }

    /// Routine building a `T` out of rows with the fields `fields`.
    pub fn compile_row_to_object<T: Mapped>(&self, fields: &RowFields) -> Result<Arc<RowToObject<T>>> {
        let fingerprint = ShapeFingerprint::row_to_object::<T>(fields.clone());
        if let Some(routine) = self.cache.get(&fingerprint) {
            return Ok(routine);
        }
        let rules = self.rules.read();
        self.cache.get_or_compile(fingerprint, |fingerprint| {
            RowToObject::<T>::compile(fingerprint, &rules)
        })
    }

    /// Routine reading the members of a `P` into parameters targeting the
    /// store fields `store_fields`, rules of the entity type `E` also apply.
    ///
    /// An empty `store_fields` produces the parameters in member order.
    pub fn compile_object_to_parameters<P: Mapped, E: Mapped>(
        &self,
        store_fields: &RowFields,
    ) -> Result<Arc<ObjectToParameters<P>>> {
        let fingerprint = ShapeFingerprint::object_to_parameters::<P, E>(store_fields.clone());
        if let Some(routine) = self.cache.get(&fingerprint) {
            return Ok(routine);
        }
        let rules = self.rules.read();
        self.cache.get_or_compile(fingerprint, |fingerprint| {
            ObjectToParameters::<P>::compile::<E>(fingerprint, &rules)
        })
    }

    pub fn read<T: Mapped>(&self, row: RowLabeled) -> Result<T> {
        self.compile_row_to_object::<T>(&row.fields)?.call(row)
    }

    /// Reads every row, compiling once per distinct shape in a row.
    pub fn read_all<T: Mapped>(
        &self,
        rows: impl IntoIterator<Item = RowLabeled>,
    ) -> impl Iterator<Item = Result<T>> {
        let mut current: Option<Arc<RowToObject<T>>> = None;
        rows.into_iter().map(move |row| {
            let routine = match &current {
                Some(routine)
                    if Arc::ptr_eq(&routine.fingerprint().fields, &row.fields)
                        || *routine.fingerprint()
                            == ShapeFingerprint::row_to_object::<T>(row.fields.clone()) =>
                {
                    routine.clone()
                }
                _ => {
                    let routine = self.compile_row_to_object::<T>(&row.fields)?;
                    current = Some(routine.clone());
                    routine
                }
            };
            routine.call(row)
        })
    }

    /// Appends the parameters of `entity` in member order.
    pub fn bind<P: Mapped>(&self, sink: &mut dyn ParameterSink, entity: &P) -> Result<()> {
        self.bind_to_fields(sink, entity, &RowFields::from([]))
    }

    /// Appends the parameters of `entity` in the order of `store_fields`.
    pub fn bind_to_fields<P: Mapped>(
        &self,
        sink: &mut dyn ParameterSink,
        entity: &P,
        store_fields: &RowFields,
    ) -> Result<()> {
        self.compile_object_to_parameters::<P, P>(store_fields)?
            .call(sink, entity)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn reset_cache(&self) {
        self.cache.reset();
    }
}
