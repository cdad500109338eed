use crate::{Error, MappingError, Result, StorageType, Value, ValueType};
use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    env,
    fmt::{self, Display},
    str::FromStr,
    sync::Arc,
};

/// Custom conversion attached to a member of an entity type.
///
/// `get` runs on the inbound path after the field value was coerced to
/// `storage_value_type`, `set` runs on the outbound path before the value is
/// coerced for the store.
pub trait ValueHandler: Send + Sync {
    /// Type of the value as stored, replaces the member type for coercion.
    fn storage_value_type(&self) -> ValueType;
    /// Store value to member value.
    fn get(&self, value: Value) -> Result<Value>;
    /// Member value to store value.
    fn set(&self, value: Value) -> Result<Value>;
}

/// Type-level hook applied to every entity built by a row to object routine.
pub trait ObjectHook<T>: Send + Sync {
    fn after_read(&self, entity: T) -> Result<T>;
}

/// How values are adapted when field and member types differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionMode {
    /// Plain casts, numeric narrowing wraps.
    #[default]
    Default,
    /// Checked conversions, a value out of range fails the routine.
    Automatic,
}

impl Display for ConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConversionMode::Default => "default",
            ConversionMode::Automatic => "automatic",
        })
    }
}

impl FromStr for ConversionMode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("default") {
            Ok(ConversionMode::Default)
        } else if s.eq_ignore_ascii_case("automatic") {
            Ok(ConversionMode::Automatic)
        } else {
            Err(Error::msg(format!(
                "Unknown conversion mode `{s}`, expected `default` or `automatic`"
            )))
        }
    }
}

pub const CONVERSION_MODE_VAR: &str = "ROWMAP_CONVERSION_MODE";
pub const ENUM_STORAGE_TYPE_VAR: &str = "ROWMAP_ENUM_STORAGE_TYPE";

/// Global mapper settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapperSettings {
    pub conversion_mode: ConversionMode,
    /// Storage type of enumeration parameters without a more specific rule.
    pub enum_default_storage_type: StorageType,
}

impl Default for MapperSettings {
    fn default() -> Self {
        Self {
            conversion_mode: ConversionMode::Default,
            enum_default_storage_type: StorageType::String,
        }
    }
}

impl MapperSettings {
    /// Defaults overridden by `ROWMAP_CONVERSION_MODE` and
    /// `ROWMAP_ENUM_STORAGE_TYPE`, invalid values are logged and ignored.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(value) = env::var(CONVERSION_MODE_VAR) {
            match value.parse() {
                Ok(mode) => settings.conversion_mode = mode,
                Err(e) => log::warn!("Ignoring {CONVERSION_MODE_VAR}: {e:#}"),
            }
        }
        if let Ok(value) = env::var(ENUM_STORAGE_TYPE_VAR) {
            match value.parse() {
                Ok(storage) => settings.enum_default_storage_type = storage,
                Err(e) => log::warn!("Ignoring {ENUM_STORAGE_TYPE_VAR}: {e:#}"),
            }
        }
        settings
    }
    pub fn with_conversion_mode(mut self, conversion_mode: ConversionMode) -> Self {
        self.conversion_mode = conversion_mode;
        self
    }
    pub fn with_enum_default_storage_type(mut self, storage_type: StorageType) -> Self {
        self.enum_default_storage_type = storage_type;
        self
    }
}

type MemberKey = (TypeId, String);

fn member_key<T: 'static>(member: &str) -> MemberKey {
    (TypeId::of::<T>(), member.to_ascii_lowercase())
}

fn conflict(what: String) -> Error {
    MappingError::RegistrationConflict(format!(
        "{what} is already registered, pass `force` to replace it"
    ))
    .into()
}

/// Registry of the pluggable conversion rules, read while routines are compiled.
#[derive(Default, Clone)]
pub struct Rules {
    pub settings: MapperSettings,
    value_handlers: HashMap<MemberKey, Arc<dyn ValueHandler>>,
    object_hooks: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    member_storage_types: HashMap<MemberKey, StorageType>,
    type_storage_types: HashMap<ValueType, StorageType>,
}

impl Rules {
    pub fn new(settings: MapperSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn add_value_handler<T: 'static>(
        &mut self,
        member: &str,
        handler: impl ValueHandler + 'static,
        force: bool,
    ) -> Result<()> {
        let key = member_key::<T>(member);
        if !force && self.value_handlers.contains_key(&key) {
            return Err(conflict(format!(
                "A value handler for `{}::{member}`",
                type_name::<T>()
            )));
        }
        self.value_handlers.insert(key, Arc::new(handler));
        Ok(())
    }

    pub fn remove_value_handler<T: 'static>(&mut self, member: &str) -> bool {
        self.value_handlers
            .remove(&member_key::<T>(member))
            .is_some()
    }

    pub fn value_handler(&self, target: TypeId, member: &str) -> Option<Arc<dyn ValueHandler>> {
        self.value_handlers
            .get(&(target, member.to_ascii_lowercase()))
            .cloned()
    }

    pub fn add_object_hook<T: 'static>(
        &mut self,
        hook: impl ObjectHook<T> + 'static,
        force: bool,
    ) -> Result<()> {
        let key = TypeId::of::<T>();
        if !force && self.object_hooks.contains_key(&key) {
            return Err(conflict(format!(
                "An object hook for `{}`",
                type_name::<T>()
            )));
        }
        let hook: Arc<dyn ObjectHook<T>> = Arc::new(hook);
        self.object_hooks.insert(key, Arc::new(hook));
        Ok(())
    }

    pub fn object_hook<T: 'static>(&self) -> Option<Arc<dyn ObjectHook<T>>> {
        self.object_hooks
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<Arc<dyn ObjectHook<T>>>())
            .cloned()
    }

    pub fn add_member_storage_type<T: 'static>(
        &mut self,
        member: &str,
        storage_type: StorageType,
        force: bool,
    ) -> Result<()> {
        let key = member_key::<T>(member);
        match self.member_storage_types.get(&key) {
            Some(existing) if !force && *existing != storage_type => {
                return Err(conflict(format!(
                    "Storage type {existing} for `{}::{member}`",
                    type_name::<T>()
                )));
            }
            _ => {}
        }
        self.member_storage_types.insert(key, storage_type);
        Ok(())
    }

    pub fn member_storage_type(&self, target: TypeId, member: &str) -> Option<StorageType> {
        self.member_storage_types
            .get(&(target, member.to_ascii_lowercase()))
            .copied()
    }

    pub fn add_type_storage_type(
        &mut self,
        value_type: ValueType,
        storage_type: StorageType,
        force: bool,
    ) -> Result<()> {
        match self.type_storage_types.get(&value_type) {
            Some(existing) if !force && *existing != storage_type => {
                return Err(conflict(format!(
                    "Storage type {existing} for type {value_type}"
                )));
            }
            _ => {}
        }
        self.type_storage_types.insert(value_type, storage_type);
        Ok(())
    }

    pub fn type_storage_type(&self, value_type: ValueType) -> Option<StorageType> {
        self.type_storage_types.get(&value_type).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.value_handlers.is_empty()
            && self.object_hooks.is_empty()
            && self.member_storage_types.is_empty()
            && self.type_storage_types.is_empty()
    }
}
