#[cfg(test)]
mod tests {
    use rowmap_core::{
        ConversionMode, Error, FieldDescriptor, FunctionCache, MapperSettings, MappingError,
        Result, Rules, ShapeFingerprint, StorageType, Value, ValueHandler, ValueType, row_fields,
    };
    use std::{
        str::FromStr,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        thread,
    };

    struct Upper;
    impl ValueHandler for Upper {
        fn storage_value_type(&self) -> ValueType {
            ValueType::Varchar
        }
        fn get(&self, value: Value) -> Result<Value> {
            Ok(match value {
                Value::Varchar(Some(v)) => Value::Varchar(Some(v.to_uppercase())),
                v => v,
            })
        }
        fn set(&self, value: Value) -> Result<Value> {
            Ok(value)
        }
    }

    struct Customer;

    fn fingerprint(name: &str) -> ShapeFingerprint {
        ShapeFingerprint::row_to_object::<i64>(row_fields([FieldDescriptor::new(
            name,
            ValueType::Int64,
        )]))
    }

    #[test]
    fn publishes_once() {
        let cache = FunctionCache::new();
        let first = cache
            .get_or_compile(fingerprint("id"), |_| Ok(String::from("routine")))
            .unwrap();
        let second = cache
            .get_or_compile(fingerprint("ID"), |_| -> Result<String> {
                panic!("Must not compile a cached fingerprint")
            })
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.compilations, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = FunctionCache::new();
        let result = cache.get_or_compile(fingerprint("id"), |_| -> Result<String> {
            Err(Error::msg("broken"))
        });
        assert!(result.is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().compilations, 0);
        cache
            .get_or_compile(fingerprint("id"), |_| Ok(1u32))
            .unwrap();
        assert_eq!(cache.len(), 1);
        cache.reset();
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_callers_share_the_routine() {
        let cache = Arc::new(FunctionCache::new());
        let compiled = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                let compiled = compiled.clone();
                thread::spawn(move || {
                    cache
                        .get_or_compile(fingerprint("value"), |_| {
                            compiled.fetch_add(1, Ordering::Relaxed);
                            Ok(format!("routine {i}"))
                        })
                        .unwrap()
                })
            })
            .collect();
        let routines: Vec<Arc<String>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(routines.iter().all(|r| Arc::ptr_eq(r, &routines[0])));
        assert_eq!(cache.len(), 1);
        assert!(compiled.load(Ordering::Relaxed) >= 1);
    }

    #[test]
    fn registration_conflicts() {
        let mut rules = Rules::default();
        rules
            .add_value_handler::<Customer>("name", Upper, false)
            .unwrap();
        let error = rules
            .add_value_handler::<Customer>("NAME", Upper, false)
            .unwrap_err();
        assert!(
            error
                .downcast_ref::<MappingError>()
                .is_some_and(MappingError::is_registration_conflict)
        );
        rules
            .add_value_handler::<Customer>("name", Upper, true)
            .unwrap();
        assert!(
            rules
                .value_handler(std::any::TypeId::of::<Customer>(), "Name")
                .is_some()
        );

        rules
            .add_type_storage_type(ValueType::Int32, StorageType::Int64, false)
            .unwrap();
        rules
            .add_type_storage_type(ValueType::Int32, StorageType::Int64, false)
            .unwrap();
        assert!(
            rules
                .add_type_storage_type(ValueType::Int32, StorageType::Decimal, false)
                .is_err()
        );
        rules
            .add_member_storage_type::<Customer>("code", StorageType::AnsiString, false)
            .unwrap();
        assert!(
            rules
                .add_member_storage_type::<Customer>("code", StorageType::String, false)
                .is_err()
        );
        assert_eq!(
            rules.type_storage_type(ValueType::Int32),
            Some(StorageType::Int64)
        );
    }

    #[test]
    fn settings() {
        let settings = MapperSettings::default();
        assert_eq!(settings.conversion_mode, ConversionMode::Default);
        assert_eq!(settings.enum_default_storage_type, StorageType::String);
        assert_eq!(
            ConversionMode::from_str("Automatic").unwrap(),
            ConversionMode::Automatic
        );
        assert!(ConversionMode::from_str("lenient").is_err());
        let settings = settings
            .with_conversion_mode(ConversionMode::Automatic)
            .with_enum_default_storage_type(StorageType::Int32);
        assert_eq!(settings.conversion_mode.to_string(), "automatic");
        assert_eq!(settings.enum_default_storage_type, StorageType::Int32);
    }
}
