#[cfg(test)]
mod tests {
    use rowmap_core::{AsValue, EnumDef, StorageType, Value, ValueType, mapped_enum};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use time::{Month, macros::date};
    use uuid::Uuid;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Color {
        Red = 1,
        Green = 2,
        Blue = 4,
    }
    mapped_enum!(Color { Red, Green, Blue });

    static SHAPE: EnumDef = EnumDef {
        name: "Shape",
        variants: &[("Circle", 1), ("Square", 2), ("Blue", 3)],
    };

    #[test]
    fn value_none() {
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Float32(Some(1.0)), Value::Null);
        assert!(Value::Int32(None).is_null());
        assert_eq!(Value::Int32(None).value_type(), Some(ValueType::Int32));
        assert_eq!(Value::Null.value_type(), None);
    }

    #[test]
    fn value_bool() {
        let val: Value = true.into();
        assert_eq!(val, Value::Boolean(Some(true)));
        assert_ne!(val, Value::Boolean(None));
        assert_eq!(bool::try_from_value(val).unwrap(), true);
        assert_eq!(bool::try_from_value((1 as i8).into()).unwrap(), true);
        assert_eq!(bool::try_from_value((0 as u64).into()).unwrap(), false);
        assert_eq!(bool::try_from_value("t".into()).unwrap(), true);
        assert_eq!(bool::try_from_value("FALSE".into()).unwrap(), false);
        assert!(bool::try_from_value("maybe".into()).is_err());
        assert!(bool::try_from_value(Value::Boolean(None)).is_err());
    }

    #[test]
    fn value_integers() {
        assert_eq!(i16::try_from_value((29 as i8).into()).unwrap(), 29);
        assert_eq!(i32::try_from_value((77 as u8).into()).unwrap(), 77);
        assert_eq!(i64::try_from_value((123456 as u32).into()).unwrap(), 123456);
        assert_eq!(u8::try_from_value("200".into()).unwrap(), 200);
        assert!(i8::try_from_value((300 as i32).into()).is_err());
        assert!(u32::try_from_value((-1 as i64).into()).is_err());
        assert!(i8::try_from_value((0.1 as f64).into()).is_err());
        assert_eq!(i32::try_from_value((42.0 as f64).into()).unwrap(), 42);
        assert_eq!(
            i64::try_from_value(Decimal::from_str("17").unwrap().into()).unwrap(),
            17
        );
    }

    #[test]
    fn value_option() {
        assert_eq!(Option::<i32>::try_from_value(Value::Int64(None)).unwrap(), None);
        assert_eq!(Option::<i32>::try_from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<i32>::try_from_value(Value::Int64(Some(5))).unwrap(),
            Some(5)
        );
        assert_eq!(None::<String>.as_value(), Value::Varchar(None));
        assert!(<Option<String> as AsValue>::nullable());
        assert!(!<String as AsValue>::nullable());
    }

    #[test]
    fn cast_wraps() {
        assert_eq!(
            Value::Int64(Some(300)).cast(ValueType::UInt8).unwrap(),
            Value::UInt8(Some(44))
        );
        assert_eq!(
            Value::Int32(Some(-1)).cast(ValueType::UInt16).unwrap(),
            Value::UInt16(Some(u16::MAX))
        );
        assert_eq!(
            Value::Float64(Some(3.9)).cast(ValueType::Int32).unwrap(),
            Value::Int32(Some(3))
        );
        assert_eq!(
            Value::Int16(None).cast(ValueType::Varchar).unwrap(),
            Value::Varchar(None)
        );
        assert!(
            Value::Varchar(Some("12".into()))
                .cast(ValueType::Int32)
                .is_err()
        );
    }

    #[test]
    fn convert_checks() {
        assert!(Value::Int64(Some(300)).convert(ValueType::UInt8).is_err());
        assert_eq!(
            Value::Int64(Some(200)).convert(ValueType::UInt8).unwrap(),
            Value::UInt8(Some(200))
        );
        assert!(Value::Float64(Some(3.9)).convert(ValueType::Int32).is_err());
        assert_eq!(
            Value::Varchar(Some(" 12 ".into()))
                .convert(ValueType::Int32)
                .unwrap(),
            Value::Int32(Some(12))
        );
        assert_eq!(
            Value::Int32(Some(12)).convert(ValueType::Varchar).unwrap(),
            Value::Varchar(Some("12".into()))
        );
        let date = Value::Varchar(Some("2024-02-29".into()))
            .convert(ValueType::Date)
            .unwrap();
        assert_eq!(date, Value::Date(Some(date!(2024 - 02 - 29))));
        let Value::Timestamp(Some(timestamp)) = date.convert(ValueType::Timestamp).unwrap() else {
            panic!("Expected a timestamp");
        };
        assert_eq!(timestamp.month(), Month::February);
        let uuid = Uuid::from_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        let blob = Value::Uuid(Some(uuid)).convert(ValueType::Blob).unwrap();
        assert_eq!(blob.convert(ValueType::Uuid).unwrap(), Value::Uuid(Some(uuid)));
    }

    #[test]
    fn enums() {
        let def = <Color as rowmap_core::MappedEnum>::enum_def();
        assert_eq!(Color::Blue.as_value(), Value::Enum(Some(4), def));
        assert_eq!(Color::try_from_value("green".into()).unwrap(), Color::Green);
        assert_eq!(Color::try_from_value((4 as i16).into()).unwrap(), Color::Blue);
        assert_eq!(Color::try_from_value("4".into()).unwrap(), Color::Blue);
        assert!(Color::try_from_value((3 as i32).into()).is_err());
        assert!(Color::try_from_value("Purple".into()).is_err());
        assert_eq!(
            Color::Red.as_value().convert(ValueType::Varchar).unwrap(),
            Value::Varchar(Some("Red".into()))
        );
        assert_eq!(
            Color::Blue.as_value().convert(ValueType::Int32).unwrap(),
            Value::Int32(Some(4))
        );
        assert_eq!(
            Color::Blue
                .as_value()
                .convert(ValueType::Enum(&SHAPE))
                .unwrap(),
            Value::Enum(Some(3), &SHAPE)
        );
        assert!(
            Color::Red
                .as_value()
                .convert(ValueType::Enum(&SHAPE))
                .is_err()
        );
        assert_eq!(ValueType::Enum(def).zero(), Value::Enum(Some(1), def));
    }

    #[test]
    fn storage_types() {
        assert_eq!(
            StorageType::for_value_type(ValueType::Int32),
            Some(StorageType::Int32)
        );
        assert_eq!(
            StorageType::for_value_type(ValueType::Varchar),
            Some(StorageType::String)
        );
        assert_eq!(StorageType::for_value_type(ValueType::Enum(&SHAPE)), None);
        assert_eq!(StorageType::from_str("int64").unwrap(), StorageType::Int64);
        assert_eq!(StorageType::Guid.to_string(), "Guid");
        assert!(StorageType::from_str("Quaternion").is_err());
        assert_eq!(StorageType::Object.value_type(), None);
    }

    #[test]
    fn zero_values() {
        assert_eq!(ValueType::Int32.zero(), Value::Int32(Some(0)));
        assert_eq!(ValueType::Varchar.zero(), Value::Varchar(Some(String::new())));
        assert_eq!(ValueType::Uuid.zero(), Value::Uuid(Some(Uuid::nil())));
        assert_eq!(ValueType::Boolean.empty(), Value::Boolean(None));
    }
}
