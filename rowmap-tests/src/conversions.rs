use crate::{fields, row};
use rowmap::{
    ConversionMode, FieldDescriptor, Mapped, Mapper, MapperSettings, MappingError, Parameter,
    Value, ValueType,
};
use time::{Date, macros::date};

#[derive(Mapped, Default, Debug, Clone, PartialEq)]
pub struct Measurement {
    pub sensor: i16,
    pub reading: i32,
    pub ratio: f32,
    pub taken_on: Option<Date>,
    pub label: String,
}

pub fn conversions() {
    let shape = fields([
        FieldDescriptor::new("sensor", ValueType::Int64),
        FieldDescriptor::new("reading", ValueType::Int64),
        FieldDescriptor::new("ratio", ValueType::Float64),
        FieldDescriptor::new("taken_on", ValueType::Varchar),
        FieldDescriptor::new("label", ValueType::Varchar),
    ]);
    let overflowing = || {
        row(
            &shape,
            [
                Value::Int64(Some(7)),
                Value::Int64(Some(5_000_000_000)),
                Value::Float64(Some(0.25)),
                Value::Varchar(None),
                Value::Varchar(Some("probe".into())),
            ],
        )
    };

    // Default mode casts, the narrowing wraps
    let plain = Mapper::new(MapperSettings::default());
    let measurement: Measurement = plain.read(overflowing()).unwrap();
    assert_eq!(measurement.sensor, 7);
    assert_eq!(measurement.reading, 5_000_000_000i64 as i32);
    assert_eq!(measurement.ratio, 0.25);
    assert_eq!(measurement.taken_on, None);
    // A plain cast cannot turn a number into text
    let error = plain
        .read::<Measurement>(row(
            &shape,
            [
                Value::Int64(Some(7)),
                Value::Int64(Some(1)),
                Value::Float64(Some(0.25)),
                Value::Varchar(Some("2024-05-06".into())),
                Value::Varchar(Some("probe".into())),
            ],
        ))
        .unwrap_err();
    assert!(
        error
            .downcast_ref::<MappingError>()
            .is_some_and(MappingError::is_conversion_error),
        "{error:#}"
    );

    // Automatic mode converts and checks ranges
    let automatic =
        Mapper::new(MapperSettings::default().with_conversion_mode(ConversionMode::Automatic));
    let error = automatic.read::<Measurement>(overflowing()).unwrap_err();
    let Some(MappingError::ConversionError { field, .. }) = error.downcast_ref::<MappingError>()
    else {
        panic!("Expected a conversion error, got {error:#}");
    };
    assert_eq!(field, "reading");
    let measurement: Measurement = automatic
        .read(row(
            &shape,
            [
                Value::Int64(Some(7)),
                Value::Int64(Some(1_000)),
                Value::Float64(Some(0.5)),
                Value::Varchar(Some("2024-05-06".into())),
                Value::Varchar(Some("probe".into())),
            ],
        ))
        .unwrap();
    assert_eq!(measurement.reading, 1_000);
    assert_eq!(measurement.taken_on, Some(date!(2024 - 05 - 06)));
    assert_eq!(measurement.label, "probe");

    // Automatic mode also converts parameters to the store field types
    let store = fields([
        FieldDescriptor::new("sensor", ValueType::Int64),
        FieldDescriptor::new("taken_on", ValueType::Varchar),
        FieldDescriptor::new("reading", ValueType::UInt8),
    ]);
    let mut parameters: Vec<Parameter> = Vec::new();
    let error = automatic
        .bind_to_fields(&mut parameters, &measurement, &store)
        .unwrap_err();
    assert!(
        error
            .downcast_ref::<MappingError>()
            .is_some_and(MappingError::is_conversion_error),
        "{error:#}"
    );
    assert!(parameters.is_empty(), "a failed bind appends nothing");
    let store = fields([
        FieldDescriptor::new("sensor", ValueType::Int64),
        FieldDescriptor::new("taken_on", ValueType::Varchar),
        FieldDescriptor::new("reading", ValueType::Int64),
    ]);
    automatic
        .bind_to_fields(&mut parameters, &measurement, &store)
        .unwrap();
    assert_eq!(parameters[0].value, Value::Int64(Some(7)));
    assert_eq!(parameters[1].value, Value::Varchar(Some("2024-05-06".into())));
    assert_eq!(parameters[2].value, Value::Int64(Some(1_000)));
    assert_eq!(parameters.len(), 5);
}
