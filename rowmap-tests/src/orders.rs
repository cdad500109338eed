use crate::{fields, row};
use rowmap::{
    Context, Error, FieldDescriptor, Mapped, Mapper, MapperSettings, MappingError, Parameter,
    Result, StorageType, Value, ValueHandler, ValueType, mapped_enum,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use time::{PrimitiveDateTime, macros::datetime};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OrderStatus {
    #[default]
    Pending = 1,
    Shipped = 2,
    Cancelled = 3,
}
mapped_enum!(OrderStatus {
    Pending,
    Shipped,
    Cancelled
});

#[derive(Mapped, Default, Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub status: OrderStatus,
    pub quantity: i32,
    /// Stored as an integer amount of cents when the `Cents` handler is registered.
    pub total: Decimal,
    pub placed_at: Option<PrimitiveDateTime>,
}

/// Decimal member stored as an integer amount of cents.
pub struct Cents;

impl ValueHandler for Cents {
    fn storage_value_type(&self) -> ValueType {
        ValueType::Int64
    }
    fn get(&self, value: Value) -> Result<Value> {
        Ok(match value {
            Value::Int64(Some(cents)) => Value::Decimal(Some(Decimal::new(cents, 2))),
            Value::Int64(None) => Value::Decimal(None),
            v => return Err(Error::msg(format!("Expected cents, found {v:?}"))),
        })
    }
    fn set(&self, value: Value) -> Result<Value> {
        let Value::Decimal(amount) = value else {
            return Err(Error::msg(format!("Expected a decimal amount, found {value:?}")));
        };
        let cents = amount
            .map(|v| {
                (v * Decimal::ONE_HUNDRED)
                    .trunc()
                    .try_into()
                    .context("Amount out of range")
            })
            .transpose()?;
        Ok(Value::Int64(cents))
    }
}

pub fn order_fields() -> rowmap::RowFields {
    fields([
        FieldDescriptor::new("id", ValueType::Int64).primary(),
        FieldDescriptor::new("customer_id", ValueType::Int64).not_null(),
        FieldDescriptor::new("status", ValueType::Varchar).not_null(),
        FieldDescriptor::new("quantity", ValueType::Int32).not_null(),
        FieldDescriptor::new("total", ValueType::Decimal).not_null(),
        FieldDescriptor::new("placed_at", ValueType::Timestamp),
    ])
}

pub fn sample_orders() -> Vec<Order> {
    vec![
        Order {
            id: 1,
            customer_id: 10,
            status: OrderStatus::Pending,
            quantity: 3,
            total: Decimal::from_str("19.99").unwrap(),
            placed_at: Some(datetime!(2024-03-01 10:30)),
        },
        Order {
            id: 2,
            customer_id: 10,
            status: OrderStatus::Shipped,
            quantity: 1,
            total: Decimal::from_str("5.00").unwrap(),
            placed_at: None,
        },
        Order {
            id: 3,
            customer_id: 11,
            status: OrderStatus::Cancelled,
            quantity: 12,
            total: Decimal::from_str("120.10").unwrap(),
            placed_at: Some(datetime!(2023-12-31 23:59:59)),
        },
    ]
}

pub fn orders(mapper: &Mapper) {
    let shape = order_fields();

    // Enumerations are read by name or by discriminant
    let order: Order = mapper
        .read(row(
            &shape,
            [
                Value::Int64(Some(1)),
                Value::Int64(Some(10)),
                Value::Varchar(Some("shipped".into())),
                Value::Int32(Some(2)),
                Value::Decimal(Some(Decimal::from_str("7.25").unwrap())),
                Value::Timestamp(Some(datetime!(2024-01-02 03:04:05))),
            ],
        ))
        .unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);
    assert_eq!(order.placed_at, Some(datetime!(2024-01-02 03:04:05)));
    let by_discriminant = fields([
        FieldDescriptor::new("id", ValueType::Int64),
        FieldDescriptor::new("status", ValueType::Int16),
    ]);
    let order: Order = mapper
        .read(row(
            &by_discriminant,
            [Value::Int64(Some(2)), Value::Int16(Some(3))],
        ))
        .unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    let error = mapper
        .read::<Order>(row(
            &by_discriminant,
            [Value::Int64(Some(2)), Value::Int16(Some(9))],
        ))
        .unwrap_err();
    assert!(
        error
            .downcast_ref::<MappingError>()
            .is_some_and(MappingError::is_conversion_error),
        "{error:#}"
    );

    // Enumerations are bound with the default storage type for enumerations
    let order = sample_orders().remove(1);
    let mut parameters: Vec<Parameter> = Vec::new();
    mapper.bind(&mut parameters, &order).unwrap();
    let status = &parameters[2];
    assert_eq!(status.name, "status");
    assert_eq!(status.value, Value::Varchar(Some("Shipped".into())));
    assert_eq!(status.storage_type, Some(StorageType::String));
    assert_eq!(parameters[5].value, Value::Timestamp(None));

    mapper
        .set_settings(MapperSettings::default().with_enum_default_storage_type(StorageType::Int32))
        .unwrap();
    parameters.clear();
    mapper.bind(&mut parameters, &order).unwrap();
    assert_eq!(parameters[2].value, Value::Int32(Some(2)));
    assert_eq!(parameters[2].storage_type, Some(StorageType::Int32));

    // A storage type on the member wins over the enumeration default
    mapper
        .add_member_storage_type::<Order>("status", StorageType::Byte, false)
        .unwrap();
    parameters.clear();
    mapper.bind(&mut parameters, &order).unwrap();
    assert_eq!(parameters[2].value, Value::UInt8(Some(2)));
    assert_eq!(parameters[2].storage_type, Some(StorageType::Byte));

    // Value handler on `total`: stored as cents in both directions
    mapper.add_value_handler::<Order>("total", Cents, false).unwrap();
    let cents = fields([
        FieldDescriptor::new("id", ValueType::Int64),
        FieldDescriptor::new("total", ValueType::Int64),
    ]);
    let routine = mapper.compile_row_to_object::<Order>(&cents).unwrap();
    let order = routine
        .call(row(&cents, [Value::Int64(Some(4)), Value::Int64(Some(12345))]))
        .unwrap();
    assert_eq!(order.total, Decimal::from_str("123.45").unwrap());
    // The handler also applies to a decimal field, coerced to its storage type first
    let order: Order = mapper
        .read(row(
            &shape,
            [
                Value::Int64(Some(5)),
                Value::Int64(Some(10)),
                Value::Varchar(Some("Pending".into())),
                Value::Int32(Some(1)),
                Value::Decimal(Some(Decimal::from(3))),
                Value::Null,
            ],
        ))
        .unwrap();
    assert_eq!(order.total, Decimal::from_str("0.03").unwrap());

    parameters.clear();
    mapper.bind(&mut parameters, &sample_orders()[0]).unwrap();
    assert_eq!(parameters[4].name, "total");
    assert_eq!(parameters[4].value, Value::Int64(Some(1999)));
    assert_eq!(parameters[4].storage_type, Some(StorageType::Int64));

    let error = mapper
        .add_value_handler::<Order>("TOTAL", Cents, false)
        .unwrap_err();
    assert!(
        error
            .downcast_ref::<MappingError>()
            .is_some_and(MappingError::is_registration_conflict),
        "{error:#}"
    );
    mapper.add_value_handler::<Order>("total", Cents, true).unwrap();
    assert!(mapper.remove_value_handler::<Order>("total"));
    let order: Order = mapper
        .read(row(&cents, [Value::Int64(Some(4)), Value::Int64(Some(12345))]))
        .unwrap();
    assert_eq!(order.total, Decimal::from(12345));
}
