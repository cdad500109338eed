use crate::{fields, row};
use rowmap::{
    BindingMode, FieldDescriptor, Mapped, Mapper, MappingError, RowFields, Value, ValueType,
};
use rust_decimal::Decimal;
use std::str::FromStr;

/// No `Default`, always built through one of its constructors.
#[derive(Mapped, Debug, Clone, PartialEq)]
#[mapped(name = "Account")]
#[mapped(constructor(empty))]
#[mapped(constructor(with_id, id))]
#[mapped(constructor(new, id, owner, balance))]
pub struct Account {
    pub id: i64,
    pub owner: String,
    pub balance: Decimal,
    pub note: Option<String>,
    #[mapped(skip)]
    pub built_with: &'static str,
}

impl Account {
    pub fn empty() -> Self {
        Self {
            id: 0,
            owner: String::new(),
            balance: Decimal::ZERO,
            note: None,
            built_with: "empty",
        }
    }
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            built_with: "with_id",
            ..Self::empty()
        }
    }
    pub fn new(id: i64, owner: String, balance: Decimal) -> Self {
        Self {
            id,
            owner,
            balance,
            note: None,
            built_with: "new",
        }
    }
}

/// Single constructor with parameters and no writable member.
#[derive(Mapped, Debug, Clone, PartialEq)]
#[mapped(constructor(new, code))]
pub struct Currency {
    #[mapped(read_only)]
    pub code: String,
}

impl Currency {
    pub fn new(code: String) -> Self {
        Self { code }
    }
}

pub fn accounts(mapper: &Mapper) {
    // Every parameter of the largest constructor is present
    let full = fields([
        FieldDescriptor::new("id", ValueType::Int64),
        FieldDescriptor::new("owner", ValueType::Varchar),
        FieldDescriptor::new("balance", ValueType::Decimal),
        FieldDescriptor::new("note", ValueType::Varchar),
    ]);
    let routine = mapper.compile_row_to_object::<Account>(&full).unwrap();
    assert_eq!(routine.plan().mode, BindingMode::ConstructorArgs);
    assert_eq!(routine.plan().arity(), 3);
    let account = routine
        .call(row(
            &full,
            [
                Value::Int64(Some(10)),
                Value::Varchar(Some("Ada".into())),
                Value::Decimal(Some(Decimal::from_str("12.50").unwrap())),
                Value::Varchar(Some("vip".into())),
            ],
        ))
        .unwrap();
    assert_eq!(account.built_with, "new");
    assert_eq!(account.balance, Decimal::from_str("12.5").unwrap());
    assert_eq!(account.note.as_deref(), Some("vip"));

    // Only the id, the remaining fields are assigned to members
    let partial = fields([
        FieldDescriptor::new("note", ValueType::Varchar),
        FieldDescriptor::new("OWNER", ValueType::Varchar),
        FieldDescriptor::new("id", ValueType::Int32),
    ]);
    let account: Account = mapper
        .read(row(
            &partial,
            [
                Value::Varchar(None),
                Value::Varchar(Some("Grace".into())),
                Value::Int32(Some(11)),
            ],
        ))
        .unwrap();
    assert_eq!(account.built_with, "with_id");
    assert_eq!(account.id, 11);
    assert_eq!(account.owner, "Grace");
    assert_eq!(account.note, None);

    // No constructor parameter, the no-argument constructor is used
    let notes = fields([FieldDescriptor::new("note", ValueType::Varchar)]);
    let account: Account = mapper
        .read(row(&notes, [Value::Varchar(Some("memo".into()))]))
        .unwrap();
    assert_eq!(account.built_with, "empty");
    assert_eq!(account.note.as_deref(), Some("memo"));

    // Nothing binds
    let unrelated = fields([FieldDescriptor::new("unrelated", ValueType::Int32)]);
    for shape in [unrelated.clone(), RowFields::from([])] {
        let error = mapper.compile_row_to_object::<Account>(&shape).unwrap_err();
        assert!(
            error
                .downcast_ref::<MappingError>()
                .is_some_and(MappingError::is_binding_error),
            "{error:#}"
        );
        assert!(error.to_string().contains("no bindings found"), "{error:#}");
    }
    let error = mapper
        .compile_row_to_object::<Currency>(&unrelated)
        .unwrap_err();
    assert!(
        error
            .downcast_ref::<MappingError>()
            .is_some_and(MappingError::is_binding_error),
        "{error:#}"
    );
    assert!(error.to_string().contains("no bindings found"), "{error:#}");

    // Read-only members are still constructor arguments
    let codes = fields([FieldDescriptor::new("code", ValueType::Varchar)]);
    let currency: Currency = mapper
        .read(row(&codes, [Value::Varchar(Some("EUR".into()))]))
        .unwrap();
    assert_eq!(currency, Currency::new("EUR".into()));

    // A scalar target takes exactly one field
    let count = fields([FieldDescriptor::new("count", ValueType::Int64)]);
    let value: u32 = mapper.read(row(&count, [Value::Int64(Some(42))])).unwrap();
    assert_eq!(value, 42);
    let value: Option<String> = mapper.read(row(&count, [Value::Int64(None)])).unwrap();
    assert_eq!(value, None);
    let error = mapper.compile_row_to_object::<i64>(&full).unwrap_err();
    assert!(
        error
            .downcast_ref::<MappingError>()
            .is_some_and(MappingError::is_shape_mismatch),
        "{error:#}"
    );

    // Failed compilations are not cached
    let entries = mapper.cache_stats().entries;
    assert!(mapper.compile_row_to_object::<i64>(&full).is_err());
    assert_eq!(mapper.cache_stats().entries, entries);
}
