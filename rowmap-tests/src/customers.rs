use crate::{fields, row};
use rowmap::{
    BindingMode, FieldDescriptor, Mapped, Mapper, MappingError, ObjectHook, Parameter, Result,
    StorageType, Value, ValueType,
};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Mapped, Default, Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: i64,
    #[mapped(name = "customer_name")]
    pub name: String,
    pub email: Option<String>,
    pub active: bool,
    pub external_id: Option<Uuid>,
    #[mapped(read_only)]
    pub segment: String,
    #[mapped(skip)]
    pub score: Option<f64>,
}

pub struct TrimNames;

impl ObjectHook<Customer> for TrimNames {
    fn after_read(&self, mut entity: Customer) -> Result<Customer> {
        entity.name = entity.name.trim().to_owned();
        Ok(entity)
    }
}

pub fn customers(mapper: &Mapper) {
    let shape = fields([
        FieldDescriptor::new("id", ValueType::Int64).primary(),
        FieldDescriptor::new("customer_name", ValueType::Varchar).not_null(),
        FieldDescriptor::new("email", ValueType::Varchar),
        FieldDescriptor::new("active", ValueType::Boolean),
        FieldDescriptor::new("external_id", ValueType::Uuid),
        FieldDescriptor::new("segment", ValueType::Varchar),
    ]);
    let external_id = Uuid::new_v4();

    // Member initialization, the read-only member is never assigned
    let routine = mapper.compile_row_to_object::<Customer>(&shape).unwrap();
    assert_eq!(routine.plan().mode, BindingMode::MemberInit);
    let customer = routine
        .call(row(
            &shape,
            [
                Value::Int64(Some(1)),
                Value::Varchar(Some(" Ada ".into())),
                Value::Varchar(Some("ada@example.com".into())),
                Value::Boolean(Some(true)),
                Value::Uuid(Some(external_id)),
                Value::Varchar(Some("retail".into())),
            ],
        ))
        .unwrap();
    assert_eq!(
        customer,
        Customer {
            id: 1,
            name: " Ada ".into(),
            email: Some("ada@example.com".into()),
            active: true,
            external_id: Some(external_id),
            segment: String::new(),
            score: None,
        }
    );

    // Same shape, same routine
    let again = mapper.compile_row_to_object::<Customer>(&shape).unwrap();
    assert!(Arc::ptr_eq(&routine, &again));
    let stats = mapper.cache_stats();
    assert_eq!(stats.compilations, 1);
    assert_eq!(stats.entries, 1);

    // NULL into a nullable member is None, into a non-nullable one the zero value
    let customer: Customer = mapper
        .read(row(
            &shape,
            [
                Value::Int64(Some(2)),
                Value::Varchar(Some("Grace".into())),
                Value::Varchar(None),
                Value::Null,
                Value::Uuid(None),
                Value::Null,
            ],
        ))
        .unwrap();
    assert_eq!(customer.email, None);
    assert!(!customer.active);
    assert_eq!(customer.external_id, None);

    // Fields are matched by alias, case-insensitively, unknown fields are ignored
    let aliased = fields([
        FieldDescriptor::new("c", ValueType::Int32).with_alias("ID"),
        FieldDescriptor::new("Customer_Name", ValueType::Varchar),
        FieldDescriptor::new("unrelated", ValueType::Float64),
    ]);
    let customer: Customer = mapper
        .read(row(
            &aliased,
            [
                Value::Int32(Some(3)),
                Value::Varchar(Some("Linus".into())),
                Value::Float64(Some(1.5)),
            ],
        ))
        .unwrap();
    assert_eq!(customer.id, 3);
    assert_eq!(customer.name, "Linus");

    // Object hook, registering it drops the cached routines
    mapper.add_object_hook::<Customer>(TrimNames, false).unwrap();
    assert_eq!(mapper.cache_stats().entries, 0);
    let customer: Customer = mapper
        .read(row(
            &shape,
            [
                Value::Int64(Some(4)),
                Value::Varchar(Some("  Barbara ".into())),
                Value::Null,
                Value::Boolean(Some(false)),
                Value::Null,
                Value::Null,
            ],
        ))
        .unwrap();
    assert_eq!(customer.name, "Barbara");
    let error = mapper
        .add_object_hook::<Customer>(TrimNames, false)
        .unwrap_err();
    assert!(
        error
            .downcast_ref::<MappingError>()
            .is_some_and(MappingError::is_registration_conflict),
        "{error:#}"
    );

    // Parameters in member order, read-only members included, skipped ones not
    let customer = Customer {
        id: 5,
        name: "Edsger".into(),
        email: None,
        active: true,
        external_id: None,
        segment: "wholesale".into(),
        score: Some(0.5),
    };
    let mut parameters: Vec<Parameter> = Vec::new();
    mapper.bind(&mut parameters, &customer).unwrap();
    let names: Vec<_> = parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        ["id", "customer_name", "email", "active", "external_id", "segment"]
    );
    assert_eq!(parameters[1].value, Value::Varchar(Some("Edsger".into())));
    assert_eq!(parameters[1].storage_type, Some(StorageType::String));
    assert_eq!(parameters[2].value, Value::Varchar(None));
    assert_eq!(parameters[4].storage_type, Some(StorageType::Guid));

    // Parameters in store order, storage type rule on a value type
    mapper
        .add_type_storage_type(ValueType::Varchar, StorageType::AnsiString, false)
        .unwrap();
    let store = fields([
        FieldDescriptor::new("segment", ValueType::Varchar),
        FieldDescriptor::new("customer_name", ValueType::Varchar),
        FieldDescriptor::new("id", ValueType::Int64).primary(),
    ]);
    let mut command = rowmap::Command::new("INSERT INTO customer VALUES (?, ?, ?)");
    mapper
        .bind_to_fields(&mut command, &customer, &store)
        .unwrap();
    let names: Vec<_> = command.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        ["segment", "customer_name", "id", "email", "active", "external_id"]
    );
    assert_eq!(
        command.parameter("CUSTOMER_NAME").and_then(|p| p.storage_type),
        Some(StorageType::AnsiString)
    );
    assert_eq!(
        command.parameter("id").and_then(|p| p.storage_type),
        Some(StorageType::Int64)
    );
}
