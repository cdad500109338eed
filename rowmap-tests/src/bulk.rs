use crate::{Order, fields, order_fields, row, sample_orders};
use rowmap::{BulkTable, FieldDescriptor, Mapper, MappingError, Result, Value, ValueType};

pub fn bulk(mapper: &Mapper) {
    let orders = sample_orders();

    // Entities to rows and back
    let table = BulkTable::from_entities(mapper, &orders, &order_fields()).unwrap();
    assert_eq!(table.len(), orders.len());
    let names: Vec<_> = table.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        ["id", "customer_id", "status", "quantity", "total", "placed_at"]
    );
    assert!(table.fields()[0].is_primary);
    assert_eq!(table.fields()[2].value_type, ValueType::Varchar);
    assert_eq!(table.rows()[1][2], Value::Varchar(Some("Shipped".into())));
    let read = mapper
        .read_all::<Order>(table.into_rows())
        .collect::<Result<Vec<_>>>()
        .unwrap();
    assert_eq!(read, orders);

    // Rows differing only in the casing of their names share one routine
    let upper = fields([
        FieldDescriptor::new("ID", ValueType::Int64),
        FieldDescriptor::new("Quantity", ValueType::Int32),
    ]);
    let lower = fields([
        FieldDescriptor::new("id", ValueType::Int64),
        FieldDescriptor::new("quantity", ValueType::Int32),
    ]);
    let stats = mapper.cache_stats();
    let read = mapper
        .read_all::<Order>([
            row(&upper, [Value::Int64(Some(7)), Value::Int32(Some(2))]),
            row(&lower, [Value::Int64(Some(8)), Value::Int32(Some(4))]),
            row(&upper, [Value::Int64(Some(9)), Value::Int32(Some(6))]),
        ])
        .collect::<Result<Vec<_>>>()
        .unwrap();
    assert_eq!(
        read.iter().map(|o| (o.id, o.quantity)).collect::<Vec<_>>(),
        [(7, 2), (8, 4), (9, 6)]
    );
    let after = mapper.cache_stats();
    assert_eq!(
        after.compilations + after.hits,
        stats.compilations + stats.hits + 1,
        "the routine is looked up once"
    );

    // Key tables use the primary field, or the identity one without it
    let store = fields([
        FieldDescriptor::new("code", ValueType::Varchar),
        FieldDescriptor::new("id", ValueType::Int64).identity(),
    ]);
    let keys = BulkTable::single_column(
        &store,
        [Value::Int32(Some(1)), Value::Varchar(Some("2".into()))],
    )
    .unwrap();
    assert_eq!(keys.fields().len(), 1);
    assert_eq!(keys.fields()[0].name, "id");
    assert_eq!(keys.rows()[0][0], Value::Int64(Some(1)));
    assert_eq!(keys.rows()[1][0], Value::Int64(Some(2)));

    let store = fields([FieldDescriptor::new("code", ValueType::Varchar)]);
    let error = BulkTable::single_column(&store, [Value::Int32(Some(1))]).unwrap_err();
    assert!(
        error
            .downcast_ref::<MappingError>()
            .is_some_and(MappingError::is_binding_error),
        "{error:#}"
    );

    let mut table = BulkTable::new(order_fields());
    assert!(table.is_empty());
    assert!(table.push(vec![Value::Int64(Some(1))]).is_err());
}
