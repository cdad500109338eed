#[cfg(test)]
mod tests {
    use rowmap::{Mapper, Result, Value};
    use rowmap_tests::{Order, init_logs, order_fields, row};
    use rust_decimal::Decimal;
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_compilation() {
        init_logs();
        let mapper = Arc::new(Mapper::default());
        let shape = order_fields();
        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let mapper = mapper.clone();
                let shape = shape.clone();
                tokio::task::spawn_blocking(move || -> Result<_> {
                    let routine = mapper.compile_row_to_object::<Order>(&shape)?;
                    let order = routine.call(row(
                        &shape,
                        [
                            Value::Int64(Some(i)),
                            Value::Int64(Some(1)),
                            Value::Varchar(Some("Pending".into())),
                            Value::Int32(Some(1)),
                            Value::Decimal(Some(Decimal::ONE)),
                            Value::Null,
                        ],
                    ))?;
                    assert_eq!(order.id, i);
                    Ok(routine)
                })
            })
            .collect();
        let mut routines = Vec::with_capacity(tasks.len());
        for task in tasks {
            routines.push(task.await.expect("Task panicked").expect("Mapping failed"));
        }
        assert!(routines.iter().all(|r| Arc::ptr_eq(r, &routines[0])));
        let stats = mapper.cache_stats();
        assert_eq!(stats.entries, 1);
        assert!(stats.compilations >= 1);
    }

    #[tokio::test]
    async fn global_mapper() {
        init_logs();
        let shape = order_fields();
        let first = Mapper::global()
            .compile_row_to_object::<Order>(&shape)
            .unwrap();
        let second = Mapper::global()
            .compile_row_to_object::<Order>(&shape)
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
