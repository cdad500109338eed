#[cfg(test)]
mod tests {
    use rowmap::Mapper;
    use rowmap_tests::{
        accounts, bulk, conversions, customers, execute_tests, init_logs, orders,
    };

    #[test]
    fn customers_scenario() {
        init_logs();
        customers(&Mapper::default());
    }

    #[test]
    fn accounts_scenario() {
        init_logs();
        accounts(&Mapper::default());
    }

    #[test]
    fn orders_scenario() {
        init_logs();
        orders(&Mapper::default());
    }

    #[test]
    fn conversions_scenario() {
        init_logs();
        conversions();
    }

    #[test]
    fn bulk_scenario() {
        init_logs();
        bulk(&Mapper::default());
    }

    #[test]
    fn all_scenarios() {
        init_logs();
        execute_tests();
    }
}
