mod accounts;
mod bulk;
mod conversions;
mod customers;
mod orders;

pub use accounts::*;
pub use bulk::*;
pub use conversions::*;
pub use customers::*;
pub use orders::*;

use log::LevelFilter;
use rowmap::{FieldDescriptor, RowFields, RowLabeled, Value, row_fields};
use std::env;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Row of `fields` holding `values`.
pub fn row(fields: &RowFields, values: impl IntoIterator<Item = Value>) -> RowLabeled {
    RowLabeled::new(fields.clone(), values.into_iter().collect())
}

pub fn fields(fields: impl IntoIterator<Item = FieldDescriptor>) -> RowFields {
    row_fields(fields)
}

/// Runs every scenario, each on a mapper of its own.
pub fn execute_tests() {
    customers(&Default::default());
    accounts(&Default::default());
    orders(&Default::default());
    conversions();
    bulk(&Default::default());
}
