mod analyzer;
mod as_value;
mod bulk;
mod cache;
mod compiler;
mod convert;
mod error;
mod field;
mod mapper;
mod parameter;
mod plan;
mod resolver;
mod row;
mod rules;
mod storage;
mod type_def;
mod util;
mod value;

pub use ::anyhow::Context;
pub use analyzer::*;
pub use as_value::*;
pub use bulk::*;
pub use cache::*;
pub use compiler::*;
pub use error::*;
pub use field::*;
pub use mapper::*;
pub use parameter::*;
pub use plan::*;
pub use resolver::*;
pub use row::*;
pub use rules::*;
pub use storage::*;
pub use type_def::*;
pub use util::*;
pub use value::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
