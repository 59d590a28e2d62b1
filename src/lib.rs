pub mod data;
pub mod pipeline;
pub mod report;

pub use data::filter::FilterCriteria;
pub use data::model::{RawTable, SalesRecord, ValidatedTable};
pub use data::schema::{validate, SchemaError};
pub use pipeline::{run, Dashboard, EmptyResult};
