//! Catalog query building, row shapes and row-to-model mapping.

pub mod mappers;
pub mod query;
pub mod rows;
pub mod source;

pub use query::{Pagination, ServiceFilters};
pub use source::CatalogSource;
