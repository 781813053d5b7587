pub mod cache;
pub use cache::{CacheStore, MemoryCache, ServiceSnapshot};

pub mod catalog_service;
pub use catalog_service::{CatalogError, CatalogService};

pub mod catalog_service_impl;
pub use catalog_service_impl::SeaOrmCatalogService;

pub mod preload;
pub use preload::{PreloadSummary, preload_caches};

pub mod retry;
pub use retry::{RetryError, RetryPolicy};

pub mod search;
pub use search::{filter_by_search, matches_search};
