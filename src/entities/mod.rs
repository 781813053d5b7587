pub mod prelude;

pub mod ai_services;
pub mod categories;
pub mod features;
pub mod models;
pub mod service_categories;
pub mod service_types;
pub mod tools;
pub mod use_cases;
