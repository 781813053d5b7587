pub use super::ai_services::Entity as AiServices;
pub use super::categories::Entity as Categories;
pub use super::features::Entity as Features;
pub use super::models::Entity as Models;
pub use super::service_categories::Entity as ServiceCategories;
pub use super::service_types::Entity as ServiceTypes;
pub use super::tools::Entity as Tools;
pub use super::use_cases::Entity as UseCases;
