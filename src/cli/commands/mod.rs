mod categories;
mod import;
mod list;
mod show;

pub use categories::cmd_categories;
pub use import::cmd_import;
pub use list::cmd_list_services;
pub use show::cmd_show_service;
