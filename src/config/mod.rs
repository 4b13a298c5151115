pub mod config_base;
pub mod database;
pub mod role;
pub mod vault;

pub use config_base::Config;
pub use database::{DatabaseSelection, Permission};
pub use role::RoleSpec;
pub use vault::VaultSettings;
