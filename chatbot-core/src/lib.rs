pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod models;
pub mod query;
pub mod repo;
pub mod schema;
pub mod seed;

pub use config::PlatformConfig;
pub use error::{PlatformError, Result};
pub use identity::{AccountError, AccountService, NewAccount, PasswordPolicy, PgAccountService};
pub use query::Visibility;
pub use schema::{DeleteRule, Entity};
pub use seed::SeedOutcome;
