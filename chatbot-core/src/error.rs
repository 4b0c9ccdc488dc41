use thiserror::Error;
use uuid::Uuid;

use crate::identity::AccountError;
use crate::schema::Entity;

pub type Result<T, E = PlatformError> = std::result::Result<T, E>;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: Uuid },

    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    #[error("Cannot delete {entity} {id}: {}", describe_dependents(.dependents))]
    Restricted {
        entity: Entity,
        id: Uuid,
        dependents: Vec<(Entity, i64)>,
    },

    #[error("Invalid transition for {entity} {id}: {detail}")]
    InvalidTransition {
        entity: Entity,
        id: Uuid,
        detail: String,
    },

    #[error("Conversation {conversation_id} is already linked to lead {lead_id}")]
    LeadAlreadyLinked { conversation_id: Uuid, lead_id: Uuid },

    #[error("Lead {lead_id} was not captured in conversation {conversation_id}")]
    LeadMismatch { conversation_id: Uuid, lead_id: Uuid },

    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    #[error("Other error: {0}")]
    Other(String),
}

impl PlatformError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }
}

/// Constraint violations are lifted out of `sqlx::Error` so callers can match
/// on them without inspecting SQLSTATE codes.
impl From<sqlx::Error> for PlatformError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let constraint = db.constraint().unwrap_or("unknown").to_string();
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return Self::UniqueViolation { constraint },
                Some(FOREIGN_KEY_VIOLATION) => return Self::ForeignKeyViolation { constraint },
                _ => {}
            }
        }
        Self::Database(err)
    }
}

fn describe_dependents(dependents: &[(Entity, i64)]) -> String {
    let parts: Vec<String> = dependents
        .iter()
        .map(|(entity, count)| format!("{} dependent {}", count, entity.table()))
        .collect();
    parts.join(", ")
}
