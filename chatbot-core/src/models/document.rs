use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl DocumentStatus {
    /// pending → processing → completed | failed, and failed → pending for a retry.
    pub fn can_transition_to(self, next: DocumentStatus) -> bool {
        use DocumentStatus::*;
        matches!(
            (self, next),
            (Pending, Processing) | (Processing, Completed) | (Processing, Failed) | (Failed, Pending)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    pub id: Uuid,
    pub chatbot_id: Uuid,
    pub file_name: String,
    pub file_type: String,
    pub file_size_bytes: i64,
    pub blob_url: Option<String>,
    pub source_url: Option<String>,
    pub status: DocumentStatus,
    pub chunk_count: i32,
    pub total_tokens: i32,
    pub processed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDocument {
    pub chatbot_id: Uuid,
    pub file_name: String,
    pub file_type: String,
    pub file_size_bytes: i64,
    pub blob_url: Option<String>,
    pub source_url: Option<String>,
}
