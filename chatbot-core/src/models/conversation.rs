use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub chatbot_id: Uuid,
    pub session_id: String,
    pub visitor_ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer_url: Option<String>,
    pub visitor_country: Option<String>,
    pub message_count: i32,
    pub total_input_tokens: i32,
    pub total_output_tokens: i32,
    pub estimated_cost: BigDecimal,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub lead_captured: bool,
    pub lead_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

impl Conversation {
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// Visitor metadata captured on the first message of a session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewConversation {
    pub chatbot_id: Uuid,
    pub session_id: String,
    pub visitor_ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer_url: Option<String>,
    pub visitor_country: Option<String>,
}
