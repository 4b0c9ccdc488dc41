use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "lead_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lead {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub chatbot_id: Uuid,
    pub client_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
    pub status: LeadStatus,
    pub quality_score: i32,
    pub assigned_to_user_id: Option<Uuid>,
    pub notes: Option<String>,
    pub conversation_summary: Option<String>,
    pub detected_intent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

/// Contact fields captured from a visitor.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLead {
    pub conversation_id: Uuid,
    pub chatbot_id: Uuid,
    pub client_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
    pub conversation_summary: Option<String>,
    pub detected_intent: Option<String>,
}

/// Staff-workflow fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadQualification {
    pub quality_score: Option<i32>,
    pub assigned_to_user_id: Option<Uuid>,
    pub notes: Option<String>,
}
