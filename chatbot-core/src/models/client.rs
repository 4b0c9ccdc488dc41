use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    pub id: Uuid,
    pub company_name: String,
    pub email: String,
    pub contact_person: String,
    pub phone: String,
    pub address: Option<String>,
    pub is_active: bool,
    pub max_chatbots: i32,
    pub max_documents_per_chatbot: i32,
    pub monthly_token_limit: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewClient {
    pub company_name: String,
    pub email: String,
    pub contact_person: String,
    pub phone: String,
    pub address: Option<String>,
    pub plan: ClientPlan,
}

/// Plan limits attached to a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPlan {
    pub max_chatbots: i32,
    pub max_documents_per_chatbot: i32,
    pub monthly_token_limit: i32,
}

impl Default for ClientPlan {
    fn default() -> Self {
        Self {
            max_chatbots: 5,
            max_documents_per_chatbot: 100,
            monthly_token_limit: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientProfile {
    pub company_name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}
