use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Daily rollup per client, optionally narrowed to one chatbot.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UsageMetric {
    pub id: Uuid,
    pub client_id: Uuid,
    pub chatbot_id: Option<Uuid>,
    pub date: NaiveDate,
    pub total_conversations: i32,
    pub total_messages: i32,
    pub input_tokens: i32,
    pub output_tokens: i32,
    pub total_cost: BigDecimal,
    pub leads_captured: i32,
    pub leads_converted: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUsageMetric {
    pub client_id: Uuid,
    pub chatbot_id: Option<Uuid>,
    pub date: NaiveDate,
    #[serde(default)]
    pub total_conversations: i32,
    #[serde(default)]
    pub total_messages: i32,
    #[serde(default)]
    pub input_tokens: i32,
    #[serde(default)]
    pub output_tokens: i32,
    #[serde(default)]
    pub total_cost: BigDecimal,
    #[serde(default)]
    pub leads_captured: i32,
    #[serde(default)]
    pub leads_converted: i32,
}

impl NewUsageMetric {
    pub fn empty(client_id: Uuid, chatbot_id: Option<Uuid>, date: NaiveDate) -> Self {
        Self {
            client_id,
            chatbot_id,
            date,
            total_conversations: 0,
            total_messages: 0,
            input_tokens: 0,
            output_tokens: 0,
            total_cost: BigDecimal::default(),
            leads_captured: 0,
            leads_converted: 0,
        }
    }
}
