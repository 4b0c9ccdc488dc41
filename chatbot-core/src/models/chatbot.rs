use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "chatbot_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChatbotStatus {
    Draft,
    Active,
    Paused,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Chatbot {
    pub id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub description: String,
    pub status: ChatbotStatus,
    #[serde(skip_serializing, default)]
    pub api_key_encrypted: String,
    pub model: String,
    pub system_prompt: String,
    pub max_tokens: i32,
    pub temperature: f64,
    pub top_k: i32,
    pub primary_color: String,
    pub bot_name: String,
    pub avatar_url: Option<String>,
    pub welcome_message: String,
    pub enable_lead_capture: bool,
    pub rate_limit_per_minute: i32,
    pub collection_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewChatbot {
    pub client_id: Uuid,
    pub name: String,
    pub description: String,
    pub api_key_encrypted: String,
    /// Vector-store collection; generated as `chatbot_<uuid>` when absent.
    pub collection_name: Option<String>,
    pub settings: ChatbotSettings,
}

impl NewChatbot {
    pub fn new(client_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            client_id,
            name: name.into(),
            description: String::new(),
            api_key_encrypted: String::new(),
            collection_name: None,
            settings: ChatbotSettings::default(),
        }
    }
}

/// Generation parameters and branding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatbotSettings {
    pub model: String,
    pub system_prompt: String,
    pub max_tokens: i32,
    pub temperature: f64,
    pub top_k: i32,
    pub primary_color: String,
    pub bot_name: String,
    pub avatar_url: Option<String>,
    pub welcome_message: String,
    pub enable_lead_capture: bool,
    pub rate_limit_per_minute: i32,
}

impl Default for ChatbotSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            system_prompt: "You are a helpful AI assistant.".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            top_k: 5,
            primary_color: "#007bff".to_string(),
            bot_name: "Assistant".to_string(),
            avatar_url: None,
            welcome_message: "Hello! How can I help you today?".to_string(),
            enable_lead_capture: true,
            rate_limit_per_minute: 100,
        }
    }
}

pub fn generate_collection_name() -> String {
    format!("chatbot_{}", Uuid::new_v4().simple())
}
