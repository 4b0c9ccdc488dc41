pub mod chatbot;
pub mod client;
pub mod conversation;
pub mod document;
pub mod lead;
pub mod message;
pub mod usage;
pub mod user;

pub use chatbot::{Chatbot, ChatbotSettings, ChatbotStatus, NewChatbot};
pub use client::{Client, ClientPlan, ClientProfile, NewClient};
pub use conversation::{Conversation, NewConversation};
pub use document::{Document, DocumentStatus, NewDocument};
pub use lead::{Lead, LeadQualification, LeadStatus, NewLead};
pub use message::{Message, MessageRole, NewMessage};
pub use usage::{NewUsageMetric, UsageMetric};
pub use user::User;
