//! Startup bootstrap: migrations plus a one-time demo tenant.
//!
//! Each insert commits on its own so a failure part-way leaves a consistent
//! prefix (client, then user, then chatbot, then documents). The guard looks
//! at soft-deleted clients too, so an existing but deleted demo tenant never
//! triggers a second insert of the same email.

use sqlx::PgPool;
use uuid::Uuid;

use crate::config::SeedConfig;
use crate::db;
use crate::error::Result;
use crate::identity::{AccountService, NewAccount};
use crate::models::{ChatbotSettings, ClientPlan, NewChatbot, NewClient, NewDocument};
use crate::query::Visibility;
use crate::repo;

pub const DEMO_EMAIL: &str = "admin@acme.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Seeding is switched off; only migrations ran.
    Disabled,
    /// A client already exists; nothing was written.
    AlreadySeeded,
    Seeded(SeedReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub client_id: Uuid,
    pub user_id: Uuid,
    pub chatbot_id: Uuid,
    pub document_ids: Vec<Uuid>,
}

/// Applies pending migrations, then seeds the demo tenant if the store is empty.
/// Errors are logged here and returned; startup must not continue past them.
pub async fn run(
    pool: &PgPool,
    accounts: &dyn AccountService,
    config: &SeedConfig,
) -> Result<SeedOutcome> {
    match bootstrap(pool, accounts, config).await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            tracing::error!(error = ?e, "An error occurred seeding the database");
            Err(e)
        }
    }
}

async fn bootstrap(
    pool: &PgPool,
    accounts: &dyn AccountService,
    config: &SeedConfig,
) -> Result<SeedOutcome> {
    db::migrate(pool).await?;
    tracing::info!("Database migrations applied successfully");

    if !config.enabled {
        tracing::info!("Seeding disabled - skipping");
        return Ok(SeedOutcome::Disabled);
    }

    if repo::clients::count(pool, Visibility::WithDeleted).await? > 0 {
        tracing::info!("Database already seeded - skipping");
        return Ok(SeedOutcome::AlreadySeeded);
    }

    tracing::info!("Starting database seeding...");

    let client = repo::clients::insert(pool, &demo_client()).await?;
    tracing::info!("Created client: {}", client.company_name);

    let user = accounts
        .create_account(
            NewAccount {
                client_id: client.id,
                email: DEMO_EMAIL.to_string(),
                first_name: "John".to_string(),
                last_name: "Doe".to_string(),
                phone_number: Some("+1 (555) 123-4567".to_string()),
                email_confirmed: true,
            },
            &config.demo_password,
        )
        .await?;
    tracing::info!("Created user: {}", user.email);

    let chatbot = repo::chatbots::insert(pool, &demo_chatbot(client.id)).await?;
    tracing::info!("Created chatbot: {}", chatbot.name);

    let mut document_ids = Vec::new();
    for doc in demo_documents(chatbot.id) {
        document_ids.push(repo::documents::insert(pool, &doc).await?.id);
    }
    tracing::info!("Created {} sample documents", document_ids.len());

    tracing::info!("Database seeding completed, demo login: {}", user.email);

    Ok(SeedOutcome::Seeded(SeedReport {
        client_id: client.id,
        user_id: user.id,
        chatbot_id: chatbot.id,
        document_ids,
    }))
}

fn demo_client() -> NewClient {
    NewClient {
        company_name: "Acme Corporation".to_string(),
        email: DEMO_EMAIL.to_string(),
        contact_person: "John Doe".to_string(),
        phone: "+1 (555) 123-4567".to_string(),
        address: Some("123 Tech Street, Silicon Valley, CA 94025".to_string()),
        plan: ClientPlan {
            max_chatbots: 10,
            max_documents_per_chatbot: 200,
            monthly_token_limit: 5_000_000,
        },
    }
}

fn demo_chatbot(client_id: Uuid) -> NewChatbot {
    NewChatbot {
        client_id,
        name: "Customer Support Bot".to_string(),
        description: "AI-powered customer support assistant".to_string(),
        api_key_encrypted: "TEMP_PLACEHOLDER".to_string(),
        collection_name: None,
        settings: ChatbotSettings {
            system_prompt: "You are a helpful customer support assistant.".to_string(),
            bot_name: "Acme Support Bot".to_string(),
            welcome_message: "Hello! 👋 How can I help you today?".to_string(),
            ..ChatbotSettings::default()
        },
    }
}

fn demo_documents(chatbot_id: Uuid) -> [NewDocument; 2] {
    [
        NewDocument {
            chatbot_id,
            file_name: "product-catalog.pdf".to_string(),
            file_type: "pdf".to_string(),
            file_size_bytes: 1024 * 500,
            blob_url: None,
            source_url: None,
        },
        NewDocument {
            chatbot_id,
            file_name: "faq-document.docx".to_string(),
            file_type: "docx".to_string(),
            file_size_bytes: 1024 * 200,
            blob_url: None,
            source_url: None,
        },
    ]
}
