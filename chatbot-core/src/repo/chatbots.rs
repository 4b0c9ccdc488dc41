use sqlx::PgPool;
use uuid::Uuid;

use super::found;
use crate::error::Result;
use crate::models::chatbot::generate_collection_name;
use crate::models::{Chatbot, ChatbotSettings, ChatbotStatus, NewChatbot};
use crate::query::{self, Update, Visibility};
use crate::schema::Entity;

pub async fn insert(pool: &PgPool, new: &NewChatbot) -> Result<Chatbot> {
    let collection = new
        .collection_name
        .clone()
        .unwrap_or_else(generate_collection_name);
    let s = &new.settings;
    let chatbot = sqlx::query_as::<_, Chatbot>(
        r#"
        INSERT INTO chatbots
            (id, client_id, name, description, api_key_encrypted, model, system_prompt,
             max_tokens, temperature, top_k, primary_color, bot_name, avatar_url,
             welcome_message, enable_lead_capture, rate_limit_per_minute, collection_name)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.client_id)
    .bind(&new.name)
    .bind(&new.description)
    .bind(&new.api_key_encrypted)
    .bind(&s.model)
    .bind(&s.system_prompt)
    .bind(s.max_tokens)
    .bind(s.temperature)
    .bind(s.top_k)
    .bind(&s.primary_color)
    .bind(&s.bot_name)
    .bind(&s.avatar_url)
    .bind(&s.welcome_message)
    .bind(s.enable_lead_capture)
    .bind(s.rate_limit_per_minute)
    .bind(&collection)
    .fetch_one(pool)
    .await?;
    tracing::debug!("Inserted chatbot {} ({})", chatbot.id, chatbot.collection_name);
    Ok(chatbot)
}

pub async fn find(pool: &PgPool, id: Uuid, visibility: Visibility) -> Result<Option<Chatbot>> {
    let mut qb = query::select(Entity::Chatbot, visibility);
    qb.push(" AND id = ").push_bind(id);
    Ok(qb.build_query_as().fetch_optional(pool).await?)
}

pub async fn list(pool: &PgPool, visibility: Visibility) -> Result<Vec<Chatbot>> {
    let mut qb = query::select(Entity::Chatbot, visibility);
    qb.push(" ORDER BY created_at, id");
    Ok(qb.build_query_as().fetch_all(pool).await?)
}

pub async fn list_for_client(
    pool: &PgPool,
    client_id: Uuid,
    visibility: Visibility,
) -> Result<Vec<Chatbot>> {
    let mut qb = query::select(Entity::Chatbot, visibility);
    qb.push(" AND client_id = ")
        .push_bind(client_id)
        .push(" ORDER BY created_at, id");
    Ok(qb.build_query_as().fetch_all(pool).await?)
}

/// Replaces the generation parameters and branding in one write.
pub async fn update_settings(pool: &PgPool, id: Uuid, s: &ChatbotSettings) -> Result<Chatbot> {
    let row = Update::new(Entity::Chatbot)
        .set("model", s.model.clone())
        .set("system_prompt", s.system_prompt.clone())
        .set("max_tokens", s.max_tokens)
        .set("temperature", s.temperature)
        .set("top_k", s.top_k)
        .set("primary_color", s.primary_color.clone())
        .set("bot_name", s.bot_name.clone())
        .set("avatar_url", s.avatar_url.clone())
        .set("welcome_message", s.welcome_message.clone())
        .set("enable_lead_capture", s.enable_lead_capture)
        .set("rate_limit_per_minute", s.rate_limit_per_minute)
        .returning(pool, id, Visibility::Live)
        .await?;
    found(row, Entity::Chatbot, id)
}

pub async fn set_status(pool: &PgPool, id: Uuid, status: ChatbotStatus) -> Result<Chatbot> {
    let row = Update::new(Entity::Chatbot)
        .set("status", status)
        .returning(pool, id, Visibility::Live)
        .await?;
    found(row, Entity::Chatbot, id)
}

pub async fn count(pool: &PgPool, visibility: Visibility) -> Result<i64> {
    query::fetch_count(pool, query::count(Entity::Chatbot, visibility)).await
}
