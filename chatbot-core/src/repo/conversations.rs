use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::found;
use crate::error::{PlatformError, Result};
use crate::models::{Conversation, Lead, Message, NewConversation, NewMessage};
use crate::query::{self, Update, Visibility};
use crate::schema::Entity;

pub async fn start(pool: &PgPool, new: &NewConversation) -> Result<Conversation> {
    let conversation = sqlx::query_as::<_, Conversation>(
        r#"
        INSERT INTO conversations
            (id, chatbot_id, session_id, visitor_ip, user_agent, referrer_url, visitor_country)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.chatbot_id)
    .bind(&new.session_id)
    .bind(&new.visitor_ip)
    .bind(&new.user_agent)
    .bind(&new.referrer_url)
    .bind(&new.visitor_country)
    .fetch_one(pool)
    .await?;
    tracing::debug!(
        "Started conversation {} for chatbot {} (session {})",
        conversation.id,
        conversation.chatbot_id,
        conversation.session_id
    );
    Ok(conversation)
}

pub async fn find(pool: &PgPool, id: Uuid, visibility: Visibility) -> Result<Option<Conversation>> {
    let mut qb = query::select(Entity::Conversation, visibility);
    qb.push(" AND id = ").push_bind(id);
    Ok(qb.build_query_as().fetch_optional(pool).await?)
}

/// Most recent conversation of a widget session.
pub async fn find_by_session(
    pool: &PgPool,
    chatbot_id: Uuid,
    session_id: &str,
) -> Result<Option<Conversation>> {
    let mut qb = query::select(Entity::Conversation, Visibility::Live);
    qb.push(" AND chatbot_id = ")
        .push_bind(chatbot_id)
        .push(" AND session_id = ")
        .push_bind(session_id)
        .push(" ORDER BY created_at DESC LIMIT 1");
    Ok(qb.build_query_as().fetch_optional(pool).await?)
}

pub async fn list_for_chatbot(
    pool: &PgPool,
    chatbot_id: Uuid,
    visibility: Visibility,
) -> Result<Vec<Conversation>> {
    let mut qb = query::select(Entity::Conversation, visibility);
    qb.push(" AND chatbot_id = ")
        .push_bind(chatbot_id)
        .push(" ORDER BY created_at DESC, id");
    Ok(qb.build_query_as().fetch_all(pool).await?)
}

async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Conversation> {
    let mut qb = query::select(Entity::Conversation, Visibility::Live);
    qb.push(" AND id = ").push_bind(id).push(" FOR UPDATE");
    let row: Option<Conversation> = qb.build_query_as().fetch_optional(conn).await?;
    found(row, Entity::Conversation, id)
}

/// Appends a turn and rolls its token and cost accounting into the
/// conversation counters, atomically.
pub async fn record_message(pool: &PgPool, conversation_id: Uuid, new: &NewMessage) -> Result<Message> {
    let mut tx = pool.begin().await?;
    let conversation = lock(&mut *tx, conversation_id).await?;
    if !conversation.is_open() {
        return Err(PlatformError::InvalidTransition {
            entity: Entity::Conversation,
            id: conversation_id,
            detail: "conversation has ended".to_string(),
        });
    }

    let message = sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages
            (id, conversation_id, role, content, input_tokens, output_tokens, cost,
             retrieved_context, source_documents)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(conversation_id)
    .bind(new.role)
    .bind(&new.content)
    .bind(new.input_tokens)
    .bind(new.output_tokens)
    .bind(&new.cost)
    .bind(&new.retrieved_context)
    .bind(&new.source_documents)
    .fetch_one(&mut *tx)
    .await?;

    Update::new(Entity::Conversation)
        .increment("message_count", 1_i32)
        .increment("total_input_tokens", new.input_tokens)
        .increment("total_output_tokens", new.output_tokens)
        .increment("estimated_cost", new.cost.clone())
        .execute(&mut *tx, conversation_id, Visibility::Live)
        .await?;

    tx.commit().await?;
    Ok(message)
}

/// Sets the end time and duration. A conversation closes once.
pub async fn close(pool: &PgPool, id: Uuid) -> Result<Conversation> {
    let mut tx = pool.begin().await?;
    let conversation = lock(&mut *tx, id).await?;
    if !conversation.is_open() {
        return Err(PlatformError::InvalidTransition {
            entity: Entity::Conversation,
            id,
            detail: "conversation already ended".to_string(),
        });
    }
    let row = Update::new(Entity::Conversation)
        .set_expr("ended_at", "now()")
        .set_expr(
            "duration_seconds",
            "CAST(EXTRACT(EPOCH FROM (now() - created_at)) AS BIGINT)",
        )
        .returning(&mut *tx, id, Visibility::Live)
        .await?;
    tx.commit().await?;
    found(row, Entity::Conversation, id)
}

/// Links a captured lead. A conversation holds at most one lead, and the
/// unique index on `lead_id` keeps a lead from being linked twice. The lead
/// must have been captured in this conversation.
pub async fn link_lead(pool: &PgPool, conversation_id: Uuid, lead_id: Uuid) -> Result<Conversation> {
    let mut tx = pool.begin().await?;
    let conversation = lock(&mut *tx, conversation_id).await?;
    if let Some(existing) = conversation.lead_id {
        return Err(PlatformError::LeadAlreadyLinked {
            conversation_id,
            lead_id: existing,
        });
    }

    let mut qb = query::select(Entity::Lead, Visibility::Live);
    qb.push(" AND id = ").push_bind(lead_id).push(" FOR UPDATE");
    let lead: Option<Lead> = qb.build_query_as().fetch_optional(&mut *tx).await?;
    let lead = found(lead, Entity::Lead, lead_id)?;
    if lead.conversation_id != conversation_id || lead.chatbot_id != conversation.chatbot_id {
        return Err(PlatformError::LeadMismatch {
            conversation_id,
            lead_id,
        });
    }

    let row = Update::new(Entity::Conversation)
        .set("lead_id", lead_id)
        .set("lead_captured", true)
        .returning(&mut *tx, conversation_id, Visibility::Live)
        .await?;
    tx.commit().await?;
    found(row, Entity::Conversation, conversation_id)
}

pub async fn count(pool: &PgPool, visibility: Visibility) -> Result<i64> {
    query::fetch_count(pool, query::count(Entity::Conversation, visibility)).await
}
