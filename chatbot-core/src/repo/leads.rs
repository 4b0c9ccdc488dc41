use sqlx::PgPool;
use uuid::Uuid;

use super::found;
use crate::error::Result;
use crate::models::{Lead, LeadQualification, LeadStatus, NewLead};
use crate::query::{self, Update, Visibility};
use crate::schema::Entity;

/// Stores a captured visitor contact. Linking it to the conversation is a
/// separate step, see [`super::conversations::link_lead`].
pub async fn capture(pool: &PgPool, new: &NewLead) -> Result<Lead> {
    let lead = sqlx::query_as::<_, Lead>(
        r#"
        INSERT INTO leads
            (id, conversation_id, chatbot_id, client_id, email, name, phone, company,
             message, conversation_summary, detected_intent)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.conversation_id)
    .bind(new.chatbot_id)
    .bind(new.client_id)
    .bind(&new.email)
    .bind(&new.name)
    .bind(&new.phone)
    .bind(&new.company)
    .bind(&new.message)
    .bind(&new.conversation_summary)
    .bind(&new.detected_intent)
    .fetch_one(pool)
    .await?;
    tracing::info!("Captured lead {} for client {}", lead.id, lead.client_id);
    Ok(lead)
}

pub async fn find(pool: &PgPool, id: Uuid, visibility: Visibility) -> Result<Option<Lead>> {
    let mut qb = query::select(Entity::Lead, visibility);
    qb.push(" AND id = ").push_bind(id);
    Ok(qb.build_query_as().fetch_optional(pool).await?)
}

pub async fn list_for_client(
    pool: &PgPool,
    client_id: Uuid,
    status: Option<LeadStatus>,
    visibility: Visibility,
) -> Result<Vec<Lead>> {
    let mut qb = query::select(Entity::Lead, visibility);
    qb.push(" AND client_id = ").push_bind(client_id);
    if let Some(status) = status {
        qb.push(" AND status = ").push_bind(status);
    }
    qb.push(" ORDER BY created_at DESC, id");
    Ok(qb.build_query_as().fetch_all(pool).await?)
}

pub async fn update_status(pool: &PgPool, id: Uuid, status: LeadStatus) -> Result<Lead> {
    let row = Update::new(Entity::Lead)
        .set("status", status)
        .returning(pool, id, Visibility::Live)
        .await?;
    found(row, Entity::Lead, id)
}

/// Applies the staff-set fields that are present; absent fields are kept.
pub async fn update_qualification(
    pool: &PgPool,
    id: Uuid,
    q: &LeadQualification,
) -> Result<Lead> {
    let mut update = Update::new(Entity::Lead);
    if let Some(score) = q.quality_score {
        update = update.set("quality_score", score);
    }
    if let Some(user_id) = q.assigned_to_user_id {
        update = update.set("assigned_to_user_id", user_id);
    }
    if let Some(notes) = &q.notes {
        update = update.set("notes", notes.clone());
    }
    let row = update.returning(pool, id, Visibility::Live).await?;
    found(row, Entity::Lead, id)
}

pub async fn count(pool: &PgPool, visibility: Visibility) -> Result<i64> {
    query::fetch_count(pool, query::count(Entity::Lead, visibility)).await
}
