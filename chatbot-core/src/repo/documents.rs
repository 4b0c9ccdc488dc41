use sqlx::PgPool;
use uuid::Uuid;

use super::found;
use crate::error::{PlatformError, Result};
use crate::models::{Document, DocumentStatus, NewDocument};
use crate::query::{self, Update, Visibility};
use crate::schema::Entity;

pub async fn insert(pool: &PgPool, new: &NewDocument) -> Result<Document> {
    let document = sqlx::query_as::<_, Document>(
        r#"
        INSERT INTO documents
            (id, chatbot_id, file_name, file_type, file_size_bytes, blob_url, source_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.chatbot_id)
    .bind(&new.file_name)
    .bind(&new.file_type)
    .bind(new.file_size_bytes)
    .bind(&new.blob_url)
    .bind(&new.source_url)
    .fetch_one(pool)
    .await?;
    Ok(document)
}

pub async fn find(pool: &PgPool, id: Uuid, visibility: Visibility) -> Result<Option<Document>> {
    let mut qb = query::select(Entity::Document, visibility);
    qb.push(" AND id = ").push_bind(id);
    Ok(qb.build_query_as().fetch_optional(pool).await?)
}

pub async fn list_for_chatbot(
    pool: &PgPool,
    chatbot_id: Uuid,
    status: Option<DocumentStatus>,
    visibility: Visibility,
) -> Result<Vec<Document>> {
    let mut qb = query::select(Entity::Document, visibility);
    qb.push(" AND chatbot_id = ").push_bind(chatbot_id);
    if let Some(status) = status {
        qb.push(" AND status = ").push_bind(status);
    }
    qb.push(" ORDER BY created_at, id");
    Ok(qb.build_query_as().fetch_all(pool).await?)
}

/// Moves a document to `next`. The row is locked while the current status is
/// checked against the processing state machine.
pub async fn transition(pool: &PgPool, id: Uuid, next: DocumentStatus) -> Result<Document> {
    guarded(pool, id, next, Update::new(Entity::Document).set("status", next)).await
}

pub async fn mark_completed(
    pool: &PgPool,
    id: Uuid,
    chunk_count: i32,
    total_tokens: i32,
) -> Result<Document> {
    let update = Update::new(Entity::Document)
        .set("status", DocumentStatus::Completed)
        .set("chunk_count", chunk_count)
        .set("total_tokens", total_tokens)
        .set_expr("processed_at", "now()")
        .set_expr("error_message", "NULL");
    guarded(pool, id, DocumentStatus::Completed, update).await
}

pub async fn mark_failed(pool: &PgPool, id: Uuid, error_message: &str) -> Result<Document> {
    let update = Update::new(Entity::Document)
        .set("status", DocumentStatus::Failed)
        .set("error_message", error_message.to_string())
        .set_expr("processed_at", "now()");
    guarded(pool, id, DocumentStatus::Failed, update).await
}

async fn guarded(
    pool: &PgPool,
    id: Uuid,
    next: DocumentStatus,
    update: Update<'_>,
) -> Result<Document> {
    let mut tx = pool.begin().await?;

    let mut qb = query::select(Entity::Document, Visibility::Live);
    qb.push(" AND id = ").push_bind(id).push(" FOR UPDATE");
    let current: Option<Document> = qb.build_query_as().fetch_optional(&mut *tx).await?;
    let current = found(current, Entity::Document, id)?;

    if !current.status.can_transition_to(next) {
        return Err(PlatformError::InvalidTransition {
            entity: Entity::Document,
            id,
            detail: format!("{:?} -> {:?}", current.status, next),
        });
    }

    let row = update.returning(&mut *tx, id, Visibility::Live).await?;
    tx.commit().await?;
    tracing::debug!("Document {} moved {:?} -> {:?}", id, current.status, next);
    found(row, Entity::Document, id)
}

pub async fn count(pool: &PgPool, visibility: Visibility) -> Result<i64> {
    query::fetch_count(pool, query::count(Entity::Document, visibility)).await
}
