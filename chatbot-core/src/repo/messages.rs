//! Read side of messages. Writes go through
//! [`super::conversations::record_message`]; there is no update path.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::Message;
use crate::query::{self, Visibility};
use crate::schema::Entity;

pub async fn find(pool: &PgPool, id: Uuid, visibility: Visibility) -> Result<Option<Message>> {
    let mut qb = query::select(Entity::Message, visibility);
    qb.push(" AND id = ").push_bind(id);
    Ok(qb.build_query_as().fetch_optional(pool).await?)
}

pub async fn list_for_conversation(
    pool: &PgPool,
    conversation_id: Uuid,
    visibility: Visibility,
) -> Result<Vec<Message>> {
    let mut qb = query::select(Entity::Message, visibility);
    qb.push(" AND conversation_id = ")
        .push_bind(conversation_id)
        .push(" ORDER BY created_at, id");
    Ok(qb.build_query_as().fetch_all(pool).await?)
}

pub async fn count(pool: &PgPool, visibility: Visibility) -> Result<i64> {
    query::fetch_count(pool, query::count(Entity::Message, visibility)).await
}
