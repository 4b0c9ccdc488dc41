use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::User;
use crate::query::{self, Visibility};
use crate::schema::Entity;

pub async fn list(pool: &PgPool) -> Result<Vec<User>> {
    let mut qb = query::select(Entity::User, Visibility::Live);
    qb.push(" ORDER BY created_at, id");
    Ok(qb.build_query_as().fetch_all(pool).await?)
}

pub async fn list_for_client(pool: &PgPool, client_id: Uuid) -> Result<Vec<User>> {
    let mut qb = query::select(Entity::User, Visibility::Live);
    qb.push(" AND client_id = ")
        .push_bind(client_id)
        .push(" ORDER BY created_at, id");
    Ok(qb.build_query_as().fetch_all(pool).await?)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let mut qb = query::select(Entity::User, Visibility::Live);
    qb.push(" AND lower(email) = lower(").push_bind(email).push(")");
    Ok(qb.build_query_as().fetch_optional(pool).await?)
}

pub async fn count(pool: &PgPool) -> Result<i64> {
    query::fetch_count(pool, query::count(Entity::User, Visibility::Live)).await
}
