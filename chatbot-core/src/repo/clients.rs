use sqlx::PgPool;
use uuid::Uuid;

use super::found;
use crate::error::Result;
use crate::models::{Client, ClientPlan, ClientProfile, NewClient};
use crate::query::{self, Update, Visibility};
use crate::schema::Entity;

pub async fn insert(pool: &PgPool, new: &NewClient) -> Result<Client> {
    let client = sqlx::query_as::<_, Client>(
        r#"
        INSERT INTO clients
            (id, company_name, email, contact_person, phone, address,
             max_chatbots, max_documents_per_chatbot, monthly_token_limit)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.company_name)
    .bind(&new.email)
    .bind(&new.contact_person)
    .bind(&new.phone)
    .bind(&new.address)
    .bind(new.plan.max_chatbots)
    .bind(new.plan.max_documents_per_chatbot)
    .bind(new.plan.monthly_token_limit)
    .fetch_one(pool)
    .await?;
    Ok(client)
}

pub async fn find(pool: &PgPool, id: Uuid, visibility: Visibility) -> Result<Option<Client>> {
    let mut qb = query::select(Entity::Client, visibility);
    qb.push(" AND id = ").push_bind(id);
    Ok(qb.build_query_as().fetch_optional(pool).await?)
}

pub async fn find_by_email(
    pool: &PgPool,
    email: &str,
    visibility: Visibility,
) -> Result<Option<Client>> {
    let mut qb = query::select(Entity::Client, visibility);
    qb.push(" AND email = ").push_bind(email);
    Ok(qb.build_query_as().fetch_optional(pool).await?)
}

pub async fn list(pool: &PgPool, visibility: Visibility) -> Result<Vec<Client>> {
    let mut qb = query::select(Entity::Client, visibility);
    qb.push(" ORDER BY created_at, id");
    Ok(qb.build_query_as().fetch_all(pool).await?)
}

pub async fn update_profile(pool: &PgPool, id: Uuid, profile: &ClientProfile) -> Result<Client> {
    let mut update = Update::new(Entity::Client);
    if let Some(v) = &profile.company_name {
        update = update.set("company_name", v.clone());
    }
    if let Some(v) = &profile.contact_person {
        update = update.set("contact_person", v.clone());
    }
    if let Some(v) = &profile.phone {
        update = update.set("phone", v.clone());
    }
    if let Some(v) = &profile.address {
        update = update.set("address", v.clone());
    }
    let row = update.returning(pool, id, Visibility::Live).await?;
    found(row, Entity::Client, id)
}

pub async fn update_plan(pool: &PgPool, id: Uuid, plan: ClientPlan) -> Result<Client> {
    let row = Update::new(Entity::Client)
        .set("max_chatbots", plan.max_chatbots)
        .set("max_documents_per_chatbot", plan.max_documents_per_chatbot)
        .set("monthly_token_limit", plan.monthly_token_limit)
        .returning(pool, id, Visibility::Live)
        .await?;
    found(row, Entity::Client, id)
}

pub async fn set_active(pool: &PgPool, id: Uuid, active: bool) -> Result<Client> {
    let row = Update::new(Entity::Client)
        .set("is_active", active)
        .returning(pool, id, Visibility::Live)
        .await?;
    found(row, Entity::Client, id)
}

pub async fn count(pool: &PgPool, visibility: Visibility) -> Result<i64> {
    query::fetch_count(pool, query::count(Entity::Client, visibility)).await
}
