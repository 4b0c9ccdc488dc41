use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewUsageMetric, UsageMetric};
use crate::query::{self, Visibility};
use crate::schema::Entity;

/// Inserts a daily row; a second row for the same (client, chatbot, date)
/// fails with a unique violation.
pub async fn insert(pool: &PgPool, m: &NewUsageMetric) -> Result<UsageMetric> {
    let row = sqlx::query_as::<_, UsageMetric>(
        r#"
        INSERT INTO usage_metrics
            (id, client_id, chatbot_id, date, total_conversations, total_messages,
             input_tokens, output_tokens, total_cost, leads_captured, leads_converted)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(m.client_id)
    .bind(m.chatbot_id)
    .bind(m.date)
    .bind(m.total_conversations)
    .bind(m.total_messages)
    .bind(m.input_tokens)
    .bind(m.output_tokens)
    .bind(&m.total_cost)
    .bind(m.leads_captured)
    .bind(m.leads_converted)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Adds `m`'s counters onto the existing daily row, creating it if needed.
/// A soft-deleted row for the same day is revived with its counters kept.
pub async fn upsert(pool: &PgPool, m: &NewUsageMetric) -> Result<UsageMetric> {
    let row = sqlx::query_as::<_, UsageMetric>(
        r#"
        INSERT INTO usage_metrics
            (id, client_id, chatbot_id, date, total_conversations, total_messages,
             input_tokens, output_tokens, total_cost, leads_captured, leads_converted)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (client_id, chatbot_id, date)
        DO UPDATE SET
            total_conversations = usage_metrics.total_conversations + EXCLUDED.total_conversations,
            total_messages      = usage_metrics.total_messages + EXCLUDED.total_messages,
            input_tokens        = usage_metrics.input_tokens + EXCLUDED.input_tokens,
            output_tokens       = usage_metrics.output_tokens + EXCLUDED.output_tokens,
            total_cost          = usage_metrics.total_cost + EXCLUDED.total_cost,
            leads_captured      = usage_metrics.leads_captured + EXCLUDED.leads_captured,
            leads_converted     = usage_metrics.leads_converted + EXCLUDED.leads_converted,
            is_deleted          = FALSE,
            updated_at          = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(m.client_id)
    .bind(m.chatbot_id)
    .bind(m.date)
    .bind(m.total_conversations)
    .bind(m.total_messages)
    .bind(m.input_tokens)
    .bind(m.output_tokens)
    .bind(&m.total_cost)
    .bind(m.leads_captured)
    .bind(m.leads_converted)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Rows in `[from, to]`, oldest first.
pub async fn list_for_client(
    pool: &PgPool,
    client_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
    visibility: Visibility,
) -> Result<Vec<UsageMetric>> {
    let mut qb = query::select(Entity::UsageMetric, visibility);
    qb.push(" AND client_id = ")
        .push_bind(client_id)
        .push(" AND date BETWEEN ")
        .push_bind(from)
        .push(" AND ")
        .push_bind(to)
        .push(" ORDER BY date, chatbot_id NULLS FIRST");
    Ok(qb.build_query_as().fetch_all(pool).await?)
}

pub async fn count(pool: &PgPool, visibility: Visibility) -> Result<i64> {
    query::fetch_count(pool, query::count(Entity::UsageMetric, visibility)).await
}
