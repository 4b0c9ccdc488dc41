use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::query::{self, Visibility};
use crate::schema::Entity;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}

/// Applies any pending migrations in order.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

pub async fn health_check(pool: &PgPool) -> Result<String, sqlx::Error> {
    let row: (String,) = sqlx::query_as("SELECT version()").fetch_one(pool).await?;
    Ok(row.0)
}

/// Live row counts for every entity, in [`Entity::ALL`] order.
pub async fn entity_counts(pool: &PgPool) -> Result<Vec<(Entity, i64)>> {
    let counts = futures::future::try_join_all(Entity::ALL.iter().map(|entity| async move {
        let n = query::fetch_count(pool, query::count(*entity, Visibility::Live)).await?;
        Ok::<_, crate::PlatformError>((*entity, n))
    }))
    .await?;
    Ok(counts)
}
