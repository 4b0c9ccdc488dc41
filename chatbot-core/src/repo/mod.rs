//! Repositories over the mapped entities.
//!
//! Every read is built from [`crate::query::select`] so the soft-delete
//! predicate is applied unless a caller passes [`Visibility::WithDeleted`].
//! Every update is built from [`crate::query::Update`] so `updated_at` is
//! stamped before the write commits.

pub mod chatbots;
pub mod clients;
pub mod conversations;
pub mod documents;
pub mod leads;
pub mod messages;
pub mod usage;
pub mod users;

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{PlatformError, Result};
use crate::query::{self, Update, Visibility};
use crate::schema::{self, Entity};

pub(crate) fn found<T>(row: Option<T>, entity: Entity, id: Uuid) -> Result<T> {
    row.ok_or(PlatformError::NotFound { entity, id })
}

/// Hides a row from standard reads without removing it.
pub async fn soft_delete(pool: &PgPool, entity: Entity, id: Uuid) -> Result<()> {
    set_deleted(pool, entity, id, true).await?;
    tracing::info!("Soft-deleted {} {}", entity, id);
    Ok(())
}

pub async fn restore(pool: &PgPool, entity: Entity, id: Uuid) -> Result<()> {
    set_deleted(pool, entity, id, false).await?;
    tracing::info!("Restored {} {}", entity, id);
    Ok(())
}

async fn set_deleted(pool: &PgPool, entity: Entity, id: Uuid, deleted: bool) -> Result<()> {
    if !entity.soft_deletable() {
        return Err(PlatformError::Other(format!("{} rows cannot be soft-deleted", entity)));
    }
    // Deleting only matches live rows; restoring matches any row.
    let visibility = if deleted { Visibility::Live } else { Visibility::WithDeleted };
    let affected = Update::new(entity)
        .set("is_deleted", deleted)
        .execute(pool, id, visibility)
        .await?;
    if affected == 0 {
        return Err(PlatformError::NotFound { entity, id });
    }
    Ok(())
}

/// Physically removes a row.
///
/// `Restrict` relations are checked first, counting soft-deleted children as
/// well since they still hold the foreign key. Cascade and set-null rules are
/// then carried out by the constraints declared in the migrations.
pub async fn hard_delete(pool: &PgPool, entity: Entity, id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;

    let lock_sql = format!("SELECT id FROM {} WHERE id = $1 FOR UPDATE", entity.table());
    let locked: Option<(Uuid,)> = sqlx::query_as(&lock_sql)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if locked.is_none() {
        return Err(PlatformError::NotFound { entity, id });
    }

    let mut dependents = Vec::new();
    for relation in schema::restricting(entity) {
        let mut qb = query::count(relation.child, Visibility::WithDeleted);
        qb.push(" AND ").push(relation.column).push(" = ").push_bind(id);
        let n = query::fetch_count(&mut *tx, qb).await?;
        if n > 0 {
            dependents.push((relation.child, n));
        }
    }
    if !dependents.is_empty() {
        tracing::warn!("Refusing to delete {} {}: {:?}", entity, id, dependents);
        return Err(PlatformError::Restricted {
            entity,
            id,
            dependents,
        });
    }

    let delete_sql = format!("DELETE FROM {} WHERE id = $1", entity.table());
    sqlx::query(&delete_sql).bind(id).execute(&mut *tx).await?;
    tx.commit().await?;

    tracing::info!(
        "Deleted {} {} (cascaded to {:?})",
        entity,
        id,
        schema::cascade_closure(entity)
    );
    Ok(())
}
