//! Query construction shared by every repository.
//!
//! Reads start from [`select`] or [`count`], which inject the soft-delete
//! predicate for soft-deletable entities unless the caller asks for
//! [`Visibility::WithDeleted`]. Writes go through [`Update`], which always
//! appends the `updated_at` stamp for tracked entities.

use sqlx::postgres::PgRow;
use sqlx::{Encode, Executor, FromRow, Postgres, QueryBuilder, Type};
use uuid::Uuid;

use crate::error::Result;
use crate::schema::Entity;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Rows marked `is_deleted` are hidden.
    #[default]
    Live,
    /// Soft-deleted rows are returned as well.
    WithDeleted,
}

impl Visibility {
    pub fn predicate(self, entity: Entity) -> Option<&'static str> {
        match self {
            Visibility::Live if entity.soft_deletable() => Some("is_deleted = FALSE"),
            _ => None,
        }
    }
}

/// `SELECT * FROM <table> WHERE TRUE [AND is_deleted = FALSE]`.
/// Callers append further `AND ...` clauses.
pub fn select<'args>(entity: Entity, visibility: Visibility) -> QueryBuilder<'args, Postgres> {
    filtered(format!("SELECT * FROM {}", entity.table()), entity, visibility)
}

pub fn count<'args>(entity: Entity, visibility: Visibility) -> QueryBuilder<'args, Postgres> {
    filtered(format!("SELECT COUNT(*) FROM {}", entity.table()), entity, visibility)
}

fn filtered<'args>(
    head: String,
    entity: Entity,
    visibility: Visibility,
) -> QueryBuilder<'args, Postgres> {
    let mut qb = QueryBuilder::new(head);
    qb.push(" WHERE TRUE");
    if let Some(predicate) = visibility.predicate(entity) {
        qb.push(" AND ").push(predicate);
    }
    qb
}

pub async fn fetch_count<'e, E>(executor: E, mut qb: QueryBuilder<'_, Postgres>) -> Result<i64>
where
    E: Executor<'e, Database = Postgres>,
{
    let (n,): (i64,) = qb.build_query_as().fetch_one(executor).await?;
    Ok(n)
}

/// Single-row `UPDATE ... WHERE id = $n`.
pub struct Update<'args> {
    entity: Entity,
    qb: QueryBuilder<'args, Postgres>,
    assignments: usize,
}

impl<'args> Update<'args> {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            qb: QueryBuilder::new(format!("UPDATE {} SET ", entity.table())),
            assignments: 0,
        }
    }

    fn next_assignment(&mut self) {
        if self.assignments > 0 {
            self.qb.push(", ");
        }
        self.assignments += 1;
    }

    pub fn set<T>(mut self, column: &str, value: T) -> Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
    {
        self.next_assignment();
        self.qb.push(column).push(" = ").push_bind(value);
        self
    }

    /// `column = column + value`
    pub fn increment<T>(mut self, column: &str, value: T) -> Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
    {
        self.next_assignment();
        self.qb
            .push(column)
            .push(" = ")
            .push(column)
            .push(" + ")
            .push_bind(value);
        self
    }

    /// Assign a trusted SQL expression such as `now()`.
    pub fn set_expr(mut self, column: &str, expr: &str) -> Self {
        self.next_assignment();
        self.qb.push(column).push(" = ").push(expr);
        self
    }

    fn finish(mut self, id: Uuid, visibility: Visibility) -> QueryBuilder<'args, Postgres> {
        if self.entity.tracks_updates() {
            self.next_assignment();
            self.qb.push("updated_at = now()");
        }
        self.qb.push(" WHERE id = ").push_bind(id);
        if let Some(predicate) = visibility.predicate(self.entity) {
            self.qb.push(" AND ").push(predicate);
        }
        self.qb
    }

    pub async fn execute<'e, E>(self, executor: E, id: Uuid, visibility: Visibility) -> Result<u64>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = self.finish(id, visibility);
        let done = qb.build().execute(executor).await?;
        Ok(done.rows_affected())
    }

    /// Runs the update with `RETURNING *`; `None` when no visible row matched.
    pub async fn returning<'e, T, E>(
        self,
        executor: E,
        id: Uuid,
        visibility: Visibility,
    ) -> Result<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = self.finish(id, visibility);
        qb.push(" RETURNING *");
        let row = qb.build_query_as::<T>().fetch_optional(executor).await?;
        Ok(row)
    }
}
