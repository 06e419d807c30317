//! SQLite-backed entity store.

use std::fmt::Write as _;
use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqliteRow};
use sqlx::{Arguments, FromRow};
use tracing::debug;

use sample_core::error::{AppError, ErrorKind};
use sample_core::result::AppResult;
use sample_core::traits::entity::{Entity, ID};
use sample_core::traits::store::{EntityStore, StoreQuery};
use sample_core::types::expression::Predicate;
use sample_core::types::value::FieldValue;

/// Entity store over one SQLite table. Statements are built from the
/// entity's declared columns and the predicate's rendered SQL.
pub struct SqliteStore<T> {
    pool: SqlitePool,
    _entity: PhantomData<fn() -> T>,
}

impl<T> SqliteStore<T> {
    /// Create a new store on `pool`.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

impl<T> Clone for SqliteStore<T> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<T: Entity> std::fmt::Debug for SqliteStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("table", &T::TABLE)
            .finish()
    }
}

/// Bind dynamic values in placeholder order.
fn bind_all<'q>(params: &[FieldValue]) -> AppResult<SqliteArguments<'q>> {
    let mut args = SqliteArguments::default();
    for param in params {
        let bound = match param {
            FieldValue::Null => args.add(None::<String>),
            FieldValue::Boolean(v) => args.add(*v),
            FieldValue::Integer(v) => args.add(*v),
            FieldValue::Float(v) => args.add(*v),
            FieldValue::Uuid(v) => args.add(*v),
            FieldValue::String(v) => args.add(v.clone()),
        };
        bound.map_err(|e| AppError::internal(format!("Failed to bind parameter {param}: {e}")))?;
    }
    Ok(args)
}

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

#[async_trait]
impl<T> EntityStore<T> for SqliteStore<T>
where
    T: Entity + for<'r> FromRow<'r, SqliteRow> + Unpin,
{
    async fn find(&self, query: &StoreQuery<T>) -> AppResult<Vec<T>> {
        let filter = query.filter.to_sql();
        let mut params = filter.params;
        let mut sql = format!(
            "SELECT {} FROM {} WHERE {}",
            T::FIELDS.join(", "),
            T::TABLE,
            filter.sql
        );
        match &query.sort {
            Some((key, direction)) => {
                let _ = write!(sql, " ORDER BY {} {}, rowid ASC", key.column(), direction.as_sql());
            }
            None => sql.push_str(" ORDER BY rowid ASC"),
        }
        if let Some((offset, limit)) = query.window {
            let next = params.len() + 1;
            let _ = write!(sql, " LIMIT ?{} OFFSET ?{}", next, next + 1);
            // SQLite reads a negative OFFSET as zero.
            params.push(FieldValue::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
            params.push(FieldValue::Integer(i64::try_from(offset).unwrap_or(i64::MAX)));
        }

        debug!(table = T::TABLE, sql = %sql, includes = ?query.includes, "Executing find");

        sqlx::query_as_with::<_, T, _>(&sql, bind_all(&params)?)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to query entities"))
    }

    async fn count(&self, filter: &Predicate<T>) -> AppResult<u64> {
        let filter = filter.to_sql();
        let sql = format!("SELECT COUNT(*) FROM {} WHERE {}", T::TABLE, filter.sql);

        let total: i64 = sqlx::query_scalar_with(&sql, bind_all(&filter.params)?)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count entities"))?;
        Ok(total as u64)
    }

    async fn insert(&self, entity: &T) -> AppResult<()> {
        let row = entity.to_row();
        let columns: Vec<&str> = row.iter().map(|(column, _)| *column).collect();
        let placeholders: Vec<String> = (1..=row.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            T::TABLE,
            columns.join(", "),
            placeholders.join(", ")
        );
        let values: Vec<FieldValue> = row.into_iter().map(|(_, value)| value).collect();

        sqlx::query_with(&sql, bind_all(&values)?)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to insert entity"))?;
        Ok(())
    }

    async fn save(&self, entity: &T) -> AppResult<()> {
        let mut values = vec![FieldValue::Uuid(entity.id())];
        let mut assignments = Vec::new();
        for (column, value) in entity.to_row() {
            if column == ID {
                continue;
            }
            values.push(value);
            assignments.push(format!("{column} = ?{}", values.len()));
        }
        let sql = format!(
            "UPDATE {} SET {} WHERE {ID} = ?1",
            T::TABLE,
            assignments.join(", ")
        );

        let result = sqlx::query_with(&sql, bind_all(&values)?)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to update entity"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "{} {} not found",
                T::NAME,
                entity.id()
            )));
        }
        Ok(())
    }

    async fn delete_where(&self, filter: &Predicate<T>) -> AppResult<u64> {
        let filter = filter.to_sql();
        let sql = format!("DELETE FROM {} WHERE {}", T::TABLE, filter.sql);

        let result = sqlx::query_with(&sql, bind_all(&filter.params)?)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete entities"))?;
        Ok(result.rows_affected())
    }
}
