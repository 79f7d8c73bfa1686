//! services/bot/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `EntryStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::NaiveDate;
use shift_log_core::domain::{EntryId, ShiftEntry};
use shift_log_core::ports::{EntryStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `EntryStore` port.
///
/// Every operation checks a connection out of the pool for the duration of a
/// single auto-committed statement; the pool takes it back on every exit path.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct EntryRecord {
    id: i64,
    shift_date: NaiveDate,
    shift_type: String,
    username: String,
}
impl EntryRecord {
    fn to_domain(self) -> ShiftEntry {
        ShiftEntry {
            id: self.id,
            date: self.shift_date,
            shift_code: self.shift_type,
            owner: self.username,
        }
    }
}

/// Maps driver errors onto the port's taxonomy.
fn port_error(e: sqlx::Error) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(e.to_string()),
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            PortError::Conflict(db.message().to_string())
        }
        _ => PortError::Unavailable(e.to_string()),
    }
}

/// An update or delete that touched no row means the entry is gone.
fn require_affected(rows_affected: u64, id: EntryId) -> PortResult<()> {
    if rows_affected == 0 {
        return Err(PortError::NotFound(format!("Entry {} not found", id)));
    }
    Ok(())
}

//=========================================================================================
// `EntryStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl EntryStore for DbAdapter {
    async fn find_by_date_and_owner(
        &self,
        date: NaiveDate,
        owner: &str,
    ) -> PortResult<Option<ShiftEntry>> {
        let record = sqlx::query_as::<_, EntryRecord>(
            "SELECT id, shift_date, shift_type, username FROM entries WHERE shift_date = $1 AND username = $2",
        )
        .bind(date)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(port_error)?;

        Ok(record.map(EntryRecord::to_domain))
    }

    async fn insert(&self, date: NaiveDate, shift_code: &str, owner: &str) -> PortResult<EntryId> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO entries (shift_date, shift_type, username) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(date)
        .bind(shift_code)
        .bind(owner)
        .fetch_one(&self.pool)
        .await
        .map_err(port_error)?;
        Ok(id)
    }

    async fn list_by_owner(&self, owner: &str) -> PortResult<Vec<ShiftEntry>> {
        let records = sqlx::query_as::<_, EntryRecord>(
            "SELECT id, shift_date, shift_type, username FROM entries WHERE username = $1 ORDER BY shift_date ASC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(port_error)?;

        let entries = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(entries)
    }

    async fn update_shift_code(&self, id: EntryId, new_code: &str) -> PortResult<()> {
        let result = sqlx::query("UPDATE entries SET shift_type = $1 WHERE id = $2")
            .bind(new_code)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(port_error)?;

        require_affected(result.rows_affected(), id)
    }

    async fn delete_by_id(&self, id: EntryId) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(port_error)?;

        require_affected(result.rows_affected(), id)
    }
}
