//! crates/shift_log_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific storage implementations.

use async_trait::async_trait;
use chrono::NaiveDate;
use crate::domain::{EntryId, ShiftEntry};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflicting item already exists: {0}")]
    Conflict(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistence of shift entries, one table keyed by `(date, owner)`.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Equality match on both fields.
    async fn find_by_date_and_owner(
        &self,
        date: NaiveDate,
        owner: &str,
    ) -> PortResult<Option<ShiftEntry>>;

    /// Fails with `Conflict` when an entry already exists for `(date, owner)`.
    async fn insert(&self, date: NaiveDate, shift_code: &str, owner: &str) -> PortResult<EntryId>;

    /// All entries of `owner`, ascending by date.
    async fn list_by_owner(&self, owner: &str) -> PortResult<Vec<ShiftEntry>>;

    async fn update_shift_code(&self, id: EntryId, new_code: &str) -> PortResult<()>;

    async fn delete_by_id(&self, id: EntryId) -> PortResult<()>;
}
