use crate::domain::{EntryId, ShiftEntry};
use crate::ports::{EntryStore, PortError, PortResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Table {
    next_id: EntryId,
    rows: BTreeMap<EntryId, ShiftEntry>,
}

/// A thread-safe in-memory entry store.
///
/// Enforces the same `(date, owner)` uniqueness as the relational schema, so
/// it can stand in for the database in tests and local runs.
#[derive(Default, Clone)]
pub struct InMemoryEntryStore {
    table: Arc<RwLock<Table>>,
}

impl InMemoryEntryStore {
    /// Creates a new, empty in-memory entry store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries across all owners.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl EntryStore for InMemoryEntryStore {
    async fn find_by_date_and_owner(
        &self,
        date: NaiveDate,
        owner: &str,
    ) -> PortResult<Option<ShiftEntry>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|e| e.date == date && e.owner == owner)
            .cloned())
    }

    async fn insert(&self, date: NaiveDate, shift_code: &str, owner: &str) -> PortResult<EntryId> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|e| e.date == date && e.owner == owner) {
            return Err(PortError::Conflict(format!("{owner} already has an entry on {date}")));
        }

        table.next_id += 1;
        let id = table.next_id;
        table.rows.insert(
            id,
            ShiftEntry {
                id,
                date,
                shift_code: shift_code.to_string(),
                owner: owner.to_string(),
            },
        );
        Ok(id)
    }

    async fn list_by_owner(&self, owner: &str) -> PortResult<Vec<ShiftEntry>> {
        let table = self.table.read().await;
        let mut entries: Vec<ShiftEntry> = table
            .rows
            .values()
            .filter(|e| e.owner == owner)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }

    async fn update_shift_code(&self, id: EntryId, new_code: &str) -> PortResult<()> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id) {
            Some(entry) => {
                entry.shift_code = new_code.to_string();
                Ok(())
            }
            None => Err(PortError::NotFound(format!("Entry {id} not found"))),
        }
    }

    async fn delete_by_id(&self, id: EntryId) -> PortResult<()> {
        let mut table = self.table.write().await;
        table
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PortError::NotFound(format!("Entry {id} not found")))
    }
}
