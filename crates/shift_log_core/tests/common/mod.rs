#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use shift_log_core::{
    Caller, ConversationEngine, EntryId, EntryStore, InMemoryEntryStore, PayrollRules, PortError,
    PortResult, ShiftCatalog, ShiftEntry, Turn,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub const USER: &str = "terrykms";
pub const OTHER_USER: &str = "q000xd";
pub const STRANGER: &str = "mallory";

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Wraps the in-memory store, counts every call and can be switched to fail.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: InMemoryEntryStore,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl RecordingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn enter(&self) -> PortResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            Err(PortError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EntryStore for RecordingStore {
    async fn find_by_date_and_owner(
        &self,
        date: NaiveDate,
        owner: &str,
    ) -> PortResult<Option<ShiftEntry>> {
        self.enter()?;
        self.inner.find_by_date_and_owner(date, owner).await
    }

    async fn insert(&self, date: NaiveDate, shift_code: &str, owner: &str) -> PortResult<EntryId> {
        self.enter()?;
        self.inner.insert(date, shift_code, owner).await
    }

    async fn list_by_owner(&self, owner: &str) -> PortResult<Vec<ShiftEntry>> {
        self.enter()?;
        self.inner.list_by_owner(owner).await
    }

    async fn update_shift_code(&self, id: EntryId, new_code: &str) -> PortResult<()> {
        self.enter()?;
        self.inner.update_shift_code(id, new_code).await
    }

    async fn delete_by_id(&self, id: EntryId) -> PortResult<()> {
        self.enter()?;
        self.inner.delete_by_id(id).await
    }
}

pub struct Harness {
    pub store: Arc<RecordingStore>,
    pub engine: ConversationEngine,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(RecordingStore::default());
        let engine = ConversationEngine::new(
            store.clone(),
            Arc::new(ShiftCatalog::standard()),
            PayrollRules::new(dec!(15)),
            [USER, OTHER_USER],
        );
        Self { store, engine }
    }

    /// Sends each message as `username` and returns the last turn.
    pub async fn say(&self, username: &str, messages: &[&str]) -> Turn {
        let caller = Caller::new(username);
        let mut last = None;
        for message in messages {
            last = Some(self.engine.handle(&caller, message).await);
        }
        last.expect("at least one message")
    }

    pub async fn entries(&self, owner: &str) -> Vec<ShiftEntry> {
        self.store.inner.list_by_owner(owner).await.unwrap()
    }
}
