//! crates/shift_log_core/src/conversation.rs
//!
//! The multi-turn dialogue that records, edits and summarizes shifts.
//!
//! Every conversing user owns a [`Session`] in the engine's registry. A turn
//! locks only that user's session, so different users progress independently
//! while a single user's turns are applied one at a time.

use crate::catalog::ShiftCatalog;
use crate::domain::{parse_input_date, Caller, EntryId, ShiftEntry};
use crate::payroll::{self, PayrollRules};
use crate::ports::{EntryStore, PortError};
use crate::prompts;
use crate::reply::Reply;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

//=========================================================================================
// Inbound Classification
//=========================================================================================

/// A slash command, by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Add,
    Edit,
    Summary,
    Cancel,
    Other(String),
}

impl Command {
    pub fn parse(name: &str) -> Self {
        match name {
            "start" => Command::Start,
            "add" => Command::Add,
            "edit" => Command::Edit,
            "summary" => Command::Summary,
            "cancel" => Command::Cancel,
            other => Command::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Command(Command),
    Text(String),
}

impl Inbound {
    /// `/name@bot args` is a command named `name`; anything else is text.
    pub fn classify(text: &str) -> Self {
        let trimmed = text.trim();
        match trimmed.strip_prefix('/') {
            Some(rest) => {
                let word = rest.split_whitespace().next().unwrap_or("");
                let name = word.split('@').next().unwrap_or("");
                Inbound::Command(Command::parse(name))
            }
            None => Inbound::Text(trimmed.to_string()),
        }
    }
}

//=========================================================================================
// States and Sessions
//=========================================================================================

/// The entry an in-progress edit or delete is aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    pub id: EntryId,
    pub date: NaiveDate,
    pub shift_code: String,
}

impl From<ShiftEntry> for EditTarget {
    fn from(entry: ShiftEntry) -> Self {
        Self {
            id: entry.id,
            date: entry.date,
            shift_code: entry.shift_code,
        }
    }
}

/// Where a session is in the dialogue. Staged values travel with the state
/// that needs them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    Initiated,
    AwaitingDateForAdd,
    AwaitingShiftType {
        date: NaiveDate,
    },
    AwaitingConfirmation {
        date: NaiveDate,
        shift_code: String,
    },
    AwaitingDateForEdit,
    AwaitingEditDeleteChoice {
        target: EditTarget,
    },
    AwaitingNewShiftType {
        target: EditTarget,
    },
    Terminal,
}

impl ConversationState {
    pub fn name(&self) -> &'static str {
        match self {
            ConversationState::Idle => "idle",
            ConversationState::Initiated => "initiated",
            ConversationState::AwaitingDateForAdd => "awaiting_date_for_add",
            ConversationState::AwaitingShiftType { .. } => "awaiting_shift_type",
            ConversationState::AwaitingConfirmation { .. } => "awaiting_confirmation",
            ConversationState::AwaitingDateForEdit => "awaiting_date_for_edit",
            ConversationState::AwaitingEditDeleteChoice { .. } => "awaiting_edit_delete_choice",
            ConversationState::AwaitingNewShiftType { .. } => "awaiting_new_shift_type",
            ConversationState::Terminal => "terminal",
        }
    }

    /// True while a flow is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self, ConversationState::Idle | ConversationState::Terminal)
    }
}

/// Per-user conversation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    owner: String,
    state: ConversationState,
}

impl Session {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            state: ConversationState::Idle,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn pending_date(&self) -> Option<NaiveDate> {
        match &self.state {
            ConversationState::AwaitingShiftType { date }
            | ConversationState::AwaitingConfirmation { date, .. } => Some(*date),
            _ => None,
        }
    }

    pub fn pending_shift_code(&self) -> Option<&str> {
        match &self.state {
            ConversationState::AwaitingConfirmation { shift_code, .. } => Some(shift_code),
            _ => None,
        }
    }

    fn edit_target(&self) -> Option<&EditTarget> {
        match &self.state {
            ConversationState::AwaitingEditDeleteChoice { target }
            | ConversationState::AwaitingNewShiftType { target } => Some(target),
            _ => None,
        }
    }

    pub fn edit_target_id(&self) -> Option<EntryId> {
        self.edit_target().map(|t| t.id)
    }

    pub fn edit_target_date(&self) -> Option<NaiveDate> {
        self.edit_target().map(|t| t.date)
    }
}

/// Sessions keyed by username. Only users who passed the allow-list get one.
#[derive(Default)]
struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionRegistry {
    async fn get(&self, username: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.lock().await.get(username).cloned()
    }

    async fn get_or_create(&self, username: &str) -> Arc<Mutex<Session>> {
        self.sessions
            .lock()
            .await
            .entry(username.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(username))))
            .clone()
    }

    async fn remove(&self, username: &str) {
        self.sessions.lock().await.remove(username);
    }
}

//=========================================================================================
// The Engine
//=========================================================================================

/// The outcome of one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub reply: Reply,
    pub state: ConversationState,
}

impl Turn {
    fn new(reply: Reply, state: ConversationState) -> Self {
        Self { reply, state }
    }
}

type Step = (Reply, ConversationState);

pub struct ConversationEngine {
    store: Arc<dyn EntryStore>,
    catalog: Arc<ShiftCatalog>,
    rules: PayrollRules,
    authorized: HashSet<String>,
    sessions: SessionRegistry,
}

impl ConversationEngine {
    pub fn new<I, S>(
        store: Arc<dyn EntryStore>,
        catalog: Arc<ShiftCatalog>,
        rules: PayrollRules,
        authorized_users: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            store,
            catalog,
            rules,
            authorized: authorized_users.into_iter().map(Into::into).collect(),
            sessions: SessionRegistry::default(),
        }
    }

    pub fn catalog(&self) -> &ShiftCatalog {
        &self.catalog
    }

    pub fn rules(&self) -> &PayrollRules {
        &self.rules
    }

    pub fn is_authorized(&self, username: &str) -> bool {
        self.authorized.contains(username)
    }

    /// A snapshot of the caller's session, if one exists.
    pub async fn session(&self, username: &str) -> Option<Session> {
        match self.sessions.get(username).await {
            Some(handle) => Some(handle.lock().await.clone()),
            None => None,
        }
    }

    pub async fn session_state(&self, username: &str) -> ConversationState {
        self.session(username)
            .await
            .map(|s| s.state)
            .unwrap_or_default()
    }

    /// Classifies raw message text and runs one turn.
    pub async fn handle(&self, caller: &Caller, text: &str) -> Turn {
        info!("Message sent by {}: {}", caller.username, text);
        match Inbound::classify(text) {
            Inbound::Command(command) => self.on_command(caller, command).await,
            Inbound::Text(text) => self.on_text(caller, &text).await,
        }
    }

    pub async fn on_command(&self, caller: &Caller, command: Command) -> Turn {
        match command {
            Command::Start => self.start(caller).await,
            Command::Cancel => self.cancel(caller).await,
            command => {
                let Some(handle) = self.sessions.get(&caller.username).await else {
                    return Turn::new(prompts::unknown_command(), ConversationState::Idle);
                };
                let mut session = handle.lock().await;
                if session.state != ConversationState::Initiated {
                    info!(user = %caller.username, ?command, state = session.state.name(), "Command outside its flow");
                    return Turn::new(prompts::unknown_command(), session.state.clone());
                }

                let (reply, next) = match command {
                    Command::Add => (prompts::ask_date_for_add(), ConversationState::AwaitingDateForAdd),
                    Command::Edit => (prompts::ask_date_for_edit(), ConversationState::AwaitingDateForEdit),
                    Command::Summary => self.summary(caller).await,
                    Command::Start | Command::Cancel | Command::Other(_) => {
                        info!(user = %caller.username, ?command, "Unknown command");
                        (prompts::unknown_command(), ConversationState::Initiated)
                    }
                };
                session.state = next;
                Turn::new(reply, session.state.clone())
            }
        }
    }

    pub async fn on_text(&self, caller: &Caller, text: &str) -> Turn {
        let Some(handle) = self.sessions.get(&caller.username).await else {
            return Turn::new(prompts::unknown_command(), ConversationState::Idle);
        };
        let mut session = handle.lock().await;
        let current = session.state.clone();
        let (reply, next) = self.advance(caller, current, text.trim()).await;
        session.state = next;
        Turn::new(reply, session.state.clone())
    }

    async fn start(&self, caller: &Caller) -> Turn {
        if !self.is_authorized(&caller.username) {
            warn!(user = %caller.username, "Unauthorized user attempted to start a conversation");
            self.sessions.remove(&caller.username).await;
            return Turn::new(prompts::unauthorized(), ConversationState::Terminal);
        }

        let handle = self.sessions.get_or_create(&caller.username).await;
        let mut session = handle.lock().await;
        if session.state.is_active() {
            info!(user = %caller.username, state = session.state.name(), "start received mid-flow");
            return Turn::new(prompts::unknown_command(), session.state.clone());
        }
        session.state = ConversationState::Initiated;
        Turn::new(prompts::welcome(), ConversationState::Initiated)
    }

    async fn cancel(&self, caller: &Caller) -> Turn {
        info!(user = %caller.username, "User pressed cancel.");
        if let Some(handle) = self.sessions.get(&caller.username).await {
            handle.lock().await.state = ConversationState::Terminal;
        }
        Turn::new(prompts::farewell(), ConversationState::Terminal)
    }

    /// Applies free text to the state that expects it.
    async fn advance(&self, caller: &Caller, state: ConversationState, text: &str) -> Step {
        match state {
            ConversationState::AwaitingDateForAdd => self.check_date_for_add(caller, text).await,
            ConversationState::AwaitingShiftType { date } => self.check_shift_type(date, text),
            ConversationState::AwaitingConfirmation { date, shift_code } => {
                self.confirm_entry(caller, date, shift_code, text).await
            }
            ConversationState::AwaitingDateForEdit => self.check_date_for_edit(caller, text).await,
            ConversationState::AwaitingEditDeleteChoice { target } => {
                self.edit_or_delete(caller, target, text).await
            }
            ConversationState::AwaitingNewShiftType { target } => {
                self.edit_shift_type(caller, target, text).await
            }
            state @ (ConversationState::Idle
            | ConversationState::Initiated
            | ConversationState::Terminal) => (prompts::unknown_command(), state),
        }
    }

    fn store_failure(&self, caller: &Caller, err: &PortError, reply: Reply) -> Step {
        error!(user = %caller.username, error = %err, "Entry store operation failed");
        (reply, ConversationState::Terminal)
    }

    // --- Add flow ---

    async fn check_date_for_add(&self, caller: &Caller, text: &str) -> Step {
        let date = match parse_input_date(text) {
            Ok(date) => date,
            Err(e) => {
                info!(user = %caller.username, error = %e, "Rejected date");
                return (prompts::invalid_date(), ConversationState::AwaitingDateForAdd);
            }
        };

        match self.store.find_by_date_and_owner(date, &caller.username).await {
            Ok(Some(existing)) => {
                info!(user = %caller.username, %date, "duplicate entry in database, informing user...");
                (prompts::duplicate_entry(&existing), ConversationState::Initiated)
            }
            Ok(None) => (
                prompts::ask_shift_type(&self.catalog),
                ConversationState::AwaitingShiftType { date },
            ),
            Err(e) => self.store_failure(caller, &e, prompts::fetch_failed()),
        }
    }

    fn check_shift_type(&self, date: NaiveDate, text: &str) -> Step {
        match self.catalog.earnings(text, self.rules.rate_per_hour) {
            Ok(earnings) => (
                prompts::confirm_entry(date, text, earnings),
                ConversationState::AwaitingConfirmation {
                    date,
                    shift_code: text.to_string(),
                },
            ),
            Err(e) => {
                info!(error = %e, "Rejected shift type");
                (
                    prompts::unknown_shift_type(text, &self.catalog),
                    ConversationState::AwaitingShiftType { date },
                )
            }
        }
    }

    async fn confirm_entry(
        &self,
        caller: &Caller,
        date: NaiveDate,
        shift_code: String,
        text: &str,
    ) -> Step {
        match text {
            prompts::YES => match self.store.insert(date, &shift_code, &caller.username).await {
                Ok(id) => {
                    info!(user = %caller.username, id, %date, shift = %shift_code, "Entry recorded");
                    (prompts::entry_saved(), ConversationState::Terminal)
                }
                Err(PortError::Conflict(reason)) => {
                    info!(user = %caller.username, %reason, "Entry appeared before insert");
                    (prompts::duplicate_on_insert(date), ConversationState::Initiated)
                }
                Err(e) => self.store_failure(caller, &e, prompts::insert_failed()),
            },
            prompts::NO => (prompts::reask_date_for_add(), ConversationState::AwaitingDateForAdd),
            _ => (
                prompts::answer_yes_or_no(),
                ConversationState::AwaitingConfirmation { date, shift_code },
            ),
        }
    }

    // --- Edit / delete flow ---

    async fn check_date_for_edit(&self, caller: &Caller, text: &str) -> Step {
        let date = match parse_input_date(text) {
            Ok(date) => date,
            Err(e) => {
                info!(user = %caller.username, error = %e, "Rejected date");
                return (prompts::invalid_date(), ConversationState::AwaitingDateForEdit);
            }
        };

        match self.store.find_by_date_and_owner(date, &caller.username).await {
            Ok(Some(entry)) => {
                info!(user = %caller.username, %date, "Data found for date");
                (
                    prompts::entry_found(&entry),
                    ConversationState::AwaitingEditDeleteChoice {
                        target: entry.into(),
                    },
                )
            }
            Ok(None) => {
                info!(user = %caller.username, %date, "no data found for date");
                (prompts::no_entry_on(date), ConversationState::Initiated)
            }
            Err(e) => self.store_failure(caller, &e, prompts::fetch_failed()),
        }
    }

    async fn edit_or_delete(&self, caller: &Caller, target: EditTarget, text: &str) -> Step {
        match text {
            prompts::CANCEL => {
                info!(user = %caller.username, "Cancelling data removal...");
                (prompts::edit_cancelled(target.date), ConversationState::Initiated)
            }
            prompts::DELETE => match self.store.delete_by_id(target.id).await {
                Ok(()) => {
                    info!(user = %caller.username, date = %target.date, "Successfully deleted entry");
                    (prompts::entry_deleted(target.date), ConversationState::Terminal)
                }
                Err(PortError::NotFound(_)) => {
                    (prompts::no_entry_on(target.date), ConversationState::Initiated)
                }
                Err(e) => self.store_failure(caller, &e, prompts::delete_failed()),
            },
            prompts::EDIT => (
                prompts::ask_new_shift_type(&self.catalog),
                ConversationState::AwaitingNewShiftType { target },
            ),
            _ => (
                prompts::choose_edit_delete_or_cancel(),
                ConversationState::AwaitingEditDeleteChoice { target },
            ),
        }
    }

    async fn edit_shift_type(&self, caller: &Caller, target: EditTarget, text: &str) -> Step {
        if !self.catalog.contains(text) {
            info!(user = %caller.username, shift = text, "Rejected shift type");
            return (
                prompts::unknown_shift_type(text, &self.catalog),
                ConversationState::AwaitingNewShiftType { target },
            );
        }

        match self.store.update_shift_code(target.id, text).await {
            Ok(()) => {
                info!(
                    user = %caller.username,
                    date = %target.date,
                    "Successfully updated shift type to {}", text
                );
                (prompts::shift_type_updated(text, target.date), ConversationState::Terminal)
            }
            Err(PortError::NotFound(_)) => {
                (prompts::no_entry_on(target.date), ConversationState::Initiated)
            }
            Err(e) => self.store_failure(caller, &e, prompts::update_failed()),
        }
    }

    // --- Summary ---

    async fn summary(&self, caller: &Caller) -> Step {
        let entries = match self.store.list_by_owner(&caller.username).await {
            Ok(entries) => entries,
            Err(e) => return self.store_failure(caller, &e, prompts::fetch_failed()),
        };

        let ledger = payroll::summarize(
            entries.iter().map(|e| (e.date, e.shift_code.as_str())),
            &self.catalog,
            &self.rules,
        );
        match ledger {
            Ok(summary) => {
                info!(user = %caller.username, entries = summary.entry_count(), "Payroll summary computed");
                (prompts::payroll(caller, &summary), ConversationState::Terminal)
            }
            Err(e) => {
                warn!(user = %caller.username, error = %e, "Payroll summary failed");
                (prompts::payroll_failed(&e.to_string()), ConversationState::Terminal)
            }
        }
    }
}
