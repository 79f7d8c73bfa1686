pub mod catalog;
pub mod conversation;
pub mod domain;
pub mod memory;
pub mod payroll;
pub mod ports;
pub mod prompts;
pub mod reply;

pub use catalog::{CatalogError, ShiftCatalog, ShiftType};
pub use conversation::{Command, ConversationEngine, ConversationState, EditTarget, Inbound, Session, Turn};
pub use domain::{format_input_date, parse_input_date, Caller, DateParseError, EntryId, ShiftEntry};
pub use memory::InMemoryEntryStore;
pub use payroll::{summarize, MonthRollover, PayPeriod, PayrollError, PayrollRules, PayrollSummary};
pub use ports::{EntryStore, PortError, PortResult};
pub use reply::{Keyboard, Reply, ReplyMarkup};
