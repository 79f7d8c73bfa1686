//! crates/shift_log_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::NaiveDate;

/// Store-assigned identifier of a persisted shift entry.
pub type EntryId = i64;

/// Date format users type and see in prompts, e.g. `01/01/2023`.
pub const INPUT_DATE_FORMAT: &str = "%d/%m/%Y";

/// One persisted shift record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftEntry {
    pub id: EntryId,
    pub date: NaiveDate,
    pub shift_code: String,
    pub owner: String,
}

/// The identity of whoever sent an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Caller {
    pub username: String,
    /// Friendly name used in the payroll header; falls back to the username.
    pub display_name: Option<String>,
}

impl Caller {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a date in DD/MM/YYYY format")]
pub struct DateParseError(pub String);

/// Parses a `DD/MM/YYYY` date. Day and month may be one or two digits, the
/// year must be exactly four.
pub fn parse_input_date(text: &str) -> Result<NaiveDate, DateParseError> {
    let text = text.trim();
    let parts: Vec<&str> = text.split('/').collect();
    let well_formed = match parts.as_slice() {
        [day, month, year] => {
            (1..=2).contains(&day.len())
                && (1..=2).contains(&month.len())
                && year.len() == 4
                && parts.iter().all(|p| p.bytes().all(|b| b.is_ascii_digit()))
        }
        _ => false,
    };
    if !well_formed {
        return Err(DateParseError(text.to_string()));
    }

    NaiveDate::parse_from_str(text, INPUT_DATE_FORMAT).map_err(|_| DateParseError(text.to_string()))
}

pub fn format_input_date(date: NaiveDate) -> String {
    date.format(INPUT_DATE_FORMAT).to_string()
}
