//! crates/shift_log_core/src/catalog.rs
//!
//! The static table of shift codes and the hours each one pays.

use crate::reply::Keyboard;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Unknown shift type: {0}")]
    UnknownShiftCode(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftType {
    pub code: String,
    pub paid_hours: Decimal,
}

/// Shift codes in table order. Read-only once built.
#[derive(Debug, Clone)]
pub struct ShiftCatalog {
    shifts: Vec<ShiftType>,
}

impl ShiftCatalog {
    /// Builds a catalog from `(code, paid_hours)` pairs. A repeated code keeps
    /// its first position and its last hours.
    pub fn new<I, S>(shifts: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<String>,
    {
        let mut catalog = Self { shifts: Vec::new() };
        for (code, paid_hours) in shifts {
            let code = code.into();
            match catalog.shifts.iter_mut().find(|s| s.code == code) {
                Some(existing) => existing.paid_hours = paid_hours,
                None => catalog.shifts.push(ShiftType { code, paid_hours }),
            }
        }
        catalog
    }

    /// The roster's shift templates.
    pub fn standard() -> Self {
        Self::new([
            ("E", dec!(8.5)),
            ("E6", dec!(8.5)),
            ("E7", dec!(8.5)),
            ("E8", dec!(8.5)),
            ("E9", dec!(8.5)),
            ("CA", dec!(8.5)),
            ("CA1", dec!(8.5)),
            ("CAF", dec!(10)),
            ("F10", dec!(10)),
            ("F11", dec!(10)),
            ("F12", dec!(10)),
            ("F8", dec!(10)),
            ("F9", dec!(10)),
            ("M", dec!(8.5)),
            ("M12", dec!(8.5)),
            ("L", dec!(8.5)),
            ("L1", dec!(8.5)),
            ("L2", dec!(8)),
            ("L3", dec!(7)),
            ("L4", dec!(6)),
            ("L5", dec!(5)),
        ])
    }

    pub fn lookup(&self, code: &str) -> Result<Decimal, CatalogError> {
        self.shifts
            .iter()
            .find(|s| s.code == code)
            .map(|s| s.paid_hours)
            .ok_or_else(|| CatalogError::UnknownShiftCode(code.to_string()))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.shifts.iter().any(|s| s.code == code)
    }

    /// `paid_hours(code) * rate_per_hour`.
    pub fn earnings(&self, code: &str, rate_per_hour: Decimal) -> Result<Decimal, CatalogError> {
        Ok(self.lookup(code)? * rate_per_hour)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShiftType> {
        self.shifts.iter()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.shifts.iter().map(|s| s.code.as_str())
    }

    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    /// Choice menu of every code, two per row.
    pub fn keyboard(&self) -> Keyboard {
        Keyboard::paired(self.codes())
    }
}
