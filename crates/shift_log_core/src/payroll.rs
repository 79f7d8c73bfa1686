//! crates/shift_log_core/src/payroll.rs
//!
//! Per-entry pay and semi-monthly pay-period totals.
//!
//! A new pay period starts between two consecutive entries when the previous
//! day-of-month is on or before the cutoff and the current one is after it,
//! or when the month advances. How "the month advances" is judged is a
//! [`MonthRollover`] choice: the legacy rule compares bare month numbers, so a
//! December to January step is not seen as a rollover.

use crate::catalog::{CatalogError, ShiftCatalog};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::fmt::Write as _;

/// Last day-of-month that belongs to the first half of a month.
pub const PAYROLL_CUTOFF_DAY: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayrollError {
    #[error("Entry on {date} has unknown shift type '{code}'")]
    UnknownShiftCode { date: NaiveDate, code: String },
}

/// How a month change between two consecutive entries is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthRollover {
    /// `current.month > previous.month`, year ignored. Known defect:
    /// December to January is not detected.
    #[default]
    LegacyMonthNumber,
    /// `(year, month)` tuples are compared, so year boundaries count.
    YearAware,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayrollRules {
    pub rate_per_hour: Decimal,
    pub cutoff_day: u32,
    pub rollover: MonthRollover,
}

impl PayrollRules {
    pub fn new(rate_per_hour: Decimal) -> Self {
        Self {
            rate_per_hour,
            cutoff_day: PAYROLL_CUTOFF_DAY,
            rollover: MonthRollover::default(),
        }
    }

    pub fn with_rollover(mut self, rollover: MonthRollover) -> Self {
        self.rollover = rollover;
        self
    }

    /// Whether walking from `previous` to `current` crosses into a new pay period.
    pub fn starts_new_period(&self, previous: NaiveDate, current: NaiveDate) -> bool {
        let crosses_cutoff = previous.day() <= self.cutoff_day && current.day() > self.cutoff_day;
        let month_advanced = match self.rollover {
            MonthRollover::LegacyMonthNumber => current.month() > previous.month(),
            MonthRollover::YearAware => {
                (current.year(), current.month()) > (previous.year(), previous.month())
            }
        };
        crosses_cutoff || month_advanced
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerLine {
    pub date: NaiveDate,
    pub shift_code: String,
    pub earnings: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PayPeriod {
    pub lines: Vec<LedgerLine>,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PayrollSummary {
    pub periods: Vec<PayPeriod>,
}

impl PayrollSummary {
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.periods.iter().map(|p| p.lines.len()).sum()
    }

    pub fn grand_total(&self) -> Decimal {
        self.periods.iter().map(|p| p.total).sum()
    }

    /// The ledger text: one line per entry and a total after every period.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, period) in self.periods.iter().enumerate() {
            if i > 0 {
                out.push_str(" \n ---------- \n\n");
            }
            for line in &period.lines {
                let _ = writeln!(
                    out,
                    "{}: ${:.2} ({})",
                    line.date.format("%Y-%m-%d"),
                    line.earnings,
                    line.shift_code
                );
            }
            let _ = write!(out, "\n MONTH TOTAL: ${:.2}", period.total);
        }
        out
    }
}

/// Computes earnings per entry and buckets them into pay periods.
///
/// `entries` must already be ordered by date.
pub fn summarize<'a, I>(
    entries: I,
    catalog: &ShiftCatalog,
    rules: &PayrollRules,
) -> Result<PayrollSummary, PayrollError>
where
    I: IntoIterator<Item = (NaiveDate, &'a str)>,
{
    let mut summary = PayrollSummary::default();
    let mut current = PayPeriod::default();
    let mut previous: Option<NaiveDate> = None;

    for (date, code) in entries {
        let earnings = catalog
            .earnings(code, rules.rate_per_hour)
            .map_err(|CatalogError::UnknownShiftCode(code)| PayrollError::UnknownShiftCode {
                date,
                code,
            })?;

        if let Some(prev) = previous {
            if rules.starts_new_period(prev, date) {
                summary.periods.push(std::mem::take(&mut current));
            }
        }

        current.total += earnings;
        current.lines.push(LedgerLine {
            date,
            shift_code: code.to_string(),
            earnings,
        });
        previous = Some(date);
    }

    if !current.lines.is_empty() {
        summary.periods.push(current);
    }
    Ok(summary)
}
