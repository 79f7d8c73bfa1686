//! Reply texts and keyboards for every step of the conversation.

use crate::catalog::ShiftCatalog;
use crate::domain::{format_input_date, Caller, ShiftEntry};
use crate::payroll::PayrollSummary;
use crate::reply::{Keyboard, Reply};
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub const ADD_BUTTON_TEXT: &str = "/add";
pub const EDIT_BUTTON_TEXT: &str = "/edit";
pub const SUMMARY_BUTTON_TEXT: &str = "/summary";

pub const YES: &str = "Yes";
pub const NO: &str = "No";
pub const EDIT: &str = "Edit";
pub const DELETE: &str = "Delete";
pub const CANCEL: &str = "Cancel";

pub fn unauthorized() -> Reply {
    Reply::text("You are not authorized to use this bot.")
}

pub fn welcome() -> Reply {
    Reply::with_keyboard(
        "Welcome! What do you want to do?",
        Keyboard::new([
            vec![ADD_BUTTON_TEXT, EDIT_BUTTON_TEXT],
            vec![SUMMARY_BUTTON_TEXT],
        ]),
    )
}

pub fn farewell() -> Reply {
    Reply::removing_keyboard("Bye! Press /start for another command.")
}

pub fn unknown_command() -> Reply {
    Reply::text("Sorry, I didn't understand that command.")
}

// --- Add flow ---

pub fn ask_date_for_add() -> Reply {
    Reply::text("Date of shift in DD/MM/YYYY (i.e. 01/01/2023).")
}

pub fn reask_date_for_add() -> Reply {
    Reply::text("Re-enter date of shift in DD/MM/YYYY format.")
}

pub fn invalid_date() -> Reply {
    Reply::text("Error in recognising date. Please ensure format is in DD/MM/YYYY.")
}

pub fn duplicate_entry(existing: &ShiftEntry) -> Reply {
    Reply::text(format!(
        "Duplicate entry exists in records: \n\n Date: {} \n Shift: {} \n\n Please press \n/add for a new date entry, or \n/edit if you want to change or delete entry.",
        existing.date.format("%Y-%m-%d"),
        existing.shift_code
    ))
}

/// The entry appeared between the duplicate check and the insert.
pub fn duplicate_on_insert(date: NaiveDate) -> Reply {
    Reply::text(format!(
        "An entry for {} was recorded in the meantime. \n\n Please press \n/add for a new date entry, or \n/edit if you want to change or delete entry.",
        format_input_date(date)
    ))
}

pub fn ask_shift_type(catalog: &ShiftCatalog) -> Reply {
    Reply::with_keyboard("Shift type?", catalog.keyboard())
}

pub fn unknown_shift_type(text: &str, catalog: &ShiftCatalog) -> Reply {
    Reply::with_keyboard(
        format!("Unknown shift type '{text}'. Please pick one of the listed shift types."),
        catalog.keyboard(),
    )
}

pub fn confirm_entry(date: NaiveDate, shift_code: &str, earnings: Decimal) -> Reply {
    Reply::with_keyboard(
        format!(
            "Confirming data entry: \n\n Date: {} \n Shift: {} \n ---------- \n Total earned: ${:.2}",
            format_input_date(date),
            shift_code,
            earnings
        ),
        Keyboard::new([[YES, NO]]),
    )
}

pub fn answer_yes_or_no() -> Reply {
    Reply::with_keyboard("Please answer Yes or No.", Keyboard::new([[YES, NO]]))
}

pub fn entry_saved() -> Reply {
    Reply::text("Successfully updated records! Type /start for other actions.")
}

// --- Edit / delete flow ---

pub fn ask_date_for_edit() -> Reply {
    Reply::text("Date of shift to edit or delete in DD/MM/YYYY (i.e. 01/01/2023).")
}

pub fn no_entry_on(date: NaiveDate) -> Reply {
    Reply::text(format!(
        "Did not find data records on {}. \n\n Press /add to key in a new entry, or\n /cancel to end the conversation.",
        format_input_date(date)
    ))
}

fn edit_choices() -> Keyboard {
    Keyboard::new([[EDIT, DELETE, CANCEL]])
}

pub fn entry_found(entry: &ShiftEntry) -> Reply {
    Reply::with_keyboard(
        format!(
            "Data found: \n\n Date: {}\n Shift: {} \n\n Edit - Change Shift Type \n Delete - Remove data \n Cancel - Undo Command",
            format_input_date(entry.date),
            entry.shift_code
        ),
        edit_choices(),
    )
}

pub fn choose_edit_delete_or_cancel() -> Reply {
    Reply::with_keyboard("Please choose Edit, Delete or Cancel.", edit_choices())
}

pub fn edit_cancelled(date: NaiveDate) -> Reply {
    Reply::text(format!(
        "Did not remove data records on {}. Press /add to key in a new entry, or /cancel to end the conversation.",
        format_input_date(date)
    ))
}

pub fn entry_deleted(date: NaiveDate) -> Reply {
    Reply::text(format!(
        "Successfully deleted entry on {}. \n\n Press /start for a new set of commands.",
        format_input_date(date)
    ))
}

pub fn ask_new_shift_type(catalog: &ShiftCatalog) -> Reply {
    Reply::with_keyboard("New Shift type?", catalog.keyboard())
}

pub fn shift_type_updated(shift_code: &str, date: NaiveDate) -> Reply {
    Reply::removing_keyboard(format!(
        "Successfully updated shift type to {} on {}.\n\n Press /start for a new set of commands.",
        shift_code,
        format_input_date(date)
    ))
}

// --- Summary ---

pub fn payroll(caller: &Caller, summary: &PayrollSummary) -> Reply {
    Reply::text(format!(
        "Payroll for {} (@{}) \n\n{}\n\n Press /start for a new set of commands.",
        caller.display_name(),
        caller.username,
        summary.render()
    ))
}

pub fn payroll_failed(reason: &str) -> Reply {
    Reply::text(format!(
        "Could not compute the payroll ({reason}). Please correct the entry with /edit. /start"
    ))
}

// --- Store failures ---

pub fn fetch_failed() -> Reply {
    Reply::text("Could not fetch the relevant data, try again later. /start")
}

pub fn insert_failed() -> Reply {
    Reply::text("Could not insert data into database, try again later. /start")
}

pub fn delete_failed() -> Reply {
    Reply::text("Could not execute DELETE operation, try again later. /start")
}

pub fn update_failed() -> Reply {
    Reply::text("Could not execute UPDATE operation, try again later. /start")
}
