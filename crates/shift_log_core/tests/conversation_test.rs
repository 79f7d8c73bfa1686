mod common;

use common::{day, Harness, OTHER_USER, STRANGER, USER};
use shift_log_core::{Caller, ConversationState, EditTarget, ReplyMarkup};

// ========================================================================
// Start / authorization
// ========================================================================

#[tokio::test]
async fn test_unauthorized_start_ends_immediately() {
    let h = Harness::new();
    let turn = h.say(STRANGER, &["/start"]).await;

    assert_eq!(turn.state, ConversationState::Terminal);
    assert_eq!(turn.reply.text, "You are not authorized to use this bot.");
    assert!(h.engine.session(STRANGER).await.is_none());
    assert_eq!(h.store.calls(), 0);

    // Nothing else opens up for them either.
    let turn = h.say(STRANGER, &["/add"]).await;
    assert_eq!(turn.reply.text, "Sorry, I didn't understand that command.");
    assert_eq!(h.engine.session_state(STRANGER).await, ConversationState::Idle);
}

#[tokio::test]
async fn test_start_shows_menu() {
    let h = Harness::new();
    let turn = h.say(USER, &["/start"]).await;

    assert_eq!(turn.state, ConversationState::Initiated);
    assert_eq!(turn.reply.text, "Welcome! What do you want to do?");
    let keyboard = turn.reply.keyboard().unwrap();
    assert_eq!(keyboard.labels().collect::<Vec<_>>(), ["/add", "/edit", "/summary"]);
    assert_eq!(keyboard.rows().len(), 2);
}

#[tokio::test]
async fn test_start_mid_flow_is_unknown_and_keeps_state() {
    let h = Harness::new();
    let turn = h.say(USER, &["/start", "/add", "/start"]).await;

    assert_eq!(turn.reply.text, "Sorry, I didn't understand that command.");
    assert_eq!(turn.state, ConversationState::AwaitingDateForAdd);
}

// ========================================================================
// Add flow
// ========================================================================

#[tokio::test]
async fn test_add_flow_records_entry() {
    let h = Harness::new();

    let turn = h.say(USER, &["/start", "/add"]).await;
    assert_eq!(turn.state, ConversationState::AwaitingDateForAdd);
    assert_eq!(turn.reply.text, "Date of shift in DD/MM/YYYY (i.e. 01/01/2023).");

    let turn = h.say(USER, &["01/01/2025"]).await;
    assert_eq!(turn.state, ConversationState::AwaitingShiftType { date: day(2025, 1, 1) });
    assert_eq!(turn.reply.text, "Shift type?");
    assert_eq!(turn.reply.keyboard().unwrap().rows()[0], vec!["E", "E6"]);

    let turn = h.say(USER, &["E"]).await;
    assert!(turn.reply.text.contains("Date: 01/01/2025"));
    assert!(turn.reply.text.contains("Shift: E"));
    assert!(turn.reply.text.contains("Total earned: $127.50"));
    let session = h.engine.session(USER).await.unwrap();
    assert_eq!(session.pending_date(), Some(day(2025, 1, 1)));
    assert_eq!(session.pending_shift_code(), Some("E"));

    let turn = h.say(USER, &["Yes"]).await;
    assert_eq!(turn.state, ConversationState::Terminal);
    assert_eq!(
        turn.reply.text,
        "Successfully updated records! Type /start for other actions."
    );

    let entries = h.entries(USER).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].date, day(2025, 1, 1));
    assert_eq!(entries[0].shift_code, "E");
    assert_eq!(entries[0].owner, USER);
    assert_eq!(h.engine.session_state(USER).await, ConversationState::Terminal);
}

#[tokio::test]
async fn test_malformed_date_reprompts_without_store_call() {
    let h = Harness::new();
    h.say(USER, &["/start", "/add"]).await;

    for bad in ["2025-01-01", "31/02/2025", "tomorrow", "1/1/25"] {
        let turn = h.say(USER, &[bad]).await;
        assert_eq!(turn.state, ConversationState::AwaitingDateForAdd);
        assert_eq!(
            turn.reply.text,
            "Error in recognising date. Please ensure format is in DD/MM/YYYY."
        );
    }
    assert_eq!(h.store.calls(), 0);
}

#[tokio::test]
async fn test_duplicate_date_is_rejected_before_insert() {
    let h = Harness::new();
    h.say(USER, &["/start", "/add", "01/01/2025", "E", "Yes"]).await;
    let calls_after_first = h.store.calls();

    let turn = h.say(USER, &["/start", "/add", "01/01/2025"]).await;
    assert_eq!(turn.state, ConversationState::Initiated);
    assert!(turn.reply.text.starts_with("Duplicate entry exists in records"));
    assert!(turn.reply.text.contains("Date: 2025-01-01"));
    assert!(turn.reply.text.contains("Shift: E"));

    // Only the duplicate lookup ran; no second insert.
    assert_eq!(h.store.calls(), calls_after_first + 1);
    assert_eq!(h.entries(USER).await.len(), 1);

    // From Initiated the user can go straight to another command.
    let turn = h.say(USER, &["/add", "02/01/2025", "M", "Yes"]).await;
    assert_eq!(turn.state, ConversationState::Terminal);
    assert_eq!(h.entries(USER).await.len(), 2);
}

#[tokio::test]
async fn test_entry_recorded_meanwhile_is_reported_as_duplicate() {
    let h = Harness::new();
    h.say(USER, &["/start", "/add", "03/03/2025", "E"]).await;

    // Someone else's client inserts the same day before confirmation.
    use shift_log_core::EntryStore;
    h.store.inner.insert(day(2025, 3, 3), "L", USER).await.unwrap();

    let turn = h.say(USER, &["Yes"]).await;
    assert_eq!(turn.state, ConversationState::Initiated);
    assert!(turn.reply.text.contains("03/03/2025"));
    let entries = h.entries(USER).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].shift_code, "L");
}

#[tokio::test]
async fn test_unknown_shift_type_reprompts() {
    let h = Harness::new();
    let turn = h.say(USER, &["/start", "/add", "05/05/2025", "Z9"]).await;

    assert_eq!(turn.state, ConversationState::AwaitingShiftType { date: day(2025, 5, 5) });
    assert!(turn.reply.text.contains("Unknown shift type 'Z9'"));
    assert!(turn.reply.keyboard().is_some());

    let turn = h.say(USER, &["CAF"]).await;
    assert!(turn.reply.text.contains("Total earned: $150.00"));
}

#[tokio::test]
async fn test_no_goes_back_to_date_prompt() {
    let h = Harness::new();
    let turn = h.say(USER, &["/start", "/add", "05/05/2025", "E", "No"]).await;

    assert_eq!(turn.state, ConversationState::AwaitingDateForAdd);
    assert_eq!(turn.reply.text, "Re-enter date of shift in DD/MM/YYYY format.");
    assert!(h.entries(USER).await.is_empty());

    h.say(USER, &["06/05/2025", "L3", "Yes"]).await;
    let entries = h.entries(USER).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].date, day(2025, 5, 6));
}

#[tokio::test]
async fn test_other_answer_at_confirmation_reprompts() {
    let h = Harness::new();
    let turn = h.say(USER, &["/start", "/add", "05/05/2025", "E", "maybe"]).await;

    assert_eq!(
        turn.state,
        ConversationState::AwaitingConfirmation {
            date: day(2025, 5, 5),
            shift_code: "E".to_string()
        }
    );
    assert_eq!(turn.reply.text, "Please answer Yes or No.");
    assert!(h.entries(USER).await.is_empty());
}

// ========================================================================
// Edit / delete flow
// ========================================================================

#[tokio::test]
async fn test_edit_changes_shift_type() {
    let h = Harness::new();
    h.say(USER, &["/start", "/add", "10/02/2025", "E", "Yes"]).await;
    let id = h.entries(USER).await[0].id;

    let turn = h.say(USER, &["/start", "/edit", "10/02/2025"]).await;
    assert_eq!(
        turn.state,
        ConversationState::AwaitingEditDeleteChoice {
            target: EditTarget {
                id,
                date: day(2025, 2, 10),
                shift_code: "E".to_string()
            }
        }
    );
    assert!(turn.reply.text.starts_with("Data found"));
    assert_eq!(
        turn.reply.keyboard().unwrap().labels().collect::<Vec<_>>(),
        ["Edit", "Delete", "Cancel"]
    );
    let session = h.engine.session(USER).await.unwrap();
    assert_eq!(session.edit_target_id(), Some(id));
    assert_eq!(session.edit_target_date(), Some(day(2025, 2, 10)));

    let turn = h.say(USER, &["Edit"]).await;
    assert_eq!(turn.reply.text, "New Shift type?");

    let turn = h.say(USER, &["nonsense"]).await;
    assert!(matches!(turn.state, ConversationState::AwaitingNewShiftType { .. }));

    let turn = h.say(USER, &["F10"]).await;
    assert_eq!(turn.state, ConversationState::Terminal);
    assert_eq!(turn.reply.markup, ReplyMarkup::RemoveKeyboard);
    assert!(turn
        .reply
        .text
        .starts_with("Successfully updated shift type to F10 on 10/02/2025."));
    assert_eq!(h.entries(USER).await[0].shift_code, "F10");
}

#[tokio::test]
async fn test_delete_removes_entry() {
    let h = Harness::new();
    h.say(USER, &["/start", "/add", "10/02/2025", "E", "Yes"]).await;

    let turn = h.say(USER, &["/start", "/edit", "10/02/2025", "Delete"]).await;
    assert_eq!(turn.state, ConversationState::Terminal);
    assert!(turn.reply.text.starts_with("Successfully deleted entry on 10/02/2025."));
    assert!(h.entries(USER).await.is_empty());
}

#[tokio::test]
async fn test_delete_of_vanished_entry_returns_to_menu() {
    let h = Harness::new();
    h.say(USER, &["/start", "/add", "10/02/2025", "E", "Yes"]).await;
    h.say(USER, &["/start", "/edit", "10/02/2025"]).await;

    use shift_log_core::EntryStore;
    let id = h.entries(USER).await[0].id;
    h.store.inner.delete_by_id(id).await.unwrap();

    let turn = h.say(USER, &["Delete"]).await;
    assert_eq!(turn.state, ConversationState::Initiated);
    assert!(turn.reply.text.starts_with("Did not find data records on 10/02/2025."));
}

#[tokio::test]
async fn test_edit_cancel_and_unknown_choice() {
    let h = Harness::new();
    h.say(USER, &["/start", "/add", "10/02/2025", "E", "Yes"]).await;

    let turn = h.say(USER, &["/start", "/edit", "10/02/2025", "Rename"]).await;
    assert!(matches!(turn.state, ConversationState::AwaitingEditDeleteChoice { .. }));
    assert_eq!(turn.reply.text, "Please choose Edit, Delete or Cancel.");

    let turn = h.say(USER, &["Cancel"]).await;
    assert_eq!(turn.state, ConversationState::Initiated);
    assert!(turn.reply.text.starts_with("Did not remove data records on 10/02/2025."));
    assert_eq!(h.entries(USER).await.len(), 1);
}

#[tokio::test]
async fn test_edit_of_missing_date_returns_to_menu() {
    let h = Harness::new();
    let turn = h.say(USER, &["/start", "/edit", "11/11/2025"]).await;

    assert_eq!(turn.state, ConversationState::Initiated);
    assert!(turn.reply.text.starts_with("Did not find data records on 11/11/2025."));
}

#[tokio::test]
async fn test_edit_rejects_malformed_date_without_store_call() {
    let h = Harness::new();
    let turn = h.say(USER, &["/start", "/edit", "11-11-2025"]).await;

    assert_eq!(turn.state, ConversationState::AwaitingDateForEdit);
    assert_eq!(h.store.calls(), 0);
}

// ========================================================================
// Summary
// ========================================================================

#[tokio::test]
async fn test_summary_lists_pay_periods() {
    let h = Harness::new();
    h.say(USER, &["/start", "/add", "16/01/2024", "E", "Yes"]).await;
    h.say(USER, &["/start", "/add", "14/01/2024", "E", "Yes"]).await;
    h.say(OTHER_USER, &["/start", "/add", "15/01/2024", "F8", "Yes"]).await;

    let caller = Caller::new(USER).with_display_name("Terry");
    h.engine.handle(&caller, "/start").await;
    let turn = h.engine.handle(&caller, "/summary").await;

    assert_eq!(turn.state, ConversationState::Terminal);
    assert_eq!(
        turn.reply.text,
        "Payroll for Terry (@terrykms) \n\n\
         2024-01-14: $127.50 (E)\n\
         \n MONTH TOTAL: $127.50 \n ---------- \n\n\
         2024-01-16: $127.50 (E)\n\
         \n MONTH TOTAL: $127.50\n\n Press /start for a new set of commands."
    );
}

#[tokio::test]
async fn test_summary_of_nothing() {
    let h = Harness::new();
    let turn = h.say(USER, &["/start", "/summary"]).await;

    assert_eq!(turn.state, ConversationState::Terminal);
    assert_eq!(
        turn.reply.text,
        "Payroll for terrykms (@terrykms) \n\n\n\n Press /start for a new set of commands."
    );
}

#[tokio::test]
async fn test_summary_with_unknown_stored_code_fails_gracefully() {
    let h = Harness::new();
    use shift_log_core::EntryStore;
    h.store.inner.insert(day(2024, 1, 1), "LEGACY", USER).await.unwrap();

    let turn = h.say(USER, &["/start", "/summary"]).await;
    assert_eq!(turn.state, ConversationState::Terminal);
    assert!(turn.reply.text.contains("LEGACY"));
}

// ========================================================================
// Failures, cancel, unknown commands, isolation
// ========================================================================

#[tokio::test]
async fn test_store_failure_forces_terminal() {
    let h = Harness::new();
    h.say(USER, &["/start", "/add"]).await;
    h.store.set_failing(true);

    let turn = h.say(USER, &["01/01/2025"]).await;
    assert_eq!(turn.state, ConversationState::Terminal);
    assert_eq!(
        turn.reply.text,
        "Could not fetch the relevant data, try again later. /start"
    );

    let turn = h.say(USER, &["/start", "/summary"]).await;
    assert_eq!(turn.state, ConversationState::Terminal);

    // Recovery needs a fresh /start once the store is back.
    h.store.set_failing(false);
    let turn = h.say(USER, &["/start", "/add", "01/01/2025", "E", "Yes"]).await;
    assert_eq!(turn.state, ConversationState::Terminal);
    assert_eq!(h.entries(USER).await.len(), 1);
}

#[tokio::test]
async fn test_insert_failure_reports_retry() {
    let h = Harness::new();
    h.say(USER, &["/start", "/add", "01/01/2025", "E"]).await;
    h.store.set_failing(true);

    let turn = h.say(USER, &["Yes"]).await;
    assert_eq!(turn.state, ConversationState::Terminal);
    assert_eq!(
        turn.reply.text,
        "Could not insert data into database, try again later. /start"
    );
}

#[tokio::test]
async fn test_cancel_from_any_state() {
    let h = Harness::new();
    for script in [
        vec!["/cancel"],
        vec!["/start", "/cancel"],
        vec!["/start", "/add", "/cancel"],
        vec!["/start", "/add", "01/01/2025", "/cancel"],
        vec!["/start", "/add", "01/01/2025", "E", "/cancel"],
    ] {
        let turn = h.say(USER, &script).await;
        assert_eq!(turn.state, ConversationState::Terminal, "{script:?}");
        assert_eq!(turn.reply.text, "Bye! Press /start for another command.");
    }
    assert!(h.entries(USER).await.is_empty());
}

#[tokio::test]
async fn test_unknown_command_keeps_state() {
    let h = Harness::new();
    let turn = h.say(USER, &["/start", "/add", "01/01/2025", "/summary"]).await;

    assert_eq!(turn.reply.text, "Sorry, I didn't understand that command.");
    assert_eq!(turn.state, ConversationState::AwaitingShiftType { date: day(2025, 1, 1) });

    let turn = h.say(USER, &["/frobnicate"]).await;
    assert_eq!(turn.state, ConversationState::AwaitingShiftType { date: day(2025, 1, 1) });

    // Still usable afterwards.
    let turn = h.say(USER, &["E", "Yes"]).await;
    assert_eq!(turn.state, ConversationState::Terminal);
}

#[tokio::test]
async fn test_text_outside_a_flow_changes_nothing() {
    let h = Harness::new();
    let turn = h.say(USER, &["hello"]).await;
    assert_eq!(turn.state, ConversationState::Idle);

    let turn = h.say(USER, &["/start", "hello"]).await;
    assert_eq!(turn.state, ConversationState::Initiated);
    assert_eq!(turn.reply.text, "Sorry, I didn't understand that command.");
}

#[tokio::test]
async fn test_sessions_are_isolated_per_user() {
    let h = Harness::new();
    h.say(USER, &["/start", "/add", "01/01/2025"]).await;
    h.say(OTHER_USER, &["/start", "/add", "02/02/2025"]).await;
    h.say(USER, &["E"]).await;
    h.say(OTHER_USER, &["L5"]).await;
    h.say(OTHER_USER, &["Yes"]).await;
    h.say(USER, &["Yes"]).await;

    let mine = h.entries(USER).await;
    let theirs = h.entries(OTHER_USER).await;
    assert_eq!(mine.len(), 1);
    assert_eq!(theirs.len(), 1);
    assert_eq!((mine[0].date, mine[0].shift_code.as_str()), (day(2025, 1, 1), "E"));
    assert_eq!((theirs[0].date, theirs[0].shift_code.as_str()), (day(2025, 2, 2), "L5"));
}

#[tokio::test]
async fn test_concurrent_users_do_not_share_pending_state() {
    let h = std::sync::Arc::new(Harness::new());
    let mut tasks = Vec::new();
    for (user, date) in [(USER, "01/01/2025"), (OTHER_USER, "02/01/2025")] {
        let h = h.clone();
        tasks.push(tokio::spawn(async move {
            h.say(user, &["/start", "/add", date, "E", "Yes"]).await
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap().state, ConversationState::Terminal);
    }

    assert_eq!(h.entries(USER).await[0].date, day(2025, 1, 1));
    assert_eq!(h.entries(OTHER_USER).await[0].date, day(2025, 1, 2));
}
