#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{letters, single, CountingReport};
use reportpage_core::errors::QueryPageError;
use reportpage_core::logging_facility::test_capture::init_test_capture;
use reportpage_core::runner::RUN_OP;
use reportpage_core::{
    log_op_end, log_op_error, log_op_start, AllowAll, EmitMode, GroupPermissions, Identity,
    PageBuffer, PageRequest, PageRunner,
};
use reportpage_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_CONTINUE_OFFSET, FIELD_DURATION_MS,
    FIELD_EMITTED, FIELD_ERR_CODE, FIELD_ERR_KIND, FIELD_LIMIT, FIELD_OFFSET, FIELD_REPORT,
};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, report = "Shortpages");

    let events = capture.events();
    let start_events: Vec<_> = events
        .iter()
        .filter(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_START))
        .collect();

    assert_eq!(start_events.len(), 1);
    assert_eq!(start_events[0].field(FIELD_REPORT), Some("Shortpages"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_2";

    let err = QueryPageError::UnknownReport {
        name: "Nopage".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    capture.assert_event_exists(op_name, EVENT_END_ERROR);
    let event = capture
        .events()
        .into_iter()
        .find(|e| e.op.as_deref() == Some(op_name))
        .unwrap();
    assert_eq!(event.field(FIELD_ERR_CODE), Some("ERR_NOT_FOUND"));
    assert_eq!(event.field(FIELD_ERR_KIND), Some("NotFound"));
    assert_eq!(event.field(FIELD_DURATION_MS), Some("10"));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_3";

    log_op_end!(op_name, duration_ms = 42);

    capture.assert_event_exists(op_name, EVENT_END);
}

#[test]
fn test_run_logs_start_and_end() {
    let capture = init_test_capture();
    let report = CountingReport::new(letters(8));
    let registry = single("LogRunPagesUnique", &report);
    let runner = PageRunner::new(&registry, &AllowAll);

    let mut buffer = PageBuffer::new();
    let request = PageRequest::new("LogRunPagesUnique", 2, 3).unwrap();
    runner
        .run(&request, &Identity::anonymous(), EmitMode::Direct(&mut buffer))
        .unwrap();

    let events = capture.events_where(RUN_OP, FIELD_REPORT, "LogRunPagesUnique");
    let kinds: Vec<_> = events.iter().filter_map(|e| e.event.as_deref()).collect();
    assert_eq!(kinds, vec![EVENT_START, EVENT_END]);

    assert_eq!(events[0].field(FIELD_OFFSET), Some("2"));
    assert_eq!(events[0].field(FIELD_LIMIT), Some("3"));
    assert_eq!(events[1].field(FIELD_EMITTED), Some("3"));
    assert_eq!(events[1].field(FIELD_CONTINUE_OFFSET), Some("Some(5)"));
    assert_eq!(events[1].field("disabled"), Some("false"));
    assert!(events[1].field(FIELD_DURATION_MS).is_some());
}

#[test]
fn test_denied_run_logs_end_error() {
    let capture = init_test_capture();
    let mut report = CountingReport::new(letters(2));
    report.permission = Some("unwatchedpages".to_string());
    let registry = single("LogDeniedPagesUnique", &report);
    let perms = GroupPermissions::new();
    let runner = PageRunner::new(&registry, &perms);

    let mut buffer = PageBuffer::new();
    let request = PageRequest::new("LogDeniedPagesUnique", 0, 3).unwrap();
    runner
        .run(&request, &Identity::anonymous(), EmitMode::Direct(&mut buffer))
        .unwrap_err();

    let events = capture.events_where(RUN_OP, FIELD_REPORT, "LogDeniedPagesUnique");
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].event.as_deref(), Some(EVENT_END_ERROR));
    assert_eq!(events[1].field(FIELD_ERR_CODE), Some("ERR_FORBIDDEN"));
    assert!(events.iter().all(|e| e.event.as_deref() != Some(EVENT_END)));
}
