use chrono::NaiveDate;

use crate::diagnostic::{DiagnosticCode, Severity};
use crate::text::Range;
use crate::validate::dates::{DateError, parse_date, validate_date_format, validate_date_logic, validate_dates};

#[test]
fn parses_plain_and_timed_dates() {
    let day = parse_date("2024-06-01").unwrap();
    assert_eq!(day.date(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    let timed = parse_date("2024-06-01-13:30").unwrap();
    assert_eq!(timed.format("%H:%M:%S").to_string(), "13:30:00");
    assert!(parse_date("2024-06-01-13:30:15").is_ok());
}

#[test]
fn rejects_bad_shapes_and_values() {
    assert_eq!(parse_date("2024/06/01"), Err(DateError::Format));
    assert_eq!(parse_date("24-06-01"), Err(DateError::Format));
    assert_eq!(parse_date("2024-13-01"), Err(DateError::Value));
    assert_eq!(parse_date("2023-02-29"), Err(DateError::Value));
    assert_eq!(parse_date("2024-02-30"), Err(DateError::Value));
    assert_eq!(parse_date("2024-06-01-25:00"), Err(DateError::Value));
    assert!(parse_date("2024-02-29").is_ok());
}

#[test]
fn format_diagnostics_carry_messages() {
    let range = Range::on_line(0, 6, 16);
    let diag = validate_date_format("2024/06/01", range).unwrap();
    assert_eq!(diag.code, DiagnosticCode::InvalidDateFormat);
    assert_eq!(diag.message, "Invalid date format. Expected YYYY-MM-DD, got: 2024/06/01");

    let diag = validate_date_format("2024-13-01", range).unwrap();
    assert_eq!(diag.code, DiagnosticCode::InvalidDateValue);
    assert_eq!(
        diag.message,
        "Invalid date: 2024-13-01 (e.g., month must be 01-12, day must be valid for month)"
    );

    assert!(validate_date_format("${now}", range).is_none());
    assert!(validate_date_format("2024-06-01", range).is_none());
}

#[test]
fn invalid_token_range_covers_value() {
    let diags = validate_dates("task t {\n  start 2024-1-5\n}\n");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].range, Range::on_line(1, 8, 16));
}

#[test]
fn equal_start_and_end_is_an_error() {
    let diags = validate_date_logic("task t \"T\" {\n  start 2024-06-01\n  end 2024-06-01\n}\n");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].severity, Severity::Error);
    assert_eq!(diags[0].code, DiagnosticCode::InvalidDateRange);
    assert_eq!(diags[0].message, "End date (2024-06-01) must be after start date (2024-06-01)");
    assert_eq!(diags[0].range, Range::on_line(2, 6, 16));
}

#[test]
fn ordered_dates_are_clean() {
    assert!(validate_dates("task t \"T\" {\n  start 2024-06-01\n  end 2024-06-15\n}\n").is_empty());
}

#[test]
fn constraint_ranges_are_warnings() {
    let text = "task t {\n  minstart 2024-06-10\n  maxstart 2024-06-01\n  minend 2024-07-01\n  maxend 2024-07-01\n}\n";
    let diags = validate_date_logic(text);
    assert_eq!(diags.len(), 2);
    assert!(diags.iter().all(|d| d.severity == Severity::Warning));
    assert!(diags.iter().all(|d| d.code == DiagnosticCode::InvalidConstraintRange));
    assert_eq!(diags[0].message, "maxstart (2024-06-01) must be after minstart (2024-06-10)");
    assert_eq!(diags[1].message, "maxend (2024-07-01) must be after minend (2024-07-01)");
}

#[test]
fn dates_are_scoped_per_task() {
    let text = "task a {\n  start 2024-06-10\n}\ntask b {\n  end 2024-06-01\n}\n";
    assert!(validate_date_logic(text).is_empty());
}

#[test]
fn nested_task_dates_do_not_mix_with_parent() {
    let text = "task p {\n  start 2024-06-10\n  task c {\n    end 2024-06-01\n  }\n  end 2024-07-01\n}\n";
    assert!(validate_date_logic(text).is_empty());
}

#[test]
fn later_attribute_overrides_earlier() {
    let text = "task t {\n  start 2024-06-01\n  end 2024-05-01\n  end 2024-06-20\n}\n";
    assert!(validate_date_logic(text).is_empty());
}

#[test]
fn malformed_dates_skip_logic_check() {
    let text = "task t {\n  start 2024-06-01\n  end 2024-13-01\n}\n";
    let diags = validate_dates(text);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, DiagnosticCode::InvalidDateValue);
}

#[test]
fn dates_outside_tasks_are_only_format_checked() {
    let text = "taskreport r \"R\" {\n  start 2024-06-10\n  end 2024-06-01\n}\n";
    assert!(validate_dates(text).is_empty());
}

#[test]
fn keywords_used_as_identifiers_are_skipped() {
    let text = "task start \"Kickoff\" {\n}\ntask t {\n  depends start\n}\n";
    assert!(validate_dates(text).is_empty());
}

#[test]
fn macros_comments_and_case() {
    let text = "task t {\n  start ${projectstart}\n  # end not-a-date\n  END 2024-06-01\n  Start 2024-06-02\n}\n";
    let diags = validate_dates(text);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, DiagnosticCode::InvalidDateRange);
}
