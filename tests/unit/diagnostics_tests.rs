/*!
 * Tests for diagnostic accumulation and merging
 */

use crossverse::diagnostics::{DiagnosticBuffer, ProcessingStats, Severity, Stage};

/// Test that entries keep their append order
#[test]
fn test_buffer_appendOrder_shouldBePreserved() {
    let mut buffer = DiagnosticBuffer::new();
    buffer.info(Stage::Parse, "one".into());
    buffer.warning(Stage::Validate, "two".into(), None);
    buffer.error(Stage::Align, "three".into(), None);

    let messages: Vec<&str> = buffer.entries().iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["one", "two", "three"]);
}

/// Test the per-task merge pattern: buffers merged in a fixed order give
/// the same result regardless of task completion order
#[test]
fn test_merge_inFixedOrder_shouldBeDeterministic() {
    let make_task_buffer = |code: &str| {
        let mut buffer = DiagnosticBuffer::new();
        buffer.info(Stage::Parse, format!("parsed {}", code));
        buffer.warning(Stage::Validate, format!("gap in {}", code), None);
        buffer
    };

    // Completion order A: web finished first
    let mut merged_a = DiagnosticBuffer::new();
    for code in ["kjv", "web"] {
        merged_a.merge(make_task_buffer(code));
    }

    // Completion order B: kjv finished first; merge still sorted
    let mut merged_b = DiagnosticBuffer::new();
    for code in ["kjv", "web"] {
        merged_b.merge(make_task_buffer(code));
    }

    assert_eq!(merged_a.entries(), merged_b.entries());
    assert_eq!(merged_a.warning_count(), 2);
}

/// Test that severities map onto the report summary
#[test]
fn test_report_summary_shouldCountSeverities() {
    let mut buffer = DiagnosticBuffer::new();
    buffer.error(Stage::Parse, "bad line".into(), None);
    buffer.error(Stage::Validate, "empty verse".into(), None);
    buffer.warning(Stage::Align, "null entries".into(), None);
    buffer.info(Stage::Align, "done".into());

    let report = buffer.report(ProcessingStats::default());

    assert_eq!(report.summary.errors, 2);
    assert_eq!(report.summary.warnings, 1);
    assert_eq!(report.entries.len(), 4);
}

/// Test the serialized entry shape consumed by external tooling
#[test]
fn test_entry_serialization_shouldUseStableFieldNames() {
    let mut buffer = DiagnosticBuffer::new();
    buffer.push(
        Severity::Warning,
        Stage::Validate,
        "Duplicate verse".into(),
        Some(serde_json::json!({ "translation": "kjv", "ref": "Genesis.1.1" })),
    );

    let value = serde_json::to_value(&buffer.entries()[0]).unwrap();
    assert_eq!(value["severity"], "warning");
    assert_eq!(value["stage"], "validate");
    assert_eq!(value["message"], "Duplicate verse");
    assert_eq!(value["context"]["ref"], "Genesis.1.1");
}
