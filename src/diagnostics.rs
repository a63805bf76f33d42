/*!
 * Build diagnostics.
 *
 * Append-only accumulation of severity-tagged records emitted by the
 * parser, validator and aligner during one build run. Concurrent tasks
 * each write to their own [`DiagnosticBuffer`] and the buffers are merged
 * in a reduce step after all tasks have joined, so output ordering never
 * depends on task completion order. Retention and rotation of persisted
 * reports are an external collaborator's concern.
 */

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity of one diagnostic record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Pipeline stage a record originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Parse,
    Validate,
    Align,
}

/// One logged event; appended once, never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticEntry {
    pub severity: Severity,
    pub stage: Stage,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

/// Append-only diagnostic accumulator with severity counters.
///
/// Plain data by design: each concurrent task owns one, and the
/// controller merges them after the join barrier.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticBuffer {
    entries: Vec<DiagnosticEntry>,
    error_count: usize,
    warning_count: usize,
}

impl DiagnosticBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn push(&mut self, severity: Severity, stage: Stage, message: String, context: Option<Value>) {
        match severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Info => {}
        }
        self.entries.push(DiagnosticEntry {
            severity,
            stage,
            message,
            context,
        });
    }

    pub fn info(&mut self, stage: Stage, message: String) {
        self.push(Severity::Info, stage, message, None);
    }

    pub fn warning(&mut self, stage: Stage, message: String, context: Option<Value>) {
        self.push(Severity::Warning, stage, message, context);
    }

    pub fn error(&mut self, stage: Stage, message: String, context: Option<Value>) {
        self.push(Severity::Error, stage, message, context);
    }

    /// Absorb another buffer, preserving its internal ordering.
    pub fn merge(&mut self, other: DiagnosticBuffer) {
        self.error_count += other.error_count;
        self.warning_count += other.warning_count;
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[DiagnosticEntry] {
        &self.entries
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot the buffer into a report envelope. The build id and
    /// timestamp live only here; they never feed verse ids or the
    /// cross-reference map.
    pub fn report(&self, processed: ProcessingStats) -> DiagnosticReport {
        let now = Utc::now();
        DiagnosticReport {
            build_id: now.format("%Y%m%d-%H%M%S").to_string(),
            timestamp: now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            summary: ReportSummary {
                errors: self.error_count,
                warnings: self.warning_count,
                processed,
            },
            entries: self.entries.clone(),
        }
    }
}

/// Corpus volume counters for the report summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub translations: usize,
    pub books: usize,
    pub chapters: usize,
    pub verses: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub errors: usize,
    pub warnings: usize,
    pub processed: ProcessingStats,
}

/// Full ordered diagnostic output of one build run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub build_id: String,
    pub timestamp: String,
    pub summary: ReportSummary,
    pub entries: Vec<DiagnosticEntry>,
}
