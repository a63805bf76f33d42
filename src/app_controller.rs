/*!
 * Build orchestration.
 *
 * Runs one build: every dataset is parsed and validated in its own
 * tokio task with a task-local diagnostic buffer (no shared log, no
 * lock contention, no nondeterministic interleaving), the buffers are
 * merged in sorted-code order after all tasks have joined, fatal
 * conditions are checked, and only then does the aligner run over the
 * complete translation set.
 *
 * An optional top-level timeout aborts the build; diagnostics from
 * tasks that finished in time are still reported, but no
 * cross-reference map is produced.
 */

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;
use indicatif::ProgressBar;
use log::{info, warn};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::alignment::{Aligner, CrossReferenceMap};
use crate::app_config::Config;
use crate::corpus::{SourceDataset, Translation};
use crate::diagnostics::{DiagnosticBuffer, ProcessingStats, Stage};
use crate::errors::BuildError;
use crate::parser::{SourceFormat, TextParser};
use crate::validation::{ValidationReport, ValidationService};

/// Everything one build run produced.
#[derive(Debug)]
pub struct BuildOutput {
    /// Validated translations, keyed by code
    pub translations: BTreeMap<String, Translation>,

    /// Per-translation validation reports
    pub reports: BTreeMap<String, ValidationReport>,

    /// The alignment result; absent when the build timed out
    pub crossrefs: Option<CrossReferenceMap>,

    /// Merged diagnostics of the whole run
    pub diagnostics: DiagnosticBuffer,

    /// Whether the top-level timeout cut the build short
    pub timed_out: bool,
}

impl BuildOutput {
    /// Corpus volume counters for the diagnostic report.
    pub fn stats(&self) -> ProcessingStats {
        ProcessingStats {
            translations: self.translations.len(),
            books: self.translations.values().map(|t| t.books.len()).sum(),
            chapters: self.translations.values().map(|t| t.chapter_count()).sum(),
            verses: self.translations.values().map(|t| t.verse_count()).sum(),
        }
    }
}

/// Result of one per-dataset task
struct TaskResult {
    code: String,
    translation: Option<(Translation, ValidationReport)>,
    diagnostics: DiagnosticBuffer,
}

/// Main application controller for corpus builds
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a full build over the given datasets.
    pub async fn build(&self, datasets: Vec<SourceDataset>) -> Result<BuildOutput> {
        self.build_with_progress(datasets, None).await
    }

    /// Run a full build, ticking the progress bar as translation tasks
    /// complete.
    pub async fn build_with_progress(
        &self,
        datasets: Vec<SourceDataset>,
        progress: Option<&ProgressBar>,
    ) -> Result<BuildOutput> {
        let task_count = datasets.len();
        info!("starting build over {} datasets", task_count);

        let (tx, mut rx) = mpsc::channel::<TaskResult>(task_count.max(1));
        for dataset in datasets {
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = run_dataset_task(dataset);
                let _ = tx.send(result).await;
            });
        }
        drop(tx);

        // Join barrier: collect every task, or stop at the deadline.
        let deadline = self
            .config
            .build_timeout_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));
        let mut results: Vec<TaskResult> = Vec::new();
        let mut timed_out = false;

        loop {
            let received = match deadline {
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        timed_out = true;
                        None
                    } else {
                        tokio::select! {
                            received = rx.recv() => received,
                            _ = tokio::time::sleep_until(deadline) => {
                                timed_out = true;
                                None
                            }
                        }
                    }
                }
                None => rx.recv().await,
            };
            match received {
                Some(result) => {
                    if let Some(bar) = progress {
                        bar.inc(1);
                    }
                    results.push(result);
                }
                None => break,
            }
        }

        // Merge per-task buffers in sorted-code order, never in
        // completion order.
        results.sort_by(|a, b| a.code.cmp(&b.code));

        let mut diagnostics = DiagnosticBuffer::new();
        let mut translations: BTreeMap<String, Translation> = BTreeMap::new();
        let mut reports: BTreeMap<String, ValidationReport> = BTreeMap::new();

        for result in results {
            diagnostics.merge(result.diagnostics);
            if let Some((translation, report)) = result.translation {
                translations.insert(result.code.clone(), translation);
                reports.insert(result.code, report);
            }
        }

        if timed_out {
            let timeout = self.config.build_timeout_secs.unwrap_or_default();
            warn!("build timed out after {}s, reporting partial diagnostics", timeout);
            diagnostics.error(
                Stage::Align,
                BuildError::Timeout(timeout).to_string(),
                None,
            );
            return Ok(BuildOutput {
                translations,
                reports,
                crossrefs: None,
                diagnostics,
                timed_out: true,
            });
        }

        // Fatal conditions: nothing parsed, or the configured reference
        // skeleton is unavailable. Both abort before alignment.
        if translations.is_empty() {
            return Err(BuildError::NoTranslations.into());
        }
        if let Some(reference) = &self.config.alignment.reference_translation {
            if !translations.contains_key(reference) {
                return Err(BuildError::ReferenceUnavailable(reference.clone()).into());
            }
        }

        let mut aligner = Aligner::new(self.config.alignment.clone());
        let crossrefs = aligner.align(&translations, &mut diagnostics)?;

        Ok(BuildOutput {
            translations,
            reports,
            crossrefs: Some(crossrefs),
            diagnostics,
            timed_out: false,
        })
    }
}

/// Parse and validate one dataset. Runs inside its own task; every
/// diagnostic goes to the task-local buffer.
fn run_dataset_task(dataset: SourceDataset) -> TaskResult {
    let mut diagnostics = DiagnosticBuffer::new();
    let code = dataset.code.clone();

    let format = SourceFormat::detect(&dataset.raw);
    let parser = TextParser::new(format);

    match parser.parse(&dataset.raw, &code) {
        Ok(outcome) => {
            for issue in &outcome.issues {
                diagnostics.error(
                    Stage::Parse,
                    issue.to_string(),
                    Some(json!({ "translation": code.clone(), "line": issue.line })),
                );
            }

            let mut translation = outcome.translation;
            let report = ValidationService::new().validate(&mut translation, &mut diagnostics);

            diagnostics.info(
                Stage::Parse,
                format!(
                    "Processed '{}': {} books, {} chapters, {} verses",
                    code,
                    translation.books.len(),
                    translation.chapter_count(),
                    translation.verse_count()
                ),
            );

            TaskResult {
                code,
                translation: Some((translation, report)),
                diagnostics,
            }
        }
        Err(failure) => {
            for issue in &failure.issues {
                diagnostics.error(
                    Stage::Parse,
                    issue.to_string(),
                    Some(json!({ "translation": code.clone(), "line": issue.line })),
                );
            }
            diagnostics.error(Stage::Parse, failure.to_string(), None);
            TaskResult {
                code,
                translation: None,
                diagnostics,
            }
        }
    }
}
