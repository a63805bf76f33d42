/*!
 * Validation service that orchestrates all validators.
 *
 * Runs the structural checks and the sanitizer over a parsed
 * translation, repairing in place what can be repaired (duplicate drops,
 * sanitization) and reporting everything else. Validation never blocks
 * the build; the worst finding is an error-severity diagnostic on a
 * verse that is kept anyway.
 */

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::corpus::Translation;
use crate::diagnostics::{DiagnosticBuffer, Stage};

use super::sanitize::TextSanitizer;
use super::structure::StructureValidator;

/// Per-translation validation statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationStatistics {
    pub books: usize,
    pub chapters: usize,
    pub verses: usize,
    pub malformed: usize,
    pub duplicates_dropped: usize,
    pub gaps: usize,
    pub sanitized: usize,
}

/// Outcome of validating one translation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Translation code the report belongs to
    pub code: String,

    /// Canonical references of verses kept despite malformed text
    pub malformed: Vec<String>,

    /// Canonical references of dropped duplicate occurrences
    pub duplicates: Vec<String>,

    /// Canonical references of verse numbers missing inside a chapter
    pub gaps: Vec<String>,

    /// Canonical references whose text had executable sequences stripped
    pub sanitized: Vec<String>,

    pub statistics: ValidationStatistics,
}

impl ValidationReport {
    /// True when nothing at all was found.
    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty()
            && self.duplicates.is_empty()
            && self.gaps.is_empty()
            && self.sanitized.is_empty()
    }
}

/// Orchestrates structural checks and sanitization over one translation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationService {
    structure: StructureValidator,
    sanitizer: TextSanitizer,
}

impl ValidationService {
    pub fn new() -> Self {
        ValidationService {
            structure: StructureValidator::new(),
            sanitizer: TextSanitizer::new(),
        }
    }

    /// Validate and repair a translation in place.
    ///
    /// Duplicates are dropped (first occurrence wins), verse text is
    /// sanitized, and every finding lands both in the returned report and
    /// in the diagnostic buffer.
    pub fn validate(&self, translation: &mut Translation, diag: &mut DiagnosticBuffer) -> ValidationReport {
        let code = translation.code.clone();
        let mut report = ValidationReport {
            code: code.clone(),
            ..ValidationReport::default()
        };

        for chapter in translation.chapters_mut() {
            // Duplicates stashed by the parser: first-seen already won,
            // log and drop the rest.
            for dropped in chapter.duplicates.drain(..) {
                report.duplicates.push(dropped.canonical_ref.clone());
                diag.warning(
                    Stage::Validate,
                    format!("Duplicate verse {} dropped, first occurrence kept", dropped.canonical_ref),
                    Some(json!({ "translation": code.clone(), "ref": dropped.canonical_ref })),
                );
            }

            for verse in chapter.verses.values_mut() {
                if let Some(kind) = self.structure.check_verse(verse) {
                    report.malformed.push(verse.canonical_ref.clone());
                    diag.error(
                        Stage::Validate,
                        format!("Malformed verse {}: {}", verse.canonical_ref, kind),
                        Some(json!({ "translation": code.clone(), "ref": verse.canonical_ref.clone() })),
                    );
                }

                let sanitized = self.sanitizer.sanitize(&verse.text);
                if sanitized.stripped {
                    report.sanitized.push(verse.canonical_ref.clone());
                    diag.warning(
                        Stage::Validate,
                        format!("Stripped executable content from {}", verse.canonical_ref),
                        Some(json!({ "translation": code.clone(), "ref": verse.canonical_ref.clone() })),
                    );
                }
                verse.text = sanitized.text;
            }

            for missing in self.structure.missing_numbers(chapter) {
                let reference = format!("{}.{}.{}", chapter.book, chapter.number, missing);
                report.gaps.push(reference.clone());
                diag.warning(
                    Stage::Validate,
                    format!("Missing verse {} in {}.{}", missing, chapter.book, chapter.number),
                    Some(json!({ "translation": code.clone(), "ref": reference })),
                );
            }
        }

        report.statistics = ValidationStatistics {
            books: translation.books.len(),
            chapters: translation.chapter_count(),
            verses: translation.verse_count(),
            malformed: report.malformed.len(),
            duplicates_dropped: report.duplicates.len(),
            gaps: report.gaps.len(),
            sanitized: report.sanitized.len(),
        };

        translation.summary.malformed = report.statistics.malformed;
        translation.summary.duplicates_dropped = report.statistics.duplicates_dropped;
        translation.summary.gaps = report.statistics.gaps;
        translation.summary.sanitized = report.statistics.sanitized;

        debug!(
            "validated '{}': {} verses, {} malformed, {} duplicates dropped, {} gaps, {} sanitized",
            code,
            report.statistics.verses,
            report.statistics.malformed,
            report.statistics.duplicates_dropped,
            report.statistics.gaps,
            report.statistics.sanitized
        );

        report
    }
}
