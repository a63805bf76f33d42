/*!
 * # crossverse - Cross-version corpus alignment
 *
 * A Rust library for parsing book/chapter/verse structured translations
 * of a canonical text corpus and aligning them against each other.
 *
 * ## Features
 *
 * - Line-oriented parsing of translation datasets with deterministic
 *   verse identifiers
 * - Structural validation: malformed entries, duplicates, numbering gaps
 * - Verse text sanitization (entity encoding, script stripping)
 * - Cross-translation alignment: exact canonical matching with a
 *   textual-similarity fallback and deterministic conflict resolution
 * - Severity-tagged build diagnostics with per-task accumulation
 * - Byte-identical output for identical input and configuration
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `corpus`: Data model (datasets, canonical references, verse trees)
 * - `parser`: Line-oriented state machine parser
 * - `validation`: Structural checks and sanitization:
 *   - `validation::structure`: Malformed-verse and gap detection
 *   - `validation::sanitize`: Text sanitization
 *   - `validation::service`: Orchestration and reporting
 * - `alignment`: Cross-translation alignment:
 *   - `alignment::similarity`: Jaccard / Levenshtein primitives
 *   - `alignment::map`: Cross-reference map structures
 *   - `alignment::aligner`: The alignment algorithm
 * - `diagnostics`: Severity-tagged build diagnostics
 * - `app_controller`: Build orchestration (concurrency, join, timeout)
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod alignment;
pub mod app_config;
pub mod app_controller;
pub mod corpus;
pub mod diagnostics;
pub mod errors;
pub mod file_utils;
pub mod parser;
pub mod validation;

// Re-export main types for easier usage
pub use alignment::{Aligner, CrossReferenceMap, NullReason};
pub use app_config::{AlignmentConfig, Config};
pub use app_controller::{BuildOutput, Controller};
pub use corpus::{CanonicalRef, SourceDataset, Translation, Verse};
pub use diagnostics::{DiagnosticBuffer, DiagnosticEntry, Severity, Stage};
pub use errors::{AppError, BuildError, CorpusError};
pub use parser::{SourceFormat, TextParser};
pub use validation::ValidationService;
