/*!
 * Validation module for parsed translations.
 *
 * This module inspects a parsed translation for structural problems and
 * repairs what can be repaired in place:
 * - Malformed verses (empty text, control characters) are flagged but kept
 * - Duplicate verse numbers are dropped, first occurrence wins
 * - Gaps between the lowest and highest verse number are reported
 * - Verse text is sanitized (script-like sequences stripped, markup
 *   characters entity-encoded)
 *
 * # Architecture
 *
 * - `structure`: malformed-verse and gap detection
 * - `sanitize`: text sanitization
 * - `service`: orchestrates the validators over a translation
 */

pub mod sanitize;
pub mod service;
pub mod structure;

// Re-export main types
pub use sanitize::TextSanitizer;
pub use service::{ValidationReport, ValidationService, ValidationStatistics};
