/*!
 * Structural verse checks.
 *
 * Re-scans parsed verse text against the structural rules (non-empty, no
 * control characters) and finds numbering gaps inside a chapter. The
 * orchestrating service decides what to do with the findings; nothing
 * here mutates the translation.
 */

use std::fmt;

use crate::corpus::{Chapter, Verse};

/// Why a verse is considered malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedKind {
    /// Text is empty after trimming
    EmptyText,

    /// Text contains control characters
    ControlCharacters,
}

impl fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedKind::EmptyText => write!(f, "verse text is empty"),
            MalformedKind::ControlCharacters => write!(f, "verse text contains control characters"),
        }
    }
}

/// Stateless structural validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureValidator;

impl StructureValidator {
    pub fn new() -> Self {
        StructureValidator
    }

    /// Check one verse against the structural rules.
    pub fn check_verse(&self, verse: &Verse) -> Option<MalformedKind> {
        if verse.text.trim().is_empty() {
            return Some(MalformedKind::EmptyText);
        }
        if verse.text.chars().any(char::is_control) {
            return Some(MalformedKind::ControlCharacters);
        }
        None
    }

    /// Verse numbers missing between the minimum and maximum observed in
    /// the chapter, ascending.
    pub fn missing_numbers(&self, chapter: &Chapter) -> Vec<u32> {
        let (Some(min), Some(max)) = (chapter.min_verse(), chapter.max_verse()) else {
            return Vec::new();
        };
        (min..=max)
            .filter(|n| !chapter.verses.contains_key(n))
            .collect()
    }
}
