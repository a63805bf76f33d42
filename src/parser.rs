/*!
 * Line-oriented translation parser.
 *
 * Turns one translation's raw text into the ordered book -> chapter ->
 * verse tree with deterministic identifiers. The parser is a strict
 * state machine (`ExpectBook -> ExpectChapterOrVerse -> InChapter`);
 * any line that fits none of the recognized shapes becomes a
 * [`ParseIssue`] and parsing continues past it, so a single bad line
 * costs exactly one verse, never a chapter.
 *
 * Format variance between datasets is handled by a closed set of
 * [`SourceFormat`] variants selected once per dataset; the state machine
 * itself is uniform across formats.
 */

use std::fmt;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::corpus::{deterministic_id, Book, CanonicalRef, Chapter, Translation, Verse};

// Verse line: number or range, then text
static VERSE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)(?:-(\d+))?\s+(\S.*)$").unwrap());

// Chapter heading: "Chapter 3" or a bare number line
static CHAPTER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:Chapter\s+)?(\d+)\s*$").unwrap());

// Heuristic for book names not in the canonical table
static BOOK_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][a-zA-Z\s]+$").unwrap());

// Embedded "chapter:verse" marker inside a verse line (InlineRefs format)
static INLINE_REF_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s(\d+):(\d+)(?:\s+|$)").unwrap());

/// Canonical book names recognized as section headings.
const BOOK_NAMES: &[&str] = &[
    "Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy",
    "Joshua", "Judges", "Ruth", "1 Samuel", "2 Samuel", "1 Kings", "2 Kings",
    "1 Chronicles", "2 Chronicles", "Ezra", "Nehemiah", "Esther", "Job",
    "Psalm", "Psalms", "Proverbs", "Ecclesiastes", "Song of Solomon", "Song of Songs",
    "Isaiah", "Jeremiah", "Lamentations", "Ezekiel", "Daniel", "Hosea", "Joel",
    "Amos", "Obadiah", "Jonah", "Micah", "Nahum", "Habakkuk", "Zephaniah",
    "Haggai", "Zechariah", "Malachi",
    "Matthew", "Mark", "Luke", "John", "Acts", "Romans", "1 Corinthians",
    "2 Corinthians", "Galatians", "Ephesians", "Philippians", "Colossians",
    "1 Thessalonians", "2 Thessalonians", "1 Timothy", "2 Timothy", "Titus",
    "Philemon", "Hebrews", "James", "1 Peter", "2 Peter", "1 John", "2 John",
    "3 John", "Jude", "Revelation",
];

/// Input format of one dataset, selected once before parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFormat {
    /// One verse per line, nothing embedded
    #[default]
    Standard,

    /// Verse lines may carry embedded `chapter:verse` markers that start
    /// a new verse mid-line
    InlineRefs,
}

impl SourceFormat {
    /// Detect the format from the raw text. Datasets with embedded
    /// `c:v` markers inside verse lines use [`SourceFormat::InlineRefs`].
    pub fn detect(raw: &str) -> Self {
        let hits = raw
            .lines()
            .filter(|line| VERSE_PATTERN.is_match(line) && INLINE_REF_PATTERN.is_match(line))
            .take(3)
            .count();
        if hits >= 3 {
            SourceFormat::InlineRefs
        } else {
            SourceFormat::Standard
        }
    }
}

/// One line the parser could not interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// 1-based line number in the raw dataset
    pub line: usize,

    /// The offending line, verbatim
    pub content: String,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: unrecognized content {:?}", self.line, self.content)
    }
}

/// Total parse failure: the dataset produced no verses at all.
#[derive(Debug, Error)]
#[error("dataset '{code}' produced no verses ({} unparseable lines)", .issues.len())]
pub struct ParseFailure {
    pub code: String,
    pub issues: Vec<ParseIssue>,
}

/// Successful parse: the translation tree plus any skipped lines.
#[derive(Debug)]
pub struct ParseOutcome {
    pub translation: Translation,
    pub issues: Vec<ParseIssue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    ExpectBook,
    ExpectChapterOrVerse,
    InChapter,
}

/// Line-oriented state machine parser for one translation.
pub struct TextParser {
    format: SourceFormat,
}

impl TextParser {
    pub fn new(format: SourceFormat) -> Self {
        TextParser { format }
    }

    /// Parse a raw dataset into a translation tree.
    ///
    /// Returns `Err` only on total failure (no verses at all); otherwise
    /// the translation is produced and unparseable lines are reported as
    /// issues alongside it.
    pub fn parse(&self, raw: &str, code: &str) -> Result<ParseOutcome, ParseFailure> {
        let mut translation = Translation::new(code);
        let mut issues: Vec<ParseIssue> = Vec::new();

        let mut state = ParserState::ExpectBook;
        let mut current_book: Option<String> = None;
        let mut current_chapter: Option<Chapter> = None;

        for (idx, line) in raw.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(book_name) = recognize_book_name(trimmed) {
                Self::commit_chapter(&mut translation, &mut current_chapter);
                current_book = Some(book_name);
                state = ParserState::ExpectChapterOrVerse;
                continue;
            }

            if state != ParserState::ExpectBook {
                if let Some(chapter_number) = extract_chapter_number(trimmed) {
                    Self::commit_chapter(&mut translation, &mut current_chapter);
                    let book = current_book.as_deref().unwrap_or_default();
                    current_chapter = Some(Chapter::new(book, chapter_number));
                    state = ParserState::InChapter;
                    continue;
                }

                if let Some(captures) = VERSE_PATTERN.captures(trimmed) {
                    // A verse line directly after a book heading opens
                    // chapter 1 implicitly.
                    if current_chapter.is_none() {
                        let book = current_book.as_deref().unwrap_or_default();
                        current_chapter = Some(Chapter::new(book, 1));
                        state = ParserState::InChapter;
                    }
                    let chapter = current_chapter.as_mut().unwrap();
                    if !self.push_verse_line(chapter, &captures, code) {
                        issues.push(ParseIssue {
                            line: idx + 1,
                            content: line.to_string(),
                        });
                    }
                    continue;
                }
            }

            issues.push(ParseIssue {
                line: idx + 1,
                content: line.to_string(),
            });
        }

        Self::commit_chapter(&mut translation, &mut current_chapter);

        debug!(
            "parsed dataset '{}': {} books, {} chapters, {} verses, {} issues",
            code,
            translation.books.len(),
            translation.chapter_count(),
            translation.verse_count(),
            issues.len()
        );

        if translation.verse_count() == 0 {
            return Err(ParseFailure {
                code: code.to_string(),
                issues,
            });
        }

        translation.summary.parse_issues = issues.len();
        Ok(ParseOutcome { translation, issues })
    }

    /// Append one matched verse line to the current chapter. Returns
    /// false when the line is structurally a verse but still invalid
    /// (inverted range), in which case the caller records an issue.
    fn push_verse_line(&self, chapter: &mut Chapter, captures: &regex::Captures<'_>, code: &str) -> bool {
        let start: u32 = match captures.get(1).and_then(|m| m.as_str().parse().ok()) {
            Some(n) => n,
            None => return false,
        };
        let end: Option<u32> = captures.get(2).and_then(|m| m.as_str().parse().ok());
        let text = captures.get(3).map_or("", |m| m.as_str()).trim().to_string();

        match end {
            Some(end) if end < start => false,
            Some(end) => {
                // Range verses share the base id with a positional
                // suffix; every expanded record carries the full text.
                let range_ref = format!("{}.{}.{}-{}", chapter.book, chapter.number, start, end);
                let base_id = deterministic_id(code, &range_ref, &text);
                for (offset, number) in (start..=end).enumerate() {
                    let reference = CanonicalRef::new(chapter.book.clone(), chapter.number, number);
                    let id = format!("{}-{}", base_id, offset);
                    chapter.insert(Verse::new(id, number, text.clone(), &reference));
                }
                true
            }
            None => {
                for (number, segment) in self.split_segments(chapter.number, start, &text) {
                    let reference = CanonicalRef::new(chapter.book.clone(), chapter.number, number);
                    let id = deterministic_id(code, &reference.to_string(), &segment);
                    chapter.insert(Verse::new(id, number, segment, &reference));
                }
                true
            }
        }
    }

    /// Split a verse text at embedded `chapter:verse` markers belonging
    /// to the current chapter. `Standard` datasets always yield a single
    /// segment.
    fn split_segments(&self, chapter: u32, number: u32, text: &str) -> Vec<(u32, String)> {
        if self.format == SourceFormat::Standard {
            return vec![(number, text.to_string())];
        }

        let mut segments = Vec::new();
        let mut current_number = number;
        let mut remaining = text.to_string();

        loop {
            let Some(captures) = INLINE_REF_PATTERN.captures(&remaining) else {
                break;
            };
            let marker_chapter: u32 = captures.get(1).unwrap().as_str().parse().unwrap_or(0);
            if marker_chapter != chapter {
                break;
            }
            let marker_verse: u32 = captures.get(2).unwrap().as_str().parse().unwrap_or(0);
            let whole = captures.get(0).unwrap();
            let before = remaining[..whole.start()].trim().to_string();
            let after = remaining[whole.end()..].trim().to_string();

            if !before.is_empty() {
                segments.push((current_number, before));
            }
            current_number = marker_verse;
            remaining = after;
            if remaining.is_empty() {
                break;
            }
        }

        if !remaining.trim().is_empty() {
            segments.push((current_number, remaining.trim().to_string()));
        }
        if segments.is_empty() {
            segments.push((number, text.to_string()));
        }
        segments
    }

    fn commit_chapter(translation: &mut Translation, current: &mut Option<Chapter>) {
        let Some(chapter) = current.take() else {
            return;
        };
        if chapter.verses.is_empty() && chapter.duplicates.is_empty() {
            return;
        }
        let book = translation
            .books
            .entry(chapter.book.clone())
            .or_insert_with(|| Book::new(chapter.book.clone()));
        match book.chapters.entry(chapter.number) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(chapter);
            }
            std::collections::btree_map::Entry::Occupied(mut slot) => {
                // Same chapter number seen twice: fold the verses in,
                // first occurrence of each number still wins.
                let existing = slot.get_mut();
                let Chapter { verses, duplicates, .. } = chapter;
                for (_, verse) in verses {
                    existing.insert(verse);
                }
                existing.duplicates.extend(duplicates);
            }
        }
    }
}

impl Default for TextParser {
    fn default() -> Self {
        Self::new(SourceFormat::Standard)
    }
}

/// Match a line against the canonical book table, then the capitalized
/// words heuristic for unlisted names.
fn recognize_book_name(line: &str) -> Option<String> {
    if BOOK_NAMES.contains(&line) {
        return Some(line.to_string());
    }

    if BOOK_NAME_PATTERN.is_match(line) && line.len() > 2 && !line.contains("Chapter") {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.len() <= 4
            && words
                .iter()
                .all(|w| w.chars().next().is_some_and(|c| c.is_uppercase()))
        {
            return Some(line.to_string());
        }
    }

    None
}

fn extract_chapter_number(line: &str) -> Option<u32> {
    CHAPTER_PATTERN
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
}
