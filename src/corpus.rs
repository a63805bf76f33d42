/*!
 * Corpus data model.
 *
 * Types shared by the parser, validator and aligner: the raw dataset
 * wrapper, canonical verse references, and the ordered
 * book -> chapter -> verse tree of a parsed translation.
 */

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::CorpusError;

// Collapses runs of whitespace when normalizing text for id hashing
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// One translation's raw text, as handed over by the loader.
///
/// Owned by the parse task for the duration of parsing and dropped
/// afterwards; nothing downstream sees the raw bytes.
#[derive(Debug, Clone)]
pub struct SourceDataset {
    /// Translation code, e.g. "kjv"
    pub code: String,

    /// Raw text content of the dataset
    pub raw: String,
}

impl SourceDataset {
    pub fn new(code: impl Into<String>, raw: impl Into<String>) -> Self {
        SourceDataset {
            code: code.into(),
            raw: raw.into(),
        }
    }
}

/// A canonical verse location, independent of any translation.
///
/// Rendered as `book.chapter.verse`, which is also the order the aligner
/// processes and serializes references in (lexicographic on the rendered
/// form).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalRef {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
}

impl CanonicalRef {
    pub fn new(book: impl Into<String>, chapter: u32, verse: u32) -> Self {
        CanonicalRef {
            book: book.into(),
            chapter,
            verse,
        }
    }

    /// Key of the chapter this reference lives in, `book.chapter`.
    pub fn chapter_key(&self) -> String {
        format!("{}.{}", self.book, self.chapter)
    }
}

impl fmt::Display for CanonicalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.book, self.chapter, self.verse)
    }
}

impl FromStr for CanonicalRef {
    type Err = CorpusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplitn(3, '.');
        let verse = parts.next();
        let chapter = parts.next();
        let book = parts.next();

        match (book, chapter, verse) {
            (Some(book), Some(chapter), Some(verse)) if !book.is_empty() => {
                let chapter = chapter
                    .parse::<u32>()
                    .map_err(|_| CorpusError::InvalidReference(s.to_string()))?;
                let verse = verse
                    .parse::<u32>()
                    .map_err(|_| CorpusError::InvalidReference(s.to_string()))?;
                Ok(CanonicalRef::new(book, chapter, verse))
            }
            _ => Err(CorpusError::InvalidReference(s.to_string())),
        }
    }
}

/// One verse in one translation.
///
/// Created by the parser; the validator may rewrite `text` during
/// sanitization, after which the verse is never mutated again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    /// Deterministic identifier, see [`deterministic_id`]
    pub id: String,

    /// Verse number within the chapter
    pub number: u32,

    /// Verse text (sanitized once validation has run)
    pub text: String,

    /// Anchor token for downstream renderers, `#v{number}`
    pub anchor: String,

    /// Rendered canonical reference, `book.chapter.verse`
    pub canonical_ref: String,
}

impl Verse {
    pub fn new(id: String, number: u32, text: String, reference: &CanonicalRef) -> Self {
        Verse {
            id,
            number,
            text,
            anchor: format!("#v{}", number),
            canonical_ref: reference.to_string(),
        }
    }
}

/// Ordered verses of one chapter.
///
/// `verses` is the authoritative ordered map (strictly ascending by
/// number). When the parser sees a second verse with an already-present
/// number it stashes it in `duplicates`; the validator drops and logs
/// those, so first-seen always wins.
#[derive(Debug, Clone, Default)]
pub struct Chapter {
    pub book: String,
    pub number: u32,
    pub verses: BTreeMap<u32, Verse>,
    pub duplicates: Vec<Verse>,
}

impl Chapter {
    pub fn new(book: impl Into<String>, number: u32) -> Self {
        Chapter {
            book: book.into(),
            number,
            verses: BTreeMap::new(),
            duplicates: Vec::new(),
        }
    }

    /// Insert a verse, keeping the first occurrence on duplicate numbers.
    pub fn insert(&mut self, verse: Verse) {
        if self.verses.contains_key(&verse.number) {
            self.duplicates.push(verse);
        } else {
            self.verses.insert(verse.number, verse);
        }
    }

    /// Smallest verse number present, if any.
    pub fn min_verse(&self) -> Option<u32> {
        self.verses.keys().next().copied()
    }

    /// Largest verse number present, if any.
    pub fn max_verse(&self) -> Option<u32> {
        self.verses.keys().next_back().copied()
    }
}

/// One book of a translation, chapters ordered by number.
#[derive(Debug, Clone, Default)]
pub struct Book {
    pub name: String,
    pub chapters: BTreeMap<u32, Chapter>,
}

impl Book {
    pub fn new(name: impl Into<String>) -> Self {
        Book {
            name: name.into(),
            chapters: BTreeMap::new(),
        }
    }
}

/// Counters filled in by the parser and validator, carried alongside the
/// tree so downstream consumers can report on a translation without
/// re-walking it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationSummary {
    pub parse_issues: usize,
    pub malformed: usize,
    pub duplicates_dropped: usize,
    pub gaps: usize,
    pub sanitized: usize,
}

/// A parsed (and, after validation, repaired) translation.
#[derive(Debug, Clone, Default)]
pub struct Translation {
    /// Translation code, e.g. "kjv"
    pub code: String,

    /// Books keyed by name, each holding ordered chapters and verses
    pub books: BTreeMap<String, Book>,

    /// Parse/validation counters
    pub summary: TranslationSummary,
}

impl Translation {
    pub fn new(code: impl Into<String>) -> Self {
        Translation {
            code: code.into(),
            books: BTreeMap::new(),
            summary: TranslationSummary::default(),
        }
    }

    /// Look up a chapter by book name and chapter number.
    pub fn chapter(&self, book: &str, chapter: u32) -> Option<&Chapter> {
        self.books.get(book).and_then(|b| b.chapters.get(&chapter))
    }

    /// Look up the verse at a canonical reference, if present.
    pub fn verse(&self, reference: &CanonicalRef) -> Option<&Verse> {
        self.chapter(&reference.book, reference.chapter)
            .and_then(|c| c.verses.get(&reference.verse))
    }

    /// Number of verses in one chapter, zero when the chapter is absent.
    pub fn chapter_verse_count(&self, book: &str, chapter: u32) -> usize {
        self.chapter(book, chapter).map_or(0, |c| c.verses.len())
    }

    /// Total verse count across all books.
    pub fn verse_count(&self) -> usize {
        self.books
            .values()
            .flat_map(|b| b.chapters.values())
            .map(|c| c.verses.len())
            .sum()
    }

    /// Total chapter count across all books.
    pub fn chapter_count(&self) -> usize {
        self.books.values().map(|b| b.chapters.len()).sum()
    }

    /// All canonical references of this translation, in tree order.
    pub fn canonical_refs(&self) -> impl Iterator<Item = CanonicalRef> + '_ {
        self.books.values().flat_map(|book| {
            book.chapters.values().flat_map(|chapter| {
                chapter
                    .verses
                    .values()
                    .map(|v| CanonicalRef::new(chapter.book.clone(), chapter.number, v.number))
            })
        })
    }

    /// Iterate over all chapters, in tree order.
    pub fn chapters(&self) -> impl Iterator<Item = &Chapter> {
        self.books.values().flat_map(|b| b.chapters.values())
    }

    /// Iterate mutably over all chapters, in tree order.
    pub fn chapters_mut(&mut self) -> impl Iterator<Item = &mut Chapter> {
        self.books.values_mut().flat_map(|b| b.chapters.values_mut())
    }
}

/// Normalize verse text for id hashing: lowercase and collapse
/// whitespace, so immaterial formatting differences do not change ids.
pub fn normalize_for_id(text: &str) -> String {
    let lowered = text.to_lowercase();
    WHITESPACE_RUN.replace_all(lowered.trim(), " ").into_owned()
}

/// Deterministic verse id: sha256 over the translation code, the rendered
/// canonical reference and the normalized text, with a separator between
/// fields so no two field combinations collide. Pure function of its
/// inputs; no timestamps, no randomness.
pub fn deterministic_id(code: &str, reference: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hasher.update([0x1f]);
    hasher.update(reference.as_bytes());
    hasher.update([0x1f]);
    hasher.update(normalize_for_id(text).as_bytes());
    format!("{:x}", hasher.finalize())
}
