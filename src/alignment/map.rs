/*!
 * Cross-reference map structures.
 *
 * The serialized output of one alignment run. Every table is a
 * `BTreeMap` keyed by rendered canonical reference or translation code,
 * so iteration order is serialization order and two identical runs
 * produce byte-identical JSON.
 */

use std::cmp::Ordering;
use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Wire schema version of the cross-reference map
pub const SCHEMA_VERSION: &str = "1.0";

/// Why a translation has no mapping for a canonical reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NullReason {
    /// The translation's chapter carries fewer verses than the reference
    /// skeleton's chapter
    VersificationMismatch,

    /// No candidate verse existed in the search window at all
    MissingInSource,

    /// Candidates existed but none passed the similarity thresholds
    NoSimilarVerseFound,

    /// The mapping lost a conflict against another canonical reference
    /// resolving to the same verse
    VerseRangeMerged,
}

/// Acceptance score of one mapping; exact matches carry no similarity
/// numbers at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MatchScore {
    Exact,
    #[serde(rename_all = "camelCase")]
    Fallback {
        jaccard: f64,
        edit_ratio: f64,
        verse_delta: u32,
    },
}

impl MatchScore {
    /// Total strength order: exact outranks any fallback; fallbacks rank
    /// by higher Jaccard, then smaller edit ratio, then smaller delta.
    pub fn strength(&self, other: &MatchScore) -> Ordering {
        match (self, other) {
            (MatchScore::Exact, MatchScore::Exact) => Ordering::Equal,
            (MatchScore::Exact, MatchScore::Fallback { .. }) => Ordering::Greater,
            (MatchScore::Fallback { .. }, MatchScore::Exact) => Ordering::Less,
            (
                MatchScore::Fallback {
                    jaccard: j1,
                    edit_ratio: r1,
                    verse_delta: d1,
                },
                MatchScore::Fallback {
                    jaccard: j2,
                    edit_ratio: r2,
                    verse_delta: d2,
                },
            ) => j1
                .partial_cmp(j2)
                .unwrap_or(Ordering::Equal)
                .then(r2.partial_cmp(r1).unwrap_or(Ordering::Equal))
                .then(d2.cmp(d1)),
        }
    }
}

/// One recorded conflict: two canonical references competed for the same
/// verse of a translation; exactly one kept the mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// Translation the contested verse belongs to
    pub translation: String,

    /// Id of the contested verse
    pub verse_id: String,

    /// Canonical reference that kept the mapping
    pub winner: String,

    /// Canonical reference forced to null
    pub loser: String,

    pub winner_score: MatchScore,
    pub loser_score: MatchScore,
}

/// Similarity thresholds an alignment ran with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    pub jaccard: f64,
    pub levenshtein: f64,
}

/// Volume metrics over one finished map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentMetrics {
    pub total: usize,
    pub mapped: usize,
    pub nulls: usize,
    pub conflicts: usize,
    pub coverage: f64,
    pub thresholds: Thresholds,
}

/// The alignment result: for every canonical reference in the union of
/// all translations, the verse id it resolves to per translation (or
/// null), plus the conflicts and the null reasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossReferenceMap {
    pub schema_version: String,

    /// canonical reference -> translation code -> verse id or null
    pub mappings: BTreeMap<String, BTreeMap<String, Option<String>>>,

    /// Winner/loser pairs, sorted by (translation, winner, loser)
    pub conflicts: Vec<Conflict>,

    /// canonical reference -> translation code -> reason, for every null
    pub null_reasons: BTreeMap<String, BTreeMap<String, NullReason>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<AlignmentMetrics>,
}

impl CrossReferenceMap {
    pub fn new() -> Self {
        CrossReferenceMap {
            schema_version: SCHEMA_VERSION.to_string(),
            mappings: BTreeMap::new(),
            conflicts: Vec::new(),
            null_reasons: BTreeMap::new(),
            metrics: None,
        }
    }

    /// Canonical serialized form; identical inputs yield byte-identical
    /// output.
    pub fn to_canonical_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize cross-reference map")
    }

    /// Entry for one reference/translation pair, if present.
    pub fn entry(&self, reference: &str, code: &str) -> Option<&Option<String>> {
        self.mappings.get(reference).and_then(|row| row.get(code))
    }

    /// Null reason for one reference/translation pair, if the entry is null.
    pub fn null_reason(&self, reference: &str, code: &str) -> Option<NullReason> {
        self.null_reasons
            .get(reference)
            .and_then(|row| row.get(code))
            .copied()
    }
}

impl Default for CrossReferenceMap {
    fn default() -> Self {
        Self::new()
    }
}
