/*!
 * Tests for cross-translation alignment through the public API
 */

use std::collections::BTreeMap;

use crossverse::alignment::{Aligner, CrossReferenceMap, MatchScore, NullReason};
use crossverse::app_config::AlignmentConfig;
use crossverse::corpus::{CanonicalRef, Translation};
use crossverse::diagnostics::DiagnosticBuffer;

use crate::common;

fn align_set(translations: Vec<Translation>, config: AlignmentConfig) -> CrossReferenceMap {
    let set: BTreeMap<String, Translation> = translations
        .into_iter()
        .map(|t| (t.code.clone(), t))
        .collect();
    let mut diag = DiagnosticBuffer::new();
    Aligner::new(config).align(&set, &mut diag).unwrap()
}

fn with_reference(code: &str) -> AlignmentConfig {
    let mut config = AlignmentConfig::default();
    config.reference_translation = Some(code.to_string());
    config
}

/// A verse present verbatim in two translations maps via
/// the exact pass and the conflict list stays empty
#[test]
fn test_align_withVerbatimVerse_shouldMapExactlyWithoutConflicts() {
    let kjv = common::parse_and_validate("kjv", common::kjv_genesis());
    let asv = common::parse_and_validate("asv", common::kjv_genesis());
    let expected_id = asv.verse(&CanonicalRef::new("Genesis", 1, 1)).unwrap().id.clone();

    let map = align_set(vec![kjv, asv], AlignmentConfig::default());

    assert!(map.conflicts.is_empty());
    assert!(map.null_reasons.is_empty());
    // The exact pass maps to the translation's own verse id
    assert_eq!(map.entry("Genesis.1.1", "asv").unwrap().as_deref(), Some(expected_id.as_str()));
}

/// Coverage round-trip: map keys equal the union of canonical refs
/// across all translations
#[test]
fn test_align_mapKeys_shouldEqualUnionOfReferences() {
    let kjv = common::parse_and_validate("kjv", common::kjv_genesis());
    let merged = common::parse_and_validate("mrg", common::merged_genesis());

    let mut expected: Vec<String> = kjv
        .canonical_refs()
        .chain(merged.canonical_refs())
        .map(|r| r.to_string())
        .collect();
    expected.sort();
    expected.dedup();

    let map = align_set(vec![kjv, merged], with_reference("kjv"));
    let keys: Vec<String> = map.mappings.keys().cloned().collect();
    assert_eq!(keys, expected);

    // Every row carries an entry for every translation
    for row in map.mappings.values() {
        assert_eq!(row.len(), 2);
    }
}

/// A translation merging two verses into one. The merged
/// slot keeps the direct mapping; the displaced reference is null with
/// reason verse-range-merged and the pair is recorded as a conflict.
#[test]
fn test_align_withMergedVerses_shouldResolveConflictDeterministically() {
    let kjv = common::parse_and_validate("kjv", common::kjv_genesis());
    let merged = common::parse_and_validate("mrg", common::merged_genesis());

    let map = align_set(vec![kjv, merged], with_reference("kjv"));

    // Genesis.1.3 maps directly in the merged translation
    assert!(map.entry("Genesis.1.3", "mrg").unwrap().is_some());
    // Genesis.1.4 lost the conflict for the same verse
    assert_eq!(map.entry("Genesis.1.4", "mrg"), Some(&None));
    assert_eq!(
        map.null_reason("Genesis.1.4", "mrg"),
        Some(NullReason::VerseRangeMerged)
    );

    assert_eq!(map.conflicts.len(), 1);
    let conflict = &map.conflicts[0];
    assert_eq!(conflict.translation, "mrg");
    assert_eq!(conflict.winner, "Genesis.1.3");
    assert_eq!(conflict.loser, "Genesis.1.4");
    assert_eq!(conflict.winner_score, MatchScore::Exact);
    assert!(matches!(conflict.loser_score, MatchScore::Fallback { .. }));
}

/// Conflict exclusivity: exactly one of the competing references keeps
/// the mapping, never both, never neither
#[test]
fn test_align_conflictingReferences_shouldBeMutuallyExclusive() {
    let kjv = common::parse_and_validate("kjv", common::kjv_genesis());
    let merged = common::parse_and_validate("mrg", common::merged_genesis());

    let map = align_set(vec![kjv, merged], with_reference("kjv"));

    let winner_entry = map.entry("Genesis.1.3", "mrg").unwrap();
    let loser_entry = map.entry("Genesis.1.4", "mrg").unwrap();
    assert!(winner_entry.is_some() ^ loser_entry.is_some());
}

/// A verse omitted entirely, with nothing inside the
/// search window, yields a missing-in-source null
#[test]
fn test_align_withOmittedVerse_shouldReportMissingInSource() {
    let chapter_body = "Matthew\nChapter 17\n1 First verse of the chapter here.\n2 Second verse of the chapter here.\n3 Third verse of the chapter here.";
    let reference = common::parse_and_validate("ref", chapter_body);
    let target = common::parse_and_validate("ddd", chapter_body);
    let carrier = common::parse_and_validate(
        "eee",
        "Matthew\nChapter 17\n21 Howbeit this kind goeth not out but by prayer and fasting.",
    );

    let map = align_set(vec![reference, target, carrier], with_reference("ref"));

    assert_eq!(map.entry("Matthew.17.21", "ddd"), Some(&None));
    assert_eq!(
        map.null_reason("Matthew.17.21", "ddd"),
        Some(NullReason::MissingInSource)
    );
}

/// A chapter with strictly fewer verses than the reference skeleton's
/// chapter yields versification-mismatch before any other reason
#[test]
fn test_align_withSmallerChapter_shouldReportVersificationMismatch() {
    let reference = common::parse_and_validate("ref", common::kjv_genesis());
    let short = common::parse_and_validate(
        "sss",
        "Genesis\nChapter 1\n1 In the beginning God created the heaven and the earth.\n2 And the earth was without form, and void; and darkness was upon the face of the deep.",
    );

    let map = align_set(vec![reference, short], with_reference("ref"));

    assert_eq!(
        map.null_reason("Genesis.1.4", "sss"),
        Some(NullReason::VersificationMismatch)
    );
}

/// Candidates that exist but fail both thresholds yield
/// no-similar-verse-found when chapter sizes match
#[test]
fn test_align_withDissimilarNeighbors_shouldReportNoSimilarVerseFound() {
    let reference = common::parse_and_validate(
        "ref",
        "Genesis\nChapter 1\n1 Shared opening line for both translations.\n2 Completely unique phrasing found nowhere else at all.",
    );
    let target = common::parse_and_validate(
        "ttt",
        "Genesis\nChapter 1\n1 Shared opening line for both translations.\n3 Utterly different wording with zero common vocabulary whatsoever.",
    );

    let map = align_set(vec![reference, target], with_reference("ref"));

    assert_eq!(
        map.null_reason("Genesis.1.2", "ttt"),
        Some(NullReason::NoSimilarVerseFound)
    );
}

/// Threshold monotonicity: loosening the Jaccard threshold only adds
/// acceptances; mapped entries and recorded conflicts never shrink
#[test]
fn test_align_looseningJaccardThreshold_shouldNeverRemoveAcceptances() {
    let reference = common::parse_and_validate(
        "ref",
        "Genesis\nChapter 1\n1 Shared opening line kept identical everywhere.\n2 And the earth was without form and void and darkness was upon the deep.",
    );
    let target = common::parse_and_validate(
        "ttt",
        "Genesis\nChapter 1\n1 Shared opening line kept identical everywhere.\n3 And the earth was without form and void and darkness covered the deep.",
    );

    let run = |jaccard: f64| {
        let mut config = with_reference("ref");
        config.jaccard_threshold = jaccard;
        config.levenshtein_threshold = 0.0;
        align_set(vec![reference.clone(), target.clone()], config)
    };

    let mapped = |map: &CrossReferenceMap| {
        map.mappings
            .values()
            .flat_map(|row| row.values())
            .filter(|entry| entry.is_some())
            .count()
    };

    let strict = run(0.95);
    let middle = run(0.70);
    let loose = run(0.40);

    assert!(mapped(&middle) >= mapped(&strict));
    assert!(mapped(&loose) >= mapped(&middle));
    assert!(middle.conflicts.len() >= strict.conflicts.len());
    assert!(loose.conflicts.len() >= middle.conflicts.len());
    // The similar pair is accepted once the threshold drops below its
    // Jaccard score
    assert!(strict.conflicts.is_empty());
    assert!(!middle.conflicts.is_empty());
}

/// Symmetric monotonicity for the Levenshtein threshold
#[test]
fn test_align_looseningLevenshteinThreshold_shouldNeverRemoveAcceptances() {
    let reference = common::parse_and_validate(
        "ref",
        "Genesis\nChapter 1\n2 And God said let there be light and there was light.",
    );
    let target = common::parse_and_validate(
        "ttt",
        "Genesis\nChapter 1\n3 And God said let there be light and there was lighte.",
    );

    let run = |levenshtein: f64| {
        let mut config = with_reference("ref");
        // Isolate the edit-distance path
        config.jaccard_threshold = 1.0;
        config.levenshtein_threshold = levenshtein;
        align_set(vec![reference.clone(), target.clone()], config)
    };

    let strict = run(0.0);
    let loose = run(0.15);

    assert!(loose.conflicts.len() >= strict.conflicts.len());
    assert!(!loose.conflicts.is_empty());
}

/// Determinism: two alignment runs over the same inputs serialize to
/// byte-identical JSON
#[test]
fn test_align_runTwice_shouldSerializeByteIdentical() {
    let build = || {
        let kjv = common::parse_and_validate("kjv", common::kjv_genesis());
        let web = common::parse_and_validate("web", common::web_genesis());
        let merged = common::parse_and_validate("mrg", common::merged_genesis());
        align_set(vec![kjv, web, merged], with_reference("kjv"))
    };

    let first = build().to_canonical_json().unwrap();
    let second = build().to_canonical_json().unwrap();
    assert_eq!(first, second);
}

/// Metrics add up over the finished map
#[test]
fn test_align_metrics_shouldMatchMapContents() {
    let kjv = common::parse_and_validate("kjv", common::kjv_genesis());
    let merged = common::parse_and_validate("mrg", common::merged_genesis());

    let map = align_set(vec![kjv, merged], with_reference("kjv"));
    let metrics = map.metrics.as_ref().unwrap();

    let mapped = map
        .mappings
        .values()
        .flat_map(|row| row.values())
        .filter(|e| e.is_some())
        .count();
    let nulls = map
        .mappings
        .values()
        .flat_map(|row| row.values())
        .filter(|e| e.is_none())
        .count();

    assert_eq!(metrics.mapped, mapped);
    assert_eq!(metrics.nulls, nulls);
    assert_eq!(metrics.total, mapped + nulls);
    assert_eq!(metrics.conflicts, map.conflicts.len());
    assert!((metrics.coverage - mapped as f64 / (mapped + nulls) as f64).abs() < 1e-9);
    assert_eq!(metrics.thresholds.jaccard, 0.70);
    assert_eq!(metrics.thresholds.levenshtein, 0.15);
}
