/*!
 * Tests for translation parsing through the public API
 */

use crossverse::corpus::CanonicalRef;
use crossverse::parser::{SourceFormat, TextParser};

use crate::common;

/// Test that a full sample chapter parses into the expected tree
#[test]
fn test_parse_withSampleChapter_shouldBuildOrderedTree() {
    let outcome = TextParser::default().parse(common::kjv_genesis(), "kjv").unwrap();
    let translation = &outcome.translation;

    assert!(outcome.issues.is_empty());
    assert_eq!(translation.books.len(), 1);
    assert_eq!(translation.chapter_count(), 1);
    assert_eq!(translation.verse_count(), 4);

    // Strictly ascending verse order inside the chapter
    let chapter = translation.chapter("Genesis", 1).unwrap();
    let numbers: Vec<u32> = chapter.verses.keys().copied().collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
}

/// Test that verses expose canonical refs, anchors and stable ids
#[test]
fn test_parse_withSampleChapter_shouldExposeVerseMetadata() {
    let outcome = TextParser::default().parse(common::kjv_genesis(), "kjv").unwrap();
    let verse = outcome
        .translation
        .verse(&CanonicalRef::new("Genesis", 1, 3))
        .unwrap();

    assert_eq!(verse.canonical_ref, "Genesis.1.3");
    assert_eq!(verse.anchor, "#v3");
    assert_eq!(verse.id.len(), 64);
    assert!(verse.text.starts_with("And God said"));
}

/// A stray line inside a chapter body yields exactly one issue with its
/// line number and the chapter is otherwise intact
#[test]
fn test_parse_withStrayLineInChapterBody_shouldReportIssueAndKeepChapter() {
    let text = "Genesis\nChapter 1\n1 First verse text.\nabc not a verse\n3 Third verse text.";
    let outcome = TextParser::default().parse(text, "kjv").unwrap();

    assert_eq!(outcome.issues.len(), 1);
    assert_eq!(outcome.issues[0].line, 4);
    assert_eq!(outcome.issues[0].content, "abc not a verse");

    let chapter = outcome.translation.chapter("Genesis", 1).unwrap();
    assert_eq!(chapter.verses.len(), 2);
}

/// Test that verse ranges expand into one record per number
#[test]
fn test_parse_withVerseRange_shouldExpandIntoSharedBaseIds() {
    let text = "Genesis\nChapter 3\n18 Thorns also and thistles shall it bring forth to thee.\n19-20 In the sweat of thy face shalt thou eat bread.";
    let outcome = TextParser::default().parse(text, "kjv").unwrap();
    let chapter = outcome.translation.chapter("Genesis", 3).unwrap();

    assert_eq!(chapter.verses.len(), 3);
    let nineteen = chapter.verses.get(&19).unwrap();
    let twenty = chapter.verses.get(&20).unwrap();

    assert_eq!(nineteen.text, twenty.text);
    assert_eq!(nineteen.canonical_ref, "Genesis.3.19");
    assert_eq!(twenty.canonical_ref, "Genesis.3.20");

    // Same base id, positional suffix
    let base = nineteen.id.strip_suffix("-0").unwrap();
    assert_eq!(twenty.id, format!("{}-1", base));
}

/// Test that identical input always produces identical ids
#[test]
fn test_parse_runTwice_shouldProduceIdenticalIds() {
    let first = TextParser::default().parse(common::kjv_genesis(), "kjv").unwrap();
    let second = TextParser::default().parse(common::kjv_genesis(), "kjv").unwrap();

    for reference in first.translation.canonical_refs() {
        assert_eq!(
            first.translation.verse(&reference).unwrap().id,
            second.translation.verse(&reference).unwrap().id
        );
    }
}

/// Test that the same text under different codes yields different ids
#[test]
fn test_parse_withDifferentCodes_shouldProduceDifferentIds() {
    let kjv = TextParser::default().parse(common::kjv_genesis(), "kjv").unwrap();
    let other = TextParser::default().parse(common::kjv_genesis(), "asv").unwrap();

    let reference = CanonicalRef::new("Genesis", 1, 1);
    assert_ne!(
        kjv.translation.verse(&reference).unwrap().id,
        other.translation.verse(&reference).unwrap().id
    );
}

/// Test total failure on a dataset without any verse
#[test]
fn test_parse_withNoVerses_shouldFailCompletely() {
    let result = TextParser::default().parse("just prose\nwithout structure", "bad");
    let failure = result.unwrap_err();
    assert_eq!(failure.code, "bad");
    assert_eq!(failure.issues.len(), 2);
}

/// Test format detection on inline-marker datasets
#[test]
fn test_format_detection_withInlineMarkers_shouldSelectInlineRefs() {
    let inline = "Genesis\nChapter 1\n1 first words 1:2 second words\n3 third words 1:4 fourth words\n5 fifth words 1:6 sixth words\n";
    assert_eq!(SourceFormat::detect(inline), SourceFormat::InlineRefs);
    assert_eq!(SourceFormat::detect(common::kjv_genesis()), SourceFormat::Standard);
}

/// Test that InlineRefs splitting creates verses at embedded markers
#[test]
fn test_parse_withInlineRefsFormat_shouldSplitEmbeddedVerses() {
    let text = "Genesis\nChapter 1\n1 In the beginning. 1:2 And the earth was void.";
    let outcome = TextParser::new(SourceFormat::InlineRefs).parse(text, "oeb").unwrap();
    let chapter = outcome.translation.chapter("Genesis", 1).unwrap();

    assert_eq!(chapter.verses.len(), 2);
    assert_eq!(chapter.verses.get(&2).unwrap().text, "And the earth was void.");
}
