/*!
 * Cross-version aligner.
 *
 * Builds the cross-reference map over N validated translations: an
 * exact canonical pass, a windowed textual-similarity fallback, a
 * fixed-priority reason tree for null entries, and deterministic
 * conflict resolution when two references land on the same verse.
 *
 * Everything is processed in lexicographic order of rendered canonical
 * reference and translation code, so the output never depends on any
 * internal iteration order.
 */

use std::collections::BTreeMap;

use anyhow::Result;
use log::{debug, info};
use serde_json::json;

use crate::app_config::AlignmentConfig;
use crate::corpus::{CanonicalRef, Translation, Verse};
use crate::diagnostics::{DiagnosticBuffer, Stage};
use crate::errors::BuildError;

use super::map::{
    AlignmentMetrics, Conflict, CrossReferenceMap, MatchScore, NullReason, Thresholds,
};
use super::similarity::TextCache;

/// How one (reference, translation) slot resolved
#[derive(Debug, Clone)]
enum Resolution {
    Mapped { verse_id: String, score: MatchScore },
    Null(NullReason),
}

/// A fallback candidate with its distance from the requested position
struct Candidate<'a> {
    verse: &'a Verse,
    delta: u32,
}

/// Cross-translation aligner; one instance per build run.
pub struct Aligner {
    config: AlignmentConfig,
    cache: TextCache,
}

impl Aligner {
    pub fn new(config: AlignmentConfig) -> Self {
        Aligner {
            config,
            cache: TextCache::new(),
        }
    }

    /// Align all translations into a cross-reference map.
    ///
    /// The reference skeleton is the configured translation, or the one
    /// with the broadest coverage (most verses, ties to the
    /// lexicographically smallest code).
    pub fn align(
        &mut self,
        translations: &BTreeMap<String, Translation>,
        diag: &mut DiagnosticBuffer,
    ) -> Result<CrossReferenceMap> {
        if translations.is_empty() {
            return Err(BuildError::NoTranslations.into());
        }

        self.cache.clear();

        let reference_code = self.resolve_reference_code(translations)?;
        info!(
            "aligning {} translations against reference '{}'",
            translations.len(),
            reference_code
        );
        diag.info(
            Stage::Align,
            format!(
                "Aligning {} translations against reference '{}'",
                translations.len(),
                reference_code
            ),
        );

        // Union of canonical references, keyed by rendered form so the
        // processing order is the serialization order.
        let mut universe: BTreeMap<String, CanonicalRef> = BTreeMap::new();
        for translation in translations.values() {
            for reference in translation.canonical_refs() {
                universe.insert(reference.to_string(), reference);
            }
        }

        let codes: Vec<&String> = translations.keys().collect();

        // Phase 1: resolve every (reference, translation) slot.
        let mut resolutions: BTreeMap<String, BTreeMap<String, Resolution>> = BTreeMap::new();
        let mut claims: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();

        for (ref_key, reference) in &universe {
            let mut row: BTreeMap<String, Resolution> = BTreeMap::new();

            for code in &codes {
                let translation = &translations[*code];
                let resolution = self.resolve_slot(translation, reference, &reference_code, translations);
                if let Resolution::Mapped { verse_id, .. } = &resolution {
                    claims
                        .entry(((*code).clone(), verse_id.clone()))
                        .or_default()
                        .push(ref_key.clone());
                }
                row.insert((*code).clone(), resolution);
            }

            resolutions.insert(ref_key.clone(), row);
        }

        // Phase 2: conflicts. Two references claiming the same verse of
        // a translation: the stronger acceptance keeps the mapping, the
        // rest are forced to null.
        let mut conflicts: Vec<Conflict> = Vec::new();
        for ((code, verse_id), mut claimants) in claims {
            if claimants.len() < 2 {
                continue;
            }

            claimants.sort_by(|a, b| {
                let score_a = mapped_score(&resolutions, a, &code);
                let score_b = mapped_score(&resolutions, b, &code);
                score_b.strength(&score_a).then_with(|| a.cmp(b))
            });

            let winner = claimants[0].clone();
            let winner_score = mapped_score(&resolutions, &winner, &code);

            for loser in &claimants[1..] {
                let loser_score = mapped_score(&resolutions, loser, &code);
                conflicts.push(Conflict {
                    translation: code.clone(),
                    verse_id: verse_id.clone(),
                    winner: winner.clone(),
                    loser: loser.clone(),
                    winner_score,
                    loser_score,
                });
                diag.warning(
                    Stage::Align,
                    format!(
                        "Conflict in '{}': {} and {} resolve to the same verse, {} kept",
                        code, winner, loser, winner
                    ),
                    Some(json!({ "translation": code.clone(), "winner": winner.clone(), "loser": loser.clone() })),
                );
                if let Some(slot) = resolutions.get_mut(loser.as_str()).and_then(|row| row.get_mut(&code)) {
                    *slot = Resolution::Null(NullReason::VerseRangeMerged);
                }
            }
        }

        conflicts.sort_by(|a, b| {
            a.translation
                .cmp(&b.translation)
                .then_with(|| a.winner.cmp(&b.winner))
                .then_with(|| a.loser.cmp(&b.loser))
        });

        // Phase 3: assemble the serialized tables.
        let mut result = CrossReferenceMap::new();
        let mut mapped = 0usize;
        let mut nulls = 0usize;

        for (ref_key, row) in resolutions {
            let mut mapping_row: BTreeMap<String, Option<String>> = BTreeMap::new();
            let mut reason_row: BTreeMap<String, NullReason> = BTreeMap::new();

            for (code, resolution) in row {
                match resolution {
                    Resolution::Mapped { verse_id, .. } => {
                        mapped += 1;
                        mapping_row.insert(code, Some(verse_id));
                    }
                    Resolution::Null(reason) => {
                        nulls += 1;
                        mapping_row.insert(code.clone(), None);
                        reason_row.insert(code, reason);
                    }
                }
            }

            result.mappings.insert(ref_key.clone(), mapping_row);
            if !reason_row.is_empty() {
                result.null_reasons.insert(ref_key, reason_row);
            }
        }

        let total = mapped + nulls;
        let metrics = AlignmentMetrics {
            total,
            mapped,
            nulls,
            conflicts: conflicts.len(),
            coverage: if total > 0 {
                mapped as f64 / total as f64
            } else {
                0.0
            },
            thresholds: Thresholds {
                jaccard: self.config.jaccard_threshold,
                levenshtein: self.config.levenshtein_threshold,
            },
        };

        diag.info(
            Stage::Align,
            format!(
                "Mapping summary: {} total, {} mapped, {} nulls, {} conflicts ({:.2}% coverage)",
                metrics.total,
                metrics.mapped,
                metrics.nulls,
                metrics.conflicts,
                metrics.coverage * 100.0
            ),
        );
        if metrics.nulls > 0 {
            diag.warning(
                Stage::Align,
                format!("{} entries have no mapping", metrics.nulls),
                None,
            );
        }

        result.conflicts = conflicts;
        result.metrics = Some(metrics);
        Ok(result)
    }

    /// Resolve one (reference, translation) slot: exact pass, fallback
    /// pass, or a null entry with its reason.
    fn resolve_slot(
        &mut self,
        translation: &Translation,
        reference: &CanonicalRef,
        reference_code: &str,
        translations: &BTreeMap<String, Translation>,
    ) -> Resolution {
        // Exact pass: direct hit, no similarity score computed.
        if let Some(verse) = translation.verse(reference) {
            return Resolution::Mapped {
                verse_id: verse.id.clone(),
                score: MatchScore::Exact,
            };
        }

        let candidates = self.window_candidates(translation, reference);
        let source_text = source_verse_text(translations, reference_code, reference);

        let mut best: Option<(&Verse, MatchScore)> = None;
        if let Some(source_text) = &source_text {
            for candidate in &candidates {
                let score = self.cache.score(source_text, &candidate.verse.text);
                let accepted = score.jaccard >= self.config.jaccard_threshold
                    || score.edit_ratio <= self.config.levenshtein_threshold;
                if !accepted {
                    continue;
                }

                let match_score = MatchScore::Fallback {
                    jaccard: score.jaccard,
                    edit_ratio: score.edit_ratio,
                    verse_delta: candidate.delta,
                };
                let better = match &best {
                    None => true,
                    Some((best_verse, best_score)) => {
                        match match_score.strength(best_score) {
                            std::cmp::Ordering::Greater => true,
                            std::cmp::Ordering::Less => false,
                            // Full tie on all three keys: smaller
                            // canonical reference wins, for determinism.
                            std::cmp::Ordering::Equal => {
                                candidate.verse.canonical_ref < best_verse.canonical_ref
                            }
                        }
                    }
                };
                if better {
                    best = Some((candidate.verse, match_score));
                }
            }
        }

        if let Some((verse, score)) = best {
            debug!(
                "fallback mapped {} -> {} in '{}'",
                reference, verse.canonical_ref, translation.code
            );
            return Resolution::Mapped {
                verse_id: verse.id.clone(),
                score,
            };
        }

        // Fixed-priority reason tree, evaluated in this order.
        let own_count = translation.chapter_verse_count(&reference.book, reference.chapter);
        let reference_count = translations
            .get(reference_code)
            .map_or(0, |t| t.chapter_verse_count(&reference.book, reference.chapter));

        let reason = if own_count < reference_count {
            NullReason::VersificationMismatch
        } else if candidates.is_empty() {
            NullReason::MissingInSource
        } else {
            NullReason::NoSimilarVerseFound
        };
        Resolution::Null(reason)
    }

    /// Candidate verses within the neighbor window of the requested
    /// position, extending into the adjacent chapter only when the
    /// window crosses the chapter's own boundary. Adjacent-chapter
    /// verses get pseudo-positions continuing the number line, so the
    /// delta tie-break stays meaningful across the boundary.
    fn window_candidates<'a>(
        &self,
        translation: &'a Translation,
        reference: &CanonicalRef,
    ) -> Vec<Candidate<'a>> {
        let window = self.config.neighbor_window;
        let target = reference.verse;
        let mut candidates = Vec::new();

        let Some(chapter) = translation.chapter(&reference.book, reference.chapter) else {
            return candidates;
        };
        let (Some(min), Some(max)) = (chapter.min_verse(), chapter.max_verse()) else {
            return candidates;
        };

        let low = target.saturating_sub(window);
        let high = target + window;

        // Window crosses the chapter start: previous chapter's tail.
        if low < min && reference.chapter > 1 {
            if let Some(previous) = translation.chapter(&reference.book, reference.chapter - 1) {
                for (offset, verse) in previous.verses.values().rev().enumerate() {
                    let pseudo = min.saturating_sub(offset as u32 + 1);
                    let delta = target.abs_diff(pseudo);
                    if delta > window {
                        break;
                    }
                    candidates.push(Candidate { verse, delta });
                }
                candidates.reverse();
            }
        }

        for (number, verse) in chapter.verses.range(low..=high) {
            if *number == target {
                continue;
            }
            candidates.push(Candidate {
                verse,
                delta: target.abs_diff(*number),
            });
        }

        // Window crosses the chapter end: next chapter's head.
        if high > max {
            if let Some(next) = translation.chapter(&reference.book, reference.chapter + 1) {
                for (offset, verse) in next.verses.values().enumerate() {
                    let pseudo = max + offset as u32 + 1;
                    let delta = pseudo.abs_diff(target);
                    if delta > window {
                        break;
                    }
                    candidates.push(Candidate { verse, delta });
                }
            }
        }

        candidates
    }

    fn resolve_reference_code(&self, translations: &BTreeMap<String, Translation>) -> Result<String> {
        if let Some(code) = &self.config.reference_translation {
            if !translations.contains_key(code) {
                return Err(BuildError::ReferenceUnavailable(code.clone()).into());
            }
            return Ok(code.clone());
        }

        // Broadest coverage; BTreeMap iteration keeps the smallest code
        // on ties.
        let mut best: Option<(usize, &String)> = None;
        for (code, translation) in translations {
            let count = translation.verse_count();
            if best.is_none_or(|(best_count, _)| count > best_count) {
                best = Some((count, code));
            }
        }
        Ok(best.expect("non-empty translation set").1.clone())
    }
}

/// The text the fallback pass compares candidates against: the reference
/// skeleton's verse at this position, or the verse of the
/// lexicographically smallest translation containing it.
fn source_verse_text(
    translations: &BTreeMap<String, Translation>,
    reference_code: &str,
    reference: &CanonicalRef,
) -> Option<String> {
    if let Some(verse) = translations.get(reference_code).and_then(|t| t.verse(reference)) {
        return Some(verse.text.clone());
    }
    translations
        .values()
        .find_map(|t| t.verse(reference))
        .map(|verse| verse.text.clone())
}

fn mapped_score(
    resolutions: &BTreeMap<String, BTreeMap<String, Resolution>>,
    reference: &str,
    code: &str,
) -> MatchScore {
    match resolutions.get(reference).and_then(|row| row.get(code)) {
        Some(Resolution::Mapped { score, .. }) => *score,
        // Claims are only recorded for mapped slots
        _ => MatchScore::Exact,
    }
}
