/*!
 * Cross-translation alignment.
 *
 * Given N validated translations, computes the cross-reference map:
 * exact canonical matching first, a windowed textual-similarity
 * fallback second, deterministic conflict resolution last.
 *
 * # Architecture
 *
 * - `similarity`: normalization, Jaccard and Levenshtein primitives
 * - `map`: the serialized output structures
 * - `aligner`: the algorithm itself
 */

pub mod aligner;
pub mod map;
pub mod similarity;

// Re-export main types
pub use aligner::Aligner;
pub use map::{AlignmentMetrics, Conflict, CrossReferenceMap, MatchScore, NullReason};
