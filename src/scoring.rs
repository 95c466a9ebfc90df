//! Ranking score for post listings.

use crate::constants::FULL_CONFIDENCE_VOTES;

/// Computes the visibility score from validation votes.
///
/// The match ratio is weighted by a confidence that ramps linearly to full
/// strength at [`FULL_CONFIDENCE_VOTES`], so a single agreeing vote does not
/// outrank a widely validated post. Result is in `[0, 1]`; zero with no votes.
pub fn visibility_score(matches: i32, not_matches: i32) -> f64 {
    let matches = f64::from(matches.max(0));
    let total = matches + f64::from(not_matches.max(0));
    if total == 0.0 {
        return 0.0;
    }

    let match_ratio = matches / total;
    let confidence = (total / FULL_CONFIDENCE_VOTES).min(1.0);

    match_ratio * confidence
}
