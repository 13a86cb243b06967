use crate::models::DuplicateMatch;

/// Most likely duplicates first. The sort is stable, so ties stay in
/// pair-discovery order.
pub fn rank_matches(matches: &mut [DuplicateMatch]) {
    matches.sort_by(|a, b| b.confidence_score.cmp(&a.confidence_score));
}
