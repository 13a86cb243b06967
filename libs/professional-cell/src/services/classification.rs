use crate::models::{DuplicateMatch, ProfessionalSummary, RecommendedAction};
use crate::services::matching::PairSignals;

/// Pairs below this confidence are not reported.
pub const REPORT_THRESHOLD: u32 = 40;
/// Pairs at or above this confidence are recommended for merge.
pub const MERGE_THRESHOLD: u32 = 70;

pub fn recommended_action(confidence: u32) -> RecommendedAction {
    if confidence >= MERGE_THRESHOLD {
        RecommendedAction::Merge
    } else {
        RecommendedAction::Review
    }
}

/// Turns pair signals into a reportable match, oriented so the less complete
/// profile is the source. Equal scores keep discovery order.
pub fn classify_pair(
    signals: PairSignals,
    first: &ProfessionalSummary,
    second: &ProfessionalSummary,
) -> Option<DuplicateMatch> {
    if signals.confidence < REPORT_THRESHOLD || signals.reasons.is_empty() {
        return None;
    }

    let (source, target) = if second.completeness_score < first.completeness_score {
        (second, first)
    } else {
        (first, second)
    };

    Some(DuplicateMatch {
        source_id: source.id,
        target_id: target.id,
        source_profile_id: source.profile_id.clone(),
        target_profile_id: target.profile_id.clone(),
        confidence_score: signals.confidence,
        match_reasons: signals.reasons,
        recommended_action: recommended_action(signals.confidence),
        source_data: source.clone(),
        target_data: target.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: i64, score: u32) -> ProfessionalSummary {
        ProfessionalSummary {
            id,
            profile_id: None,
            name: format!("Profissional {}", id),
            email: None,
            secondary_email: None,
            completeness_score: score,
            schedule_count: 0,
            is_orphan: false,
        }
    }

    fn signals(confidence: u32) -> PairSignals {
        PairSignals {
            confidence,
            reasons: vec!["identical name".to_string()],
        }
    }

    #[test]
    fn merge_only_at_seventy_and_above() {
        assert_eq!(recommended_action(69), RecommendedAction::Review);
        assert_eq!(recommended_action(70), RecommendedAction::Merge);
        assert_eq!(recommended_action(125), RecommendedAction::Merge);
        assert_eq!(recommended_action(40), RecommendedAction::Review);
    }

    #[test]
    fn below_threshold_is_dropped() {
        assert!(classify_pair(signals(39), &summary(1, 0), &summary(2, 0)).is_none());
        assert!(classify_pair(signals(40), &summary(1, 0), &summary(2, 0)).is_some());
    }

    #[test]
    fn no_reasons_is_dropped() {
        let empty = PairSignals { confidence: 80, reasons: Vec::new() };
        assert!(classify_pair(empty, &summary(1, 0), &summary(2, 0)).is_none());
    }

    #[test]
    fn weaker_profile_becomes_source() {
        let found = classify_pair(signals(80), &summary(1, 90), &summary(2, 15)).unwrap();
        assert_eq!(found.source_id, 2);
        assert_eq!(found.target_id, 1);
        assert_eq!(found.source_data.completeness_score, 15);
        assert_eq!(found.recommended_action, RecommendedAction::Merge);
    }

    #[test]
    fn tie_keeps_discovery_order() {
        let found = classify_pair(signals(50), &summary(7, 30), &summary(9, 30)).unwrap();
        assert_eq!((found.source_id, found.target_id), (7, 9));
    }
}
