use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::models::{DuplicateMatch, ProfessionalSummary};
use crate::services::classification::classify_pair;
use crate::services::ranking::rank_matches;

pub const IDENTICAL_NAME_POINTS: u32 = 50;
pub const SIMILAR_NAME_POINTS: u32 = 30;
pub const SHARED_EMAIL_POINTS: u32 = 30;
pub const ORPHAN_POINTS: u32 = 15;

pub const REASON_IDENTICAL_NAME: &str = "identical name";
pub const REASON_SIMILAR_NAME: &str = "similar name";
pub const REASON_SHARED_EMAILS: &str = "shared emails";

/// Accumulated evidence that two profiles describe the same person.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairSignals {
    pub confidence: u32,
    pub reasons: Vec<String>,
}

impl PairSignals {
    fn add(&mut self, points: u32, reason: impl Into<String>) {
        self.confidence += points;
        self.reasons.push(reason.into());
    }
}

/// Lowercases, strips diacritics and collapses whitespace.
pub fn normalize_name(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn email_set(summary: &ProfessionalSummary) -> Vec<String> {
    [summary.email.as_deref(), summary.secondary_email.as_deref()]
        .into_iter()
        .flatten()
        .map(|email| email.trim().to_lowercase())
        .filter(|email| !email.is_empty())
        .collect()
}

pub fn shares_email(a: &ProfessionalSummary, b: &ProfessionalSummary) -> bool {
    let theirs = email_set(b);
    email_set(a).iter().any(|email| theirs.contains(email))
}

/// Scores one pair. `first` precedes `second` in discovery order.
pub fn score_pair(first: &ProfessionalSummary, second: &ProfessionalSummary) -> PairSignals {
    let mut signals = PairSignals::default();

    let first_name = normalize_name(&first.name);
    let second_name = normalize_name(&second.name);

    if !first_name.is_empty() && !second_name.is_empty() {
        if first_name == second_name {
            signals.add(IDENTICAL_NAME_POINTS, REASON_IDENTICAL_NAME);
        } else if first_name.contains(&second_name) || second_name.contains(&first_name) {
            signals.add(SIMILAR_NAME_POINTS, REASON_SIMILAR_NAME);
        }
    }

    if shares_email(first, second) {
        signals.add(SHARED_EMAIL_POINTS, REASON_SHARED_EMAILS);
    }

    let orphan = if first.is_orphan {
        Some(first)
    } else if second.is_orphan {
        Some(second)
    } else {
        None
    };
    if let Some(orphan) = orphan {
        signals.add(ORPHAN_POINTS, format!("profile #{} has no linked user", orphan.id));
    }

    signals
}

/// All-pairs comparison over one candidate set. Quadratic in the number of
/// summaries; callers bound the set before getting here.
pub fn find_duplicates(summaries: &[ProfessionalSummary]) -> Vec<DuplicateMatch> {
    let mut matches = Vec::new();

    for (i, first) in summaries.iter().enumerate() {
        for second in &summaries[i + 1..] {
            let signals = score_pair(first, second);
            if let Some(found) = classify_pair(signals, first, second) {
                matches.push(found);
            }
        }
    }

    rank_matches(&mut matches);
    matches
}
