use crate::models::{ProfessionalRow, ProfessionalSummary};

pub const PHOTO_POINTS: u32 = 10;
pub const SERVICES_POINTS: u32 = 15;
pub const EDUCATION_POINTS: u32 = 10;
pub const SUMMARY_POINTS: u32 = 10;
pub const ACTIVE_POINTS: u32 = 20;
pub const SCHEDULE_SLOT_POINTS: u32 = 5;

fn has_text(value: Option<&str>) -> bool {
    value.map_or(false, |text| !text.trim().is_empty())
}

/// Additive data-quality score for a professional. Missing fields contribute
/// nothing; schedule slots are uncapped.
pub fn completeness_score(row: &ProfessionalRow, schedule_count: u32) -> u32 {
    let mut score = 0;

    if has_text(row.photo_url.as_deref()) {
        score += PHOTO_POINTS;
    }
    if !row.normalized_services.is_empty() {
        score += SERVICES_POINTS;
    }
    if !row.normalized_education.is_empty() {
        score += EDUCATION_POINTS;
    }
    if has_text(row.professional_summary.as_deref()) {
        score += SUMMARY_POINTS;
    }
    if row.active == Some(true) {
        score += ACTIVE_POINTS;
    }

    score.saturating_add(schedule_count.saturating_mul(SCHEDULE_SLOT_POINTS))
}

pub fn build_summary(row: &ProfessionalRow, schedule_count: u32) -> ProfessionalSummary {
    ProfessionalSummary {
        id: row.id,
        profile_id: row.profile_id.clone(),
        name: row.name.as_deref().unwrap_or_default().trim().to_string(),
        email: row.email.clone(),
        secondary_email: row.secondary_email.clone(),
        completeness_score: completeness_score(row, schedule_count),
        schedule_count,
        is_orphan: row.is_orphan(),
    }
}
