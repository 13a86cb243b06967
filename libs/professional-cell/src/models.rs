use serde::{Deserialize, Serialize};

use crate::services::legacy::deserialize_string_list;

// ==============================================================================
// BOUNDARY ROWS (shapes returned by the REST reads)
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfessionalRow {
    pub id: i64,
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub secondary_email: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    /// JSON array, legacy PHP-serialized array, or null in storage.
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub normalized_services: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub normalized_education: Vec<String>,
    #[serde(default)]
    pub professional_summary: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    /// Embedded `profiles` row; absent when the professional has no profile.
    #[serde(default)]
    pub profile: Option<LinkedProfile>,
}

impl ProfessionalRow {
    /// True when no authentication identity is linked through the profile.
    pub fn is_orphan(&self) -> bool {
        self.profile
            .as_ref()
            .and_then(|profile| profile.user_id.as_deref())
            .map_or(true, |user_id| user_id.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkedProfile {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRow {
    pub professional_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantMembershipRow {
    pub professional_id: i64,
}

// ==============================================================================
// DETECTION RESULTS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalSummary {
    pub id: i64,
    pub profile_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub secondary_email: Option<String>,
    pub completeness_score: u32,
    pub schedule_count: u32,
    pub is_orphan: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendedAction {
    Merge,
    Review,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    pub source_id: i64,
    pub target_id: i64,
    pub source_profile_id: Option<String>,
    pub target_profile_id: Option<String>,
    pub confidence_score: u32,
    pub match_reasons: Vec<String>,
    pub recommended_action: RecommendedAction,
    pub source_data: ProfessionalSummary,
    pub target_data: ProfessionalSummary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionReport {
    pub candidates_scanned: usize,
    pub matches: Vec<DuplicateMatch>,
}

// ==============================================================================
// HTTP DTOs
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectDuplicatesRequest {
    #[serde(default)]
    pub tenant_id: Option<String>,
}

impl DetectDuplicatesRequest {
    /// Lenient body parsing: anything unreadable means "no tenant filter".
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    pub fn tenant_filter(&self) -> Option<&str> {
        self.tenant_id
            .as_deref()
            .map(str::trim)
            .filter(|tenant| !tenant.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectDuplicatesResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duplicates_found: usize,
    pub matches: Vec<DuplicateMatch>,
}

impl DetectDuplicatesResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            duplicates_found: 0,
            matches: Vec::new(),
        }
    }
}

impl From<DetectionReport> for DetectDuplicatesResponse {
    fn from(report: DetectionReport) -> Self {
        Self {
            success: true,
            error: None,
            duplicates_found: report.matches.len(),
            matches: report.matches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_body_means_no_filter() {
        assert_eq!(DetectDuplicatesRequest::from_body(b"not json").tenant_filter(), None);
        assert_eq!(DetectDuplicatesRequest::from_body(b"").tenant_filter(), None);
        assert_eq!(DetectDuplicatesRequest::from_body(br#"{"tenant_id": 42}"#).tenant_filter(), None);
        assert_eq!(DetectDuplicatesRequest::from_body(br#"{"tenant_id": "  "}"#).tenant_filter(), None);
    }

    #[test]
    fn tenant_filter_is_trimmed() {
        let request = DetectDuplicatesRequest::from_body(br#"{"tenant_id": " clinic-a "}"#);
        assert_eq!(request.tenant_filter(), Some("clinic-a"));
    }

    #[test]
    fn row_without_linked_user_is_orphan() {
        let row: ProfessionalRow = serde_json::from_value(json!({
            "id": 7,
            "name": "Ana",
            "profile": { "user_id": null }
        }))
        .unwrap();
        assert!(row.is_orphan());

        let row: ProfessionalRow = serde_json::from_value(json!({"id": 8})).unwrap();
        assert!(row.is_orphan());
        assert!(row.normalized_services.is_empty());

        let row: ProfessionalRow = serde_json::from_value(json!({
            "id": 9,
            "profile": { "user_id": "6f1c" }
        }))
        .unwrap();
        assert!(!row.is_orphan());
    }

    #[test]
    fn action_serializes_lowercase() {
        assert_eq!(serde_json::to_value(RecommendedAction::Merge).unwrap(), json!("merge"));
        assert_eq!(serde_json::to_value(RecommendedAction::Review).unwrap(), json!("review"));
    }

    #[test]
    fn failure_envelope_is_empty() {
        let body = serde_json::to_value(DetectDuplicatesResponse::failure("boom")).unwrap();
        assert_eq!(body, json!({
            "success": false,
            "error": "boom",
            "duplicates_found": 0,
            "matches": []
        }));
    }
}
