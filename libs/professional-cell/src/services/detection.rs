use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use tracing::{debug, info};

use shared_config::AppConfig;

use crate::error::DuplicateDetectionError;
use crate::models::{AvailabilityRow, DetectionReport, ProfessionalSummary};
use crate::services::directory::{ProfessionalDirectory, SupabaseProfessionalDirectory};
use crate::services::matching::find_duplicates;
use crate::services::scoring::build_summary;

pub struct DuplicateDetectionService<D = SupabaseProfessionalDirectory> {
    directory: D,
    max_candidates: usize,
}

impl DuplicateDetectionService<SupabaseProfessionalDirectory> {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_directory(
            SupabaseProfessionalDirectory::new(config),
            config.max_duplicate_candidates,
        )
    }
}

impl<D: ProfessionalDirectory> DuplicateDetectionService<D> {
    pub fn with_directory(directory: D, max_candidates: usize) -> Self {
        Self { directory, max_candidates }
    }

    /// Scores and compares every professional in scope and returns ranked
    /// duplicate recommendations. Read-only; any failed read fails the run.
    pub async fn detect_duplicates(
        &self,
        tenant_id: Option<&str>,
    ) -> Result<DetectionReport, DuplicateDetectionError> {
        let started = Instant::now();

        let member_ids = match tenant_id {
            Some(tenant) => {
                let ids: BTreeSet<i64> = self
                    .directory
                    .list_tenant_members(tenant)
                    .await?
                    .into_iter()
                    .map(|member| member.professional_id)
                    .collect();

                if ids.is_empty() {
                    info!("Tenant {} has no professionals, nothing to compare", tenant);
                    return Ok(DetectionReport { candidates_scanned: 0, matches: Vec::new() });
                }
                Some(ids.into_iter().collect::<Vec<_>>())
            }
            None => None,
        };

        let mut professionals = self.directory.list_professionals(member_ids.as_deref()).await?;
        professionals.sort_by_key(|row| row.id);
        professionals.dedup_by_key(|row| row.id);

        if professionals.len() > self.max_candidates {
            return Err(DuplicateDetectionError::CandidateLimitExceeded {
                found: professionals.len(),
                limit: self.max_candidates,
            });
        }

        let candidate_ids: Option<Vec<i64>> = member_ids
            .as_ref()
            .map(|_| professionals.iter().map(|row| row.id).collect());
        let availability = self.directory.list_availability(candidate_ids.as_deref()).await?;
        let schedule_counts = count_schedules(&availability);

        let summaries: Vec<ProfessionalSummary> = professionals
            .iter()
            .map(|row| build_summary(row, schedule_counts.get(&row.id).copied().unwrap_or(0)))
            .collect();

        debug!(
            "Built {} summaries from {} availability rows",
            summaries.len(),
            availability.len()
        );

        let matches = find_duplicates(&summaries);

        info!(
            "Duplicate scan finished: tenant={}, candidates={}, matches={}, elapsed_ms={}",
            tenant_id.unwrap_or("all"),
            summaries.len(),
            matches.len(),
            started.elapsed().as_millis()
        );

        Ok(DetectionReport {
            candidates_scanned: summaries.len(),
            matches,
        })
    }
}

fn count_schedules(rows: &[AvailabilityRow]) -> HashMap<i64, u32> {
    let mut counts = HashMap::new();
    for row in rows {
        *counts.entry(row.professional_id).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedules_are_counted_per_professional() {
        let rows = vec![
            AvailabilityRow { professional_id: 1 },
            AvailabilityRow { professional_id: 2 },
            AvailabilityRow { professional_id: 1 },
        ];
        let counts = count_schedules(&rows);
        assert_eq!(counts.get(&1), Some(&2));
        assert_eq!(counts.get(&2), Some(&1));
        assert_eq!(counts.get(&3), None);
    }
}
