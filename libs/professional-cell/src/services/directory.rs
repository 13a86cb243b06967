use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::error::DuplicateDetectionError;
use crate::models::{AvailabilityRow, ProfessionalRow, TenantMembershipRow};

pub const PROFESSIONALS_TABLE: &str = "professionals";
pub const AVAILABILITY_TABLE: &str = "professional_availability";
pub const TENANT_MEMBERS_TABLE: &str = "professional_tenants";

const PROFESSIONAL_COLUMNS: &str = "id,profile_id,name,email,secondary_email,photo_url,\
normalized_services,normalized_education,professional_summary,active,profile:profiles(user_id)";

/// Keeps `in.(...)` filters well under common URL length limits.
const ID_FILTER_CHUNK: usize = 200;

/// Read-only access to the rows duplicate detection needs.
#[async_trait]
pub trait ProfessionalDirectory: Send + Sync {
    /// All professionals, or only those whose id is in `ids`.
    async fn list_professionals(
        &self,
        ids: Option<&[i64]>,
    ) -> Result<Vec<ProfessionalRow>, DuplicateDetectionError>;

    /// Recurring-availability rows, optionally restricted to `professional_ids`.
    async fn list_availability(
        &self,
        professional_ids: Option<&[i64]>,
    ) -> Result<Vec<AvailabilityRow>, DuplicateDetectionError>;

    async fn list_tenant_members(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<TenantMembershipRow>, DuplicateDetectionError>;
}

pub struct SupabaseProfessionalDirectory {
    supabase: SupabaseClient,
    service_key: String,
    page_size: usize,
}

impl SupabaseProfessionalDirectory {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::for_service_role(config),
            service_key: config.read_key().to_string(),
            page_size: config.supabase_page_size,
        }
    }

    fn auth_token(&self) -> Option<&str> {
        Some(self.service_key.as_str()).filter(|key| !key.is_empty())
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: &'static str,
        path: &str,
    ) -> Result<Vec<T>, DuplicateDetectionError> {
        let raw: Vec<Value> = self
            .supabase
            .fetch_all(path, self.page_size, self.auth_token())
            .await
            .map_err(|e| DuplicateDetectionError::Database(e.to_string()))?;

        decode_rows(table, raw)
    }

    /// Runs `base_path` once per chunk of ids (or once, unfiltered).
    async fn fetch_by_ids<T: DeserializeOwned>(
        &self,
        table: &'static str,
        base_path: &str,
        id_column: &str,
        ids: Option<&[i64]>,
    ) -> Result<Vec<T>, DuplicateDetectionError> {
        let Some(ids) = ids else {
            return self.fetch_rows(table, base_path).await;
        };

        let mut rows = Vec::new();
        for chunk in ids.chunks(ID_FILTER_CHUNK) {
            let path = format!("{}&{}=in.({})", base_path, id_column, join_ids(chunk));
            rows.extend(self.fetch_rows(table, &path).await?);
        }
        Ok(rows)
    }
}

#[async_trait]
impl ProfessionalDirectory for SupabaseProfessionalDirectory {
    async fn list_professionals(
        &self,
        ids: Option<&[i64]>,
    ) -> Result<Vec<ProfessionalRow>, DuplicateDetectionError> {
        debug!("Loading professionals (filtered: {})", ids.is_some());
        let base_path = format!(
            "/rest/v1/{}?select={}&order=id.asc",
            PROFESSIONALS_TABLE, PROFESSIONAL_COLUMNS
        );
        self.fetch_by_ids(PROFESSIONALS_TABLE, &base_path, "id", ids).await
    }

    async fn list_availability(
        &self,
        professional_ids: Option<&[i64]>,
    ) -> Result<Vec<AvailabilityRow>, DuplicateDetectionError> {
        let base_path = format!(
            "/rest/v1/{}?select=id,professional_id&order=id.asc",
            AVAILABILITY_TABLE
        );
        self.fetch_by_ids(AVAILABILITY_TABLE, &base_path, "professional_id", professional_ids)
            .await
    }

    async fn list_tenant_members(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<TenantMembershipRow>, DuplicateDetectionError> {
        let path = format!(
            "/rest/v1/{}?select=professional_id&tenant_id=eq.{}&order=professional_id.asc",
            TENANT_MEMBERS_TABLE,
            urlencoding::encode(tenant_id)
        );
        self.fetch_rows(TENANT_MEMBERS_TABLE, &path).await
    }
}

fn decode_rows<T: DeserializeOwned>(
    table: &'static str,
    raw: Vec<Value>,
) -> Result<Vec<T>, DuplicateDetectionError> {
    raw.into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|e| DuplicateDetectionError::InvalidRow {
                table,
                message: e.to_string(),
            })
        })
        .collect()
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",")
}
