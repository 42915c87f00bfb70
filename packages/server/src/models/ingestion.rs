use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::ingest::IncompleteIngestion;
use crate::entity::ingestion_intent::IngestionStatus;

#[derive(Deserialize, utoipa::IntoParams)]
pub struct IncompleteIngestionQuery {
    /// Pending intents older than this are reported. Defaults to one hour.
    #[param(example = 3600)]
    pub stale_after_secs: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct IncompleteIngestionResponse {
    pub upload_id: Uuid,
    pub owner_id: Uuid,
    #[schema(example = "P-100")]
    pub part_number: String,
    pub status: IngestionStatus,
    #[schema(example = 3)]
    pub expected_files: i32,
    #[schema(example = 2)]
    pub persisted_files: i64,
    /// Per-file failure summary, when the ingestion failed.
    pub failure: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<IncompleteIngestion> for IncompleteIngestionResponse {
    fn from(i: IncompleteIngestion) -> Self {
        Self {
            upload_id: i.upload_id,
            owner_id: i.owner_id,
            part_number: i.part_number,
            status: i.status,
            expected_files: i.expected_files,
            persisted_files: i.persisted_files,
            failure: i.failure,
            created_at: i.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct IncompleteIngestionListResponse {
    pub data: Vec<IncompleteIngestionResponse>,
    pub total: u64,
}
