use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::ingest::IngestionReceipt;
use crate::catalog::query::{UploadDetail, UploadSummary};
use crate::entity::file_asset;
use crate::models::shared::Pagination;

/// Multipart body of `POST /uploads`. Documentation only; the handler reads
/// the fields by name.
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct SubmitUploadForm {
    /// Part identifier.
    #[schema(example = "P-100")]
    pub part_number: String,
    /// Part label.
    #[schema(example = "Bracket")]
    pub part_name: String,
    /// One or more files. Repeat the field for each file.
    #[schema(value_type = Vec<String>)]
    pub files: Vec<Vec<u8>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmitUploadResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Number of files stored.
    #[schema(example = 2)]
    pub file_count: usize,
}

impl From<IngestionReceipt> for SubmitUploadResponse {
    fn from(receipt: IngestionReceipt) -> Self {
        Self {
            id: receipt.upload_id,
            created_at: receipt.created_at,
            file_count: receipt.file_count,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct UploadListQuery {
    /// Filter by owner. Ignored for vendors, who only ever see their own uploads.
    pub owner_id: Option<Uuid>,
    /// Case-insensitive substring of the part number.
    #[param(example = "p-1")]
    pub part_number: Option<String>,
    /// Earliest submission day, inclusive (`YYYY-MM-DD`).
    #[param(value_type = Option<String>, example = "2024-03-01")]
    pub date_from: Option<NaiveDate>,
    /// Latest submission day, inclusive (`YYYY-MM-DD`).
    #[param(value_type = Option<String>, example = "2024-03-31")]
    pub date_to: Option<NaiveDate>,
    /// Time zone of the date bounds, in minutes east of UTC.
    #[param(example = 60)]
    pub tz_offset_minutes: Option<i32>,
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 20)]
    pub per_page: Option<u64>,
}

/// One row of the upload catalog.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadSummaryResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[schema(example = "Alice Vendor")]
    pub owner_display_name: String,
    #[schema(example = "Acme Machining")]
    pub owner_organization_name: Option<String>,
    #[schema(example = "P-100")]
    pub part_number: String,
    #[schema(example = "Bracket")]
    pub part_name: String,
    pub created_at: DateTime<Utc>,
    #[schema(example = 2)]
    pub file_count: u64,
}

impl From<UploadSummary> for UploadSummaryResponse {
    fn from(s: UploadSummary) -> Self {
        Self {
            id: s.id,
            owner_id: s.owner_id,
            owner_display_name: s.owner_display_name,
            owner_organization_name: s.owner_organization_name,
            part_number: s.part_number,
            part_name: s.part_name,
            created_at: s.created_at,
            file_count: s.file_count,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadListResponse {
    pub data: Vec<UploadSummaryResponse>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct FileAssetResponse {
    /// File ID (UUIDv7).
    #[schema(example = "01936f0e-1234-7abc-8000-000000000001")]
    pub id: Uuid,
    /// Original name as supplied.
    #[schema(example = "drawing v1.pdf")]
    pub file_name: String,
    #[schema(example = 1024)]
    pub size_bytes: i64,
    /// Empty when unknown.
    #[schema(example = "application/pdf")]
    pub mime_type: String,
    /// SHA-256 of the content, also used as the download ETag.
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<file_asset::Model> for FileAssetResponse {
    fn from(model: file_asset::Model) -> Self {
        Self {
            id: model.id,
            file_name: model.file_name,
            size_bytes: model.size_bytes,
            mime_type: model.mime_type,
            content_hash: model.content_hash,
            created_at: model.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadDetailResponse {
    #[serde(flatten)]
    pub upload: UploadSummaryResponse,
    pub files: Vec<FileAssetResponse>,
}

impl From<UploadDetail> for UploadDetailResponse {
    fn from(detail: UploadDetail) -> Self {
        Self {
            upload: detail.summary.into(),
            files: detail.files.into_iter().map(Into::into).collect(),
        }
    }
}
