use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle of one ingestion attempt.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    DeriveActiveEnum,
    EnumIter,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum IngestionStatus {
    /// Upload row written, file fan-out not finished.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Every expected file was stored and catalogued.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// At least one file failed. Siblings may still be persisted.
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// Write-ahead record of how many files an upload expects.
///
/// Written in the same transaction as the upload row so a crash mid fan-out
/// leaves a `pending` intent behind for reconciliation.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ingestion_intent")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub upload_id: Uuid,
    #[sea_orm(belongs_to, from = "upload_id", to = "id")]
    pub upload: HasOne<super::upload::Entity>,

    pub expected_files: i32,

    #[sea_orm(indexed)]
    pub status: IngestionStatus,

    #[sea_orm(column_type = "Text", nullable)]
    pub failure: Option<String>,

    pub created_at: DateTimeUtc,
    pub finished_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
