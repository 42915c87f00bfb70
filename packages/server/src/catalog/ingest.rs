use std::time::Duration;

use chrono::{DateTime, Utc};
use common::Role;
use common::storage::BlobStore;
use futures::future::join_all;
use sea_orm::sea_query::Condition;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionSession, TransactionTrait, sea_query::Expr,
};
use sha2::{Digest, Sha256};
use tokio::time::timeout;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::error::{CatalogError, FailureStage, FileFailure};
use super::query::file_counts;
use super::storage_key;
use crate::entity::ingestion_intent::{self, IngestionStatus};
use crate::entity::{file_asset, principal, upload};

const MAX_LABEL_CHARS: usize = 256;

/// One file as received from the caller.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    pub bytes: Vec<u8>,
    /// Empty when unknown.
    pub mime_type: String,
}

#[derive(Debug, Clone)]
pub struct NewUpload {
    pub owner_id: Uuid,
    pub part_number: String,
    pub part_name: String,
    pub files: Vec<IncomingFile>,
}

#[derive(Debug, Clone)]
pub struct IngestionLimits {
    pub max_files: usize,
    pub blob_write_timeout: Duration,
    pub catalog_write_timeout: Duration,
}

/// Returned when every file made it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionReceipt {
    pub upload_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub file_count: usize,
}

/// An ingestion that failed, or has been pending longer than expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteIngestion {
    pub upload_id: Uuid,
    pub owner_id: Uuid,
    pub part_number: String,
    pub status: IngestionStatus,
    pub expected_files: i32,
    pub persisted_files: i64,
    pub failure: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct IngestionService<'a, C: ConnectionTrait + TransactionTrait> {
    conn: &'a C,
    blobs: &'a dyn BlobStore,
    limits: &'a IngestionLimits,
}

impl<'a, C: ConnectionTrait + TransactionTrait> IngestionService<'a, C> {
    pub fn new(conn: &'a C, blobs: &'a dyn BlobStore, limits: &'a IngestionLimits) -> Self {
        Self {
            conn,
            blobs,
            limits,
        }
    }

    /// Create one upload and all of its files.
    ///
    /// The upload row and its intent are committed together before any file
    /// is touched. Files are then written concurrently; a failed file does
    /// not cancel or roll back its siblings.
    #[instrument(skip(self, request), fields(owner_id = %request.owner_id, files = request.files.len()))]
    pub async fn submit(&self, request: NewUpload) -> Result<IngestionReceipt, CatalogError> {
        validate(&request, self.limits.max_files)?;

        // Only catalogued vendors may own uploads.
        let owner = principal::Entity::find_by_id(request.owner_id)
            .one(self.conn)
            .await?
            .filter(|p| p.role == Role::Vendor)
            .ok_or(CatalogError::Forbidden)?;

        let upload_id = Uuid::now_v7();
        let created_at = Utc::now();
        let expected = request.files.len();

        let txn = self.conn.begin().await?;
        upload::Entity::insert(upload::ActiveModel {
            id: Set(upload_id),
            owner_id: Set(owner.id),
            part_number: Set(request.part_number.trim().to_string()),
            part_name: Set(request.part_name.trim().to_string()),
            created_at: Set(created_at),
            ..Default::default()
        })
        .exec_without_returning(&txn)
        .await?;
        ingestion_intent::Entity::insert(ingestion_intent::ActiveModel {
            upload_id: Set(upload_id),
            expected_files: Set(expected as i32),
            status: Set(IngestionStatus::Pending),
            failure: Set(None),
            created_at: Set(created_at),
            finished_at: Set(None),
            ..Default::default()
        })
        .exec_without_returning(&txn)
        .await?;
        txn.commit().await?;

        let outcomes = join_all(
            request
                .files
                .into_iter()
                .map(|file| self.ingest_file(upload_id, file)),
        )
        .await;

        let failures: Vec<FileFailure> = outcomes.into_iter().filter_map(Result::err).collect();
        let persisted = expected - failures.len();

        if failures.is_empty() {
            self.finish_intent(upload_id, IngestionStatus::Completed, None)
                .await;
            info!(%upload_id, files = expected, "Upload ingested");
            return Ok(IngestionReceipt {
                upload_id,
                created_at,
                file_count: expected,
            });
        }

        warn!(
            %upload_id,
            expected,
            persisted,
            "Partial ingestion: {} file(s) failed",
            failures.len()
        );
        self.finish_intent(
            upload_id,
            IngestionStatus::Failed,
            Some(summarize(&failures)),
        )
        .await;

        Err(CatalogError::PartialIngestion {
            upload_id,
            expected,
            persisted,
            failures,
        })
    }

    /// Blob write, then catalog insert. Each step has its own deadline.
    async fn ingest_file(&self, upload_id: Uuid, file: IncomingFile) -> Result<(), FileFailure> {
        let fail = |stage, reason: String| FileFailure {
            file_name: file.name.clone(),
            stage,
            reason,
        };

        let key = storage_key::for_file(upload_id, &file.name)
            .map_err(|e| fail(FailureStage::BlobWrite, e.to_string()))?;

        match timeout(
            self.limits.blob_write_timeout,
            self.blobs.put(&key, &file.bytes),
        )
        .await
        {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(fail(FailureStage::BlobWrite, e.to_string())),
            Err(_) => {
                return Err(fail(
                    FailureStage::BlobWrite,
                    format!("timed out after {:?}", self.limits.blob_write_timeout),
                ));
            }
        }

        let model = file_asset::ActiveModel {
            id: Set(Uuid::now_v7()),
            upload_id: Set(upload_id),
            file_name: Set(file.name.clone()),
            storage_key: Set(key.to_string()),
            size_bytes: Set(file.bytes.len() as i64),
            mime_type: Set(file.mime_type.clone()),
            content_hash: Set(hex::encode(Sha256::digest(&file.bytes))),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        match timeout(
            self.limits.catalog_write_timeout,
            file_asset::Entity::insert(model).exec_without_returning(self.conn),
        )
        .await
        {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(fail(FailureStage::CatalogWrite, e.to_string())),
            Err(_) => Err(fail(
                FailureStage::CatalogWrite,
                format!("timed out after {:?}", self.limits.catalog_write_timeout),
            )),
        }
    }

    /// Errors are logged and swallowed; the caller's result is already decided.
    async fn finish_intent(
        &self,
        upload_id: Uuid,
        status: IngestionStatus,
        failure: Option<String>,
    ) {
        let result = ingestion_intent::Entity::update_many()
            .col_expr(ingestion_intent::Column::Status, Expr::value(status))
            .col_expr(ingestion_intent::Column::Failure, Expr::value(failure))
            .col_expr(
                ingestion_intent::Column::FinishedAt,
                Expr::value(Some(Utc::now())),
            )
            .filter(ingestion_intent::Column::UploadId.eq(upload_id))
            .exec(self.conn)
            .await;

        if let Err(e) = result {
            tracing::error!(%upload_id, "Failed to record ingestion outcome: {}", e);
        }
    }

    /// Intents that failed, or that are still pending after `stale_after`.
    ///
    /// Read-only. Deciding what to do with a partial upload is left to an
    /// operator.
    #[instrument(skip(self))]
    pub async fn incomplete_ingestions(
        &self,
        stale_after: Duration,
    ) -> Result<Vec<IncompleteIngestion>, CatalogError> {
        let stale_after = chrono::Duration::from_std(stale_after)
            .map_err(|_| CatalogError::Validation("stale_after is out of range".into()))?;
        let cutoff = Utc::now() - stale_after;

        let rows = ingestion_intent::Entity::find()
            .filter(
                Condition::any()
                    .add(ingestion_intent::Column::Status.eq(IngestionStatus::Failed))
                    .add(
                        Condition::all()
                            .add(ingestion_intent::Column::Status.eq(IngestionStatus::Pending))
                            .add(ingestion_intent::Column::CreatedAt.lt(cutoff)),
                    ),
            )
            .find_also_related(upload::Entity)
            .order_by_asc(ingestion_intent::Column::CreatedAt)
            .all(self.conn)
            .await?;

        let upload_ids: Vec<Uuid> = rows.iter().map(|(intent, _)| intent.upload_id).collect();
        let persisted = file_counts(self.conn, &upload_ids).await?;

        Ok(rows
            .into_iter()
            .filter_map(|(intent, upload)| {
                let upload = upload?;
                Some(IncompleteIngestion {
                    upload_id: intent.upload_id,
                    owner_id: upload.owner_id,
                    part_number: upload.part_number,
                    status: intent.status,
                    expected_files: intent.expected_files,
                    persisted_files: persisted.get(&intent.upload_id).copied().unwrap_or(0),
                    failure: intent.failure,
                    created_at: intent.created_at,
                })
            })
            .collect())
    }
}

/// Reject a submission before anything is written.
pub fn validate(request: &NewUpload, max_files: usize) -> Result<(), CatalogError> {
    validate_label(&request.part_number, "Part number")?;
    validate_label(&request.part_name, "Part name")?;

    if request.files.is_empty() {
        return Err(CatalogError::Validation(
            "At least one file is required".into(),
        ));
    }
    if request.files.len() > max_files {
        return Err(CatalogError::Validation(format!(
            "Too many files: max {max_files}"
        )));
    }

    for file in &request.files {
        let name = file.name.trim();
        if name.is_empty() {
            return Err(CatalogError::Validation(
                "File name must not be empty".into(),
            ));
        }
        if file.name.len() > storage_key::MAX_NAME_BYTES {
            return Err(CatalogError::Validation(format!(
                "File name must be at most {} bytes",
                storage_key::MAX_NAME_BYTES
            )));
        }
        if file.name.chars().any(|c| c.is_control()) {
            return Err(CatalogError::Validation(
                "File name must not contain control characters".into(),
            ));
        }
    }

    Ok(())
}

fn validate_label(value: &str, what: &str) -> Result<(), CatalogError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > MAX_LABEL_CHARS {
        return Err(CatalogError::Validation(format!(
            "{what} must be 1-{MAX_LABEL_CHARS} characters"
        )));
    }
    Ok(())
}

fn summarize(failures: &[FileFailure]) -> String {
    failures
        .iter()
        .map(|f| {
            let stage = match f.stage {
                FailureStage::BlobWrite => "blob_write",
                FailureStage::CatalogWrite => "catalog_write",
            };
            format!("{} [{stage}]: {}", f.file_name, f.reason)
        })
        .collect::<Vec<_>>()
        .join("; ")
}
