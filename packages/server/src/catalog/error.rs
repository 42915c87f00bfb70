use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;
use uuid::Uuid;

/// Which half of a per-file write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    BlobWrite,
    CatalogWrite,
}

/// One file that did not make it through ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct FileFailure {
    pub file_name: String,
    pub stage: FailureStage,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Rejected before any write.
    #[error("{0}")]
    Validation(String),

    /// Some per-file writes failed. The upload row and the files that did
    /// succeed stay persisted.
    #[error("upload {upload_id} persisted {persisted} of {expected} files")]
    PartialIngestion {
        upload_id: Uuid,
        expected: usize,
        persisted: usize,
        failures: Vec<FileFailure>,
    },

    /// The acting principal may not touch this resource.
    #[error("access denied")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Blob store or catalog connection failure.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for CatalogError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
                CatalogError::StorageUnavailable(err.to_string())
            }
            other => CatalogError::Database(other),
        }
    }
}

impl From<StorageError> for CatalogError {
    fn from(err: StorageError) -> Self {
        CatalogError::StorageUnavailable(err.to_string())
    }
}
