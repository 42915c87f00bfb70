use common::storage::{BlobKey, BlobStore, BoxReader, StorageError};
use sea_orm::{ConnectionTrait, EntityTrait};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::error::CatalogError;
use super::scope::Scope;
use crate::entity::{file_asset, upload};

/// An authorized file, opened for reading.
pub struct Download {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub content_hash: String,
    pub body: BoxReader,
}

pub struct RetrievalService<'a, C: ConnectionTrait> {
    conn: &'a C,
    blobs: &'a dyn BlobStore,
}

impl<'a, C: ConnectionTrait> RetrievalService<'a, C> {
    pub fn new(conn: &'a C, blobs: &'a dyn BlobStore) -> Self {
        Self { conn, blobs }
    }

    /// Look up a file and check its upload is in scope. Touches no bytes.
    #[instrument(skip(self, scope))]
    pub async fn locate(
        &self,
        scope: &Scope,
        file_id: Uuid,
    ) -> Result<file_asset::Model, CatalogError> {
        let (asset, parent) = file_asset::Entity::find_by_id(file_id)
            .find_also_related(upload::Entity)
            .one(self.conn)
            .await?
            .ok_or(CatalogError::NotFound("File"))?;
        let parent = parent.ok_or(CatalogError::NotFound("File"))?;

        scope.ensure(parent.owner_id)?;
        Ok(asset)
    }

    /// Open the bytes of an already located file.
    pub async fn open(&self, asset: file_asset::Model) -> Result<Download, CatalogError> {
        let key = BlobKey::parse(asset.storage_key.as_str())?;
        let body = match self.blobs.get_stream(&key).await {
            Ok(reader) => reader,
            Err(StorageError::NotFound(_)) => {
                warn!(file_id = %asset.id, %key, "Catalogued file has no blob");
                return Err(CatalogError::StorageUnavailable(format!(
                    "blob for file {} is missing",
                    asset.id
                )));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Download {
            file_name: asset.file_name,
            mime_type: asset.mime_type,
            size_bytes: asset.size_bytes,
            content_hash: asset.content_hash,
            body,
        })
    }

    pub async fn resolve_download(
        &self,
        scope: &Scope,
        file_id: Uuid,
    ) -> Result<Download, CatalogError> {
        let asset = self.locate(scope, file_id).await?;
        self.open(asset).await
    }
}
