use async_trait::async_trait;
use ::s3::creds::Credentials;
use ::s3::{Bucket, Region};
use tokio::io::AsyncReadExt;

use super::error::StorageError;
use super::key::BlobKey;
use super::traits::{BlobStore, BoxReader};
use crate::config::S3Config;

/// S3-compatible object storage (AWS, MinIO, R2, ...).
///
/// Blob keys are used verbatim as object names inside the configured bucket.
pub struct S3BlobStore {
    bucket: Box<Bucket>,
    max_size: u64,
}

impl S3BlobStore {
    pub fn new(config: &S3Config, max_size: u64) -> Result<Self, StorageError> {
        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse()
                .map_err(|e| StorageError::Backend(format!("invalid region: {e}")))?,
        };

        let credentials = Credentials::new(
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("invalid credentials: {e}")))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self { bucket, max_size })
    }

    fn check_status(key: &BlobKey, status: u16) -> Result<(), StorageError> {
        match status {
            200..=299 => Ok(()),
            404 => Err(StorageError::NotFound(key.to_string())),
            other => Err(StorageError::Backend(format!(
                "unexpected status {other} for {key}"
            ))),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &BlobKey, data: &[u8]) -> Result<u64, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let response = self
            .bucket
            .put_object(key.as_str(), data)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Self::check_status(key, response.status_code())?;

        Ok(data.len() as u64)
    }

    async fn put_stream(&self, key: &BlobKey, reader: BoxReader) -> Result<u64, StorageError> {
        // Read one byte past the limit so oversized input is detected without
        // buffering all of it.
        let mut buf = Vec::new();
        let mut limited = reader.take(self.max_size + 1);
        limited.read_to_end(&mut buf).await?;
        self.put(key, &buf).await
    }

    async fn get(&self, key: &BlobKey) -> Result<Vec<u8>, StorageError> {
        let response = self
            .bucket
            .get_object(key.as_str())
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Self::check_status(key, response.status_code())?;

        Ok(response.bytes().to_vec())
    }

    async fn get_stream(&self, key: &BlobKey) -> Result<BoxReader, StorageError> {
        let data = self.get(key).await?;
        Ok(Box::new(std::io::Cursor::new(data)))
    }

    async fn exists(&self, key: &BlobKey) -> Result<bool, StorageError> {
        match self.size(key).await {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, key: &BlobKey) -> Result<bool, StorageError> {
        if !self.exists(key).await? {
            return Ok(false);
        }

        let response = self
            .bucket
            .delete_object(key.as_str())
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Self::check_status(key, response.status_code())?;

        Ok(true)
    }

    async fn size(&self, key: &BlobKey) -> Result<u64, StorageError> {
        let (head, status) = self
            .bucket
            .head_object(key.as_str())
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Self::check_status(key, status)?;

        Ok(head.content_length.unwrap_or(0).max(0) as u64)
    }
}
