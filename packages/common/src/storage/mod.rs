mod error;
mod key;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

use std::sync::Arc;

pub use error::StorageError;
pub use key::{BlobKey, MAX_KEY_LEN};
pub use traits::{BlobStore, BoxReader};

use crate::config::{StorageBackend, StorageConfig};

/// Build the blob store selected by `config.backend`.
pub async fn from_config(config: &StorageConfig) -> Result<Arc<dyn BlobStore>, StorageError> {
    tracing::info!(backend = ?config.backend, max_blob_size = config.max_blob_size, "Initializing blob store");
    match config.backend {
        StorageBackend::Filesystem => {
            let store =
                filesystem::FilesystemBlobStore::new(config.path.clone(), config.max_blob_size)
                    .await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "object-storage")]
        StorageBackend::S3 => {
            let s3_config = config.s3.as_ref().ok_or_else(|| {
                StorageError::Backend("storage.backend = \"s3\" requires a [storage.s3] table".into())
            })?;
            Ok(Arc::new(s3::S3BlobStore::new(s3_config, config.max_blob_size)?))
        }
        #[cfg(not(feature = "object-storage"))]
        StorageBackend::S3 => Err(StorageError::Backend(
            "built without the `object-storage` feature".into(),
        )),
    }
}
