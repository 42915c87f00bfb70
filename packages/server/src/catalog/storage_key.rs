use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use common::storage::{BlobKey, StorageError};
use uuid::Uuid;

/// Longest file name, in bytes, that still fits one path segment of 255
/// bytes once the stamp (at most 19 digits) and separator are prepended.
pub const MAX_NAME_BYTES: usize = 255 - 20;

static LAST_STAMP: AtomicI64 = AtomicI64::new(0);

/// Wall-clock milliseconds, bumped past the previous value on collision.
///
/// Strictly increasing for the life of the process, so two files with the
/// same name in one upload always get distinct keys.
pub fn next_stamp() -> i64 {
    let now = Utc::now().timestamp_millis();
    let (Ok(prev) | Err(prev)) =
        LAST_STAMP.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        });
    now.max(prev + 1)
}

/// Replace characters that would change the key's shape.
pub fn key_safe_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// `{upload_id}/{stamp}_{name}`
pub fn for_file(upload_id: Uuid, file_name: &str) -> Result<BlobKey, StorageError> {
    BlobKey::parse(format!(
        "{upload_id}/{}_{}",
        next_stamp(),
        key_safe_name(file_name)
    ))
}
