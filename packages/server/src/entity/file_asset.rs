use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "file_asset")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(indexed)]
    pub upload_id: Uuid,
    #[sea_orm(belongs_to, from = "upload_id", to = "id")]
    pub upload: HasOne<super::upload::Entity>,

    /// Original name as supplied by the client. Not unique.
    pub file_name: String,

    /// `{upload_id}/{stamp}_{name}`; see `catalog::storage_key`.
    #[sea_orm(unique)]
    pub storage_key: String,

    pub size_bytes: i64,

    /// Empty when the client did not say and the extension is unknown.
    pub mime_type: String,

    /// SHA-256 of the stored bytes, lowercase hex.
    pub content_hash: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
