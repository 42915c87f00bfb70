use common::Role;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An identity known to the catalog. Rows are bootstrapped from outside the
/// core; nothing here mutates them.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "principal")]
pub struct Model {
    /// Identity-provider subject.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub display_name: String,

    #[sea_orm(indexed)]
    pub role: Role,

    /// Required for vendors.
    pub organization_name: Option<String>,

    #[sea_orm(has_many)]
    pub uploads: HasMany<super::upload::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
