use chrono::{DateTime, Utc};
use common::Role;
use serde::Serialize;
use uuid::Uuid;

use crate::entity::principal;

#[derive(Serialize, utoipa::ToSchema)]
pub struct PrincipalResponse {
    pub id: Uuid,
    #[schema(example = "Jane Doe")]
    pub display_name: String,
    pub role: Role,
    /// Always present for vendors.
    #[schema(example = "Acme Machining")]
    pub organization_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<principal::Model> for PrincipalResponse {
    fn from(model: principal::Model) -> Self {
        Self {
            id: model.id,
            display_name: model.display_name,
            role: model.role,
            organization_name: model.organization_name,
            created_at: model.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VendorListResponse {
    pub data: Vec<PrincipalResponse>,
    pub total: u64,
}
