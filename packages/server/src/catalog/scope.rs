use common::Role;
use uuid::Uuid;

use super::error::CatalogError;

/// Visibility restriction derived from the acting principal.
///
/// Managers see everything. Vendors see only uploads they own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    pub can_see_all_uploads: bool,
    pub owner_filter: Option<Uuid>,
}

impl Scope {
    pub fn for_principal(principal_id: Uuid, role: Role) -> Self {
        match role {
            Role::Manager => Scope {
                can_see_all_uploads: true,
                owner_filter: None,
            },
            Role::Vendor => Scope {
                can_see_all_uploads: false,
                owner_filter: Some(principal_id),
            },
        }
    }

    /// Whether an upload owned by `owner_id` is visible.
    pub fn permits(&self, owner_id: Uuid) -> bool {
        self.can_see_all_uploads || self.owner_filter == Some(owner_id)
    }

    pub fn ensure(&self, owner_id: Uuid) -> Result<(), CatalogError> {
        if self.permits(owner_id) {
            Ok(())
        } else {
            Err(CatalogError::Forbidden)
        }
    }

    /// Owner filter to apply to a listing. Restricted scopes ignore whatever
    /// the caller asked for.
    pub fn effective_owner(&self, requested: Option<Uuid>) -> Option<Uuid> {
        match self.owner_filter {
            Some(owner) => Some(owner),
            None => requested,
        }
    }
}
