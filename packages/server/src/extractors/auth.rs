use axum::{extract::FromRequestParts, http::request::Parts};
use common::Role;
use uuid::Uuid;

use crate::catalog::Scope;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Principal extracted from the `Authorization: Bearer <token>` header.
///
/// Claims are trusted as issued; credentials are never checked here.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub principal_id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn scope(&self) -> Scope {
        Scope::for_principal(self.principal_id, self.role)
    }

    /// Returns `Ok(())` if the principal has the given role, `Err(PermissionDenied)` otherwise.
    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims =
            jwt::verify(&state.config.auth.jwt_secret, token).map_err(|_| AppError::TokenInvalid)?;
        let principal_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::TokenInvalid)?;

        Ok(AuthUser {
            principal_id,
            role: claims.role,
        })
    }
}
