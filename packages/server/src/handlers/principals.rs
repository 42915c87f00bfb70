use axum::Json;
use axum::extract::State;
use common::Role;
use sea_orm::EntityTrait;
use tracing::instrument;

use crate::catalog::query::QueryService;
use crate::entity::principal;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::principal::{PrincipalResponse, VendorListResponse};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/principals/me",
    tag = "Principals",
    operation_id = "getCurrentPrincipal",
    summary = "Get the calling principal",
    description = "Returns the catalog record for the principal named by the bearer token.",
    responses(
        (status = 200, description = "Current principal", body = PrincipalResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Principal not in catalog (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(principal_id = %auth_user.principal_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<PrincipalResponse>, AppError> {
    let model = principal::Entity::find_by_id(auth_user.principal_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Principal not found".into()))?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/vendors",
    tag = "Principals",
    operation_id = "listVendors",
    summary = "List vendors",
    description = "Returns every vendor ordered by organization name. Managers only.",
    responses(
        (status = 200, description = "Vendor list", body = VendorListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_vendors(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<VendorListResponse>, AppError> {
    auth_user.require_role(Role::Manager)?;

    let vendors = QueryService::new(&state.db).list_vendors().await?;
    let total = vendors.len() as u64;

    Ok(Json(VendorListResponse {
        data: vendors.into_iter().map(Into::into).collect(),
        total,
    }))
}
