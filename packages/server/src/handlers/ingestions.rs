use std::time::Duration;

use axum::Json;
use axum::extract::State;
use common::Role;
use tracing::instrument;

use crate::catalog::ingest::IngestionService;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::query::AppQuery;
use crate::models::ingestion::{IncompleteIngestionListResponse, IncompleteIngestionQuery};
use crate::state::AppState;

const DEFAULT_STALE_AFTER_SECS: u64 = 3600;

#[utoipa::path(
    get,
    path = "/ingestions/incomplete",
    tag = "Ingestions",
    operation_id = "listIncompleteIngestions",
    summary = "List incomplete ingestions",
    description = "Reports uploads whose file fan-out failed, or has been pending for longer \
        than `stale_after_secs`, with expected and persisted file counts. Nothing is deleted. \
        Managers only.",
    params(IncompleteIngestionQuery),
    responses(
        (status = 200, description = "Incomplete ingestions", body = IncompleteIngestionListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_incomplete(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<IncompleteIngestionQuery>,
) -> Result<Json<IncompleteIngestionListResponse>, AppError> {
    auth_user.require_role(Role::Manager)?;

    let stale_after =
        Duration::from_secs(query.stale_after_secs.unwrap_or(DEFAULT_STALE_AFTER_SECS));
    let limits = state.config.ingestion.limits();
    let rows = IngestionService::new(&state.db, &*state.blob_store, &limits)
        .incomplete_ingestions(stale_after)
        .await?;
    let total = rows.len() as u64;

    Ok(Json(IncompleteIngestionListResponse {
        data: rows.into_iter().map(Into::into).collect(),
        total,
    }))
}
