use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::Role;
use tracing::instrument;
use uuid::Uuid;

use crate::catalog::ingest::{IncomingFile, IngestionService, NewUpload};
use crate::catalog::query::{PageRequest, QueryService, UploadFilters};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::query::AppQuery;
use crate::models::shared::Pagination;
use crate::models::upload::*;
use crate::state::AppState;

pub fn upload_body_limit(max_request_bytes: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_request_bytes)
}

#[utoipa::path(
    post,
    path = "/uploads",
    tag = "Uploads",
    operation_id = "submitUpload",
    summary = "Submit a part with its files",
    description = "Creates one upload owned by the calling vendor and stores every `files` field \
        against it. Files are written concurrently. If any file fails, the response is \
        `PARTIAL_INGESTION_FAILURE` and the files that did succeed are kept; re-submitting \
        creates a new upload.",
    request_body(content_type = "multipart/form-data", content = SubmitUploadForm),
    responses(
        (status = 201, description = "Upload created", body = SubmitUploadResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Caller is not a vendor (PERMISSION_DENIED)", body = ErrorBody),
        (status = 502, description = "Some files were not stored (PARTIAL_INGESTION_FAILURE)", body = ErrorBody),
        (status = 503, description = "Storage unavailable (STORAGE_UNAVAILABLE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(principal_id = %auth_user.principal_id))]
pub async fn submit_upload(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role(Role::Vendor)?;

    let max_size = state.config.storage.max_blob_size;
    let mut part_number: Option<String> = None;
    let mut part_name: Option<String> = None;
    let mut files: Vec<IncomingFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("part_number") => {
                part_number = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read part_number: {e}"))
                })?);
            }
            Some("part_name") => {
                part_name = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read part_name: {e}"))
                })?);
            }
            Some("files") => {
                let name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::Validation("Each file must have a filename".into()))?;
                let declared = field
                    .content_type()
                    .map(str::to_string)
                    .filter(|m| !m.is_empty());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?;
                if bytes.len() as u64 > max_size {
                    return Err(AppError::Validation(format!(
                        "File '{name}' exceeds maximum size of {max_size} bytes"
                    )));
                }

                let mime_type = declared
                    .or_else(|| mime_guess::from_path(&name).first().map(|m| m.to_string()))
                    .unwrap_or_default();

                files.push(IncomingFile {
                    name,
                    bytes: bytes.to_vec(),
                    mime_type,
                });
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let limits = state.config.ingestion.limits();
    let service = IngestionService::new(&state.db, &*state.blob_store, &limits);
    let receipt = service
        .submit(NewUpload {
            owner_id: auth_user.principal_id,
            part_number: part_number.unwrap_or_default(),
            part_name: part_name.unwrap_or_default(),
            files,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitUploadResponse::from(receipt)),
    ))
}

#[utoipa::path(
    get,
    path = "/uploads",
    tag = "Uploads",
    operation_id = "listUploads",
    summary = "List uploads",
    description = "Returns a paginated list of uploads, newest first, with owner name and file \
        count. Managers see every upload and may filter by `owner_id`; vendors only ever see \
        their own. Date bounds are whole days in the given `tz_offset_minutes`.",
    params(UploadListQuery),
    responses(
        (status = 200, description = "Upload list", body = UploadListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(principal_id = %auth_user.principal_id))]
pub async fn list_uploads(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UploadListQuery>,
) -> Result<Json<UploadListResponse>, AppError> {
    let catalog = &state.config.catalog;
    let page = PageRequest::new(
        query.page,
        query.per_page,
        catalog.default_per_page,
        catalog.max_per_page,
    );
    let filters = UploadFilters {
        owner_id: query.owner_id,
        part_number_contains: query.part_number,
        date_from: query.date_from,
        date_to: query.date_to,
        tz_offset_minutes: query.tz_offset_minutes.unwrap_or(catalog.tz_offset_minutes),
    };

    let result = QueryService::new(&state.db)
        .list_uploads(&auth_user.scope(), &filters, page)
        .await?;

    let pagination = Pagination::from(&result);
    Ok(Json(UploadListResponse {
        data: result.items.into_iter().map(Into::into).collect(),
        pagination,
    }))
}

#[utoipa::path(
    get,
    path = "/uploads/{id}",
    tag = "Uploads",
    operation_id = "getUpload",
    summary = "Get upload details",
    description = "Returns one upload with its files in submission order. Uploads owned by \
        another vendor are reported as not found.",
    params(("id" = Uuid, Path, description = "Upload ID")),
    responses(
        (status = 200, description = "Upload details", body = UploadDetailResponse),
        (status = 400, description = "Invalid ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Upload not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(upload_id = %id))]
pub async fn get_upload(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UploadDetailResponse>, AppError> {
    let upload_id =
        Uuid::parse_str(&id).map_err(|_| AppError::Validation("Invalid upload ID".into()))?;

    let detail = QueryService::new(&state.db)
        .get_upload(&auth_user.scope(), upload_id)
        .await
        .map_err(|e| e.masking_forbidden("Upload"))?;

    Ok(Json(detail.into()))
}
