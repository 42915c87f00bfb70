use std::cmp;
use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use common::Role;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use super::error::CatalogError;
use super::scope::Scope;
use crate::entity::{file_asset, principal, upload};

/// Largest offset any real time zone uses, in minutes.
pub const MAX_TZ_OFFSET_MINUTES: i32 = 14 * 60;

/// Optional, AND-combined listing filters.
#[derive(Debug, Clone, Default)]
pub struct UploadFilters {
    pub owner_id: Option<Uuid>,
    /// Case-insensitive substring of the part number.
    pub part_number_contains: Option<String>,
    /// Inclusive, from the start of this day.
    pub date_from: Option<NaiveDate>,
    /// Inclusive, through the end of this day.
    pub date_to: Option<NaiveDate>,
    /// Reference zone for the date bounds, minutes east of UTC.
    pub tz_offset_minutes: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(page: Option<u64>, per_page: Option<u64>, default_per_page: u64, max_per_page: u64) -> Self {
        let max_per_page = cmp::max(max_per_page, 1);
        Self {
            page: cmp::max(page.unwrap_or(1), 1),
            per_page: per_page
                .unwrap_or(default_per_page)
                .clamp(1, max_per_page),
        }
    }

    /// Rows to skip. Pages past what the database can address are rejected.
    pub fn offset(&self) -> Result<u64, CatalogError> {
        (self.page - 1)
            .checked_mul(self.per_page)
            .filter(|offset| *offset <= i64::MAX as u64)
            .ok_or_else(|| CatalogError::Validation(format!("page {} is out of range", self.page)))
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page)
    }
}

/// Upload fields plus the owner's names and a file count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub owner_display_name: String,
    pub owner_organization_name: Option<String>,
    pub part_number: String,
    pub part_name: String,
    pub created_at: DateTime<Utc>,
    pub file_count: u64,
}

#[derive(Debug, Clone)]
pub struct UploadDetail {
    pub summary: UploadSummary,
    pub files: Vec<file_asset::Model>,
}

pub struct QueryService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> QueryService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Newest first, ties broken by id.
    #[instrument(skip(self, scope, filters))]
    pub async fn list_uploads(
        &self,
        scope: &Scope,
        filters: &UploadFilters,
        page: PageRequest,
    ) -> Result<Page<UploadSummary>, CatalogError> {
        let (from, until) = date_bounds(filters)?;
        let offset = page.offset()?;

        let mut select = upload::Entity::find();

        if let Some(owner_id) = scope.effective_owner(filters.owner_id) {
            select = select.filter(upload::Column::OwnerId.eq(owner_id));
        }
        if let Some(ref search) = filters.part_number_contains {
            let term = escape_like(search.trim());
            if !term.is_empty() {
                select = select.filter(
                    Expr::expr(Func::lower(Expr::col(upload::Column::PartNumber)))
                        .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
                );
            }
        }
        if let Some(from) = from {
            select = select.filter(upload::Column::CreatedAt.gte(from));
        }
        if let Some(until) = until {
            select = select.filter(upload::Column::CreatedAt.lt(until));
        }

        let total = select.clone().count(self.conn).await?;

        let rows = select
            .find_also_related(principal::Entity)
            .order_by_desc(upload::Column::CreatedAt)
            .order_by_asc(upload::Column::Id)
            .offset(Some(offset))
            .limit(Some(page.per_page))
            .all(self.conn)
            .await?;

        let ids: Vec<Uuid> = rows.iter().map(|(u, _)| u.id).collect();
        let counts = file_counts(self.conn, &ids).await?;

        let items = rows
            .into_iter()
            .map(|(upload, owner)| {
                let file_count = counts.get(&upload.id).copied().unwrap_or(0) as u64;
                summarize(upload, owner, file_count)
            })
            .collect();

        Ok(Page {
            items,
            page: page.page,
            per_page: page.per_page,
            total,
        })
    }

    /// One upload with its files in creation order.
    #[instrument(skip(self, scope))]
    pub async fn get_upload(
        &self,
        scope: &Scope,
        upload_id: Uuid,
    ) -> Result<UploadDetail, CatalogError> {
        let (upload, owner) = upload::Entity::find_by_id(upload_id)
            .find_also_related(principal::Entity)
            .one(self.conn)
            .await?
            .ok_or(CatalogError::NotFound("Upload"))?;

        scope.ensure(upload.owner_id)?;

        let files = file_asset::Entity::find()
            .filter(file_asset::Column::UploadId.eq(upload.id))
            .order_by_asc(file_asset::Column::CreatedAt)
            .order_by_asc(file_asset::Column::Id)
            .all(self.conn)
            .await?;

        Ok(UploadDetail {
            summary: summarize(upload, owner, files.len() as u64),
            files,
        })
    }

    /// Every vendor, by organization name.
    pub async fn list_vendors(&self) -> Result<Vec<principal::Model>, CatalogError> {
        Ok(principal::Entity::find()
            .filter(principal::Column::Role.eq(Role::Vendor))
            .order_by_asc(principal::Column::OrganizationName)
            .order_by_asc(principal::Column::Id)
            .all(self.conn)
            .await?)
    }
}

fn summarize(upload: upload::Model, owner: Option<principal::Model>, file_count: u64) -> UploadSummary {
    let (owner_display_name, owner_organization_name) = owner
        .map(|p| (p.display_name, p.organization_name))
        .unwrap_or_default();
    UploadSummary {
        id: upload.id,
        owner_id: upload.owner_id,
        owner_display_name,
        owner_organization_name,
        part_number: upload.part_number,
        part_name: upload.part_name,
        created_at: upload.created_at,
        file_count,
    }
}

/// Number of catalogued files per upload. Uploads with none are absent.
pub(crate) async fn file_counts<C: ConnectionTrait>(
    conn: &C,
    upload_ids: &[Uuid],
) -> Result<HashMap<Uuid, i64>, CatalogError> {
    if upload_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let counts: Vec<(Uuid, i64)> = file_asset::Entity::find()
        .select_only()
        .column(file_asset::Column::UploadId)
        .column_as(file_asset::Column::Id.count(), "file_count")
        .filter(file_asset::Column::UploadId.is_in(upload_ids.iter().copied()))
        .group_by(file_asset::Column::UploadId)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(counts.into_iter().collect())
}

/// `[start of date_from, start of the day after date_to)` in the filter's zone.
pub fn date_bounds(
    filters: &UploadFilters,
) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), CatalogError> {
    if filters.tz_offset_minutes.abs() > MAX_TZ_OFFSET_MINUTES {
        return Err(CatalogError::Validation(format!(
            "tz_offset_minutes must be within ±{MAX_TZ_OFFSET_MINUTES}"
        )));
    }
    let offset = FixedOffset::east_opt(filters.tz_offset_minutes * 60)
        .ok_or_else(|| CatalogError::Validation("Invalid time zone offset".into()))?;

    if let (Some(from), Some(to)) = (filters.date_from, filters.date_to)
        && from > to
    {
        return Err(CatalogError::Validation(
            "date_from must not be after date_to".into(),
        ));
    }

    let from = filters
        .date_from
        .map(|d| day_start(d, offset))
        .transpose()?;
    let until = filters
        .date_to
        .map(|d| {
            d.succ_opt()
                .ok_or_else(|| CatalogError::Validation("date_to is out of range".into()))
                .and_then(|next| day_start(next, offset))
        })
        .transpose()?;

    Ok((from, until))
}

fn day_start(date: NaiveDate, offset: FixedOffset) -> Result<DateTime<Utc>, CatalogError> {
    offset
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| CatalogError::Validation(format!("Invalid date {date}")))
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
