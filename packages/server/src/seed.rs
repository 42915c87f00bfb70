use common::Role;
use sea_orm::sea_query::{
    Index, IndexCreateStatement, MysqlQueryBuilder, OnConflict, PostgresQueryBuilder,
    SqliteQueryBuilder,
};
use sea_orm::*;
use tracing::info;

use crate::config::SeedPrincipal;
use crate::entity::{file_asset, principal, upload};

/// Insert configured principals that do not exist yet.
///
/// Existing rows are left alone; principals are never mutated here.
pub async fn seed_principals(
    db: &DatabaseConnection,
    principals: &[SeedPrincipal],
) -> Result<(), DbErr> {
    let mut inserted = 0u32;
    for seed in principals {
        let organization_name = seed
            .organization_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        if seed.role == Role::Vendor && organization_name.is_none() {
            return Err(DbErr::Custom(format!(
                "seed principal {} is a vendor without an organization_name",
                seed.id
            )));
        }

        let model = principal::ActiveModel {
            id: Set(seed.id),
            display_name: Set(seed.display_name.trim().to_string()),
            role: Set(seed.role),
            organization_name: Set(organization_name),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let result = principal::Entity::insert(model)
            .on_conflict(
                OnConflict::column(principal::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(n) if n > 0 => inserted += 1,
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if inserted > 0 {
        info!("Seeded {} new principals", inserted);
    }

    Ok(())
}

/// Ensure composite indexes exist.
///
/// SeaORM's schema-sync only creates single-column indexes, so these are
/// created on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Vendor-scoped listing: WHERE owner_id = ? ORDER BY created_at DESC
    let owner_created = Index::create()
        .if_not_exists()
        .name("idx_upload_owner_created")
        .table(upload::Entity)
        .col(upload::Column::OwnerId)
        .col(upload::Column::CreatedAt)
        .to_owned();

    // File counts and upload detail: WHERE upload_id = ? ORDER BY created_at
    let upload_files = Index::create()
        .if_not_exists()
        .name("idx_file_asset_upload_created")
        .table(file_asset::Entity)
        .col(file_asset::Column::UploadId)
        .col(file_asset::Column::CreatedAt)
        .to_owned();

    for (name, stmt) in [
        ("idx_upload_owner_created", owner_created),
        ("idx_file_asset_upload_created", upload_files),
    ] {
        match db.execute_unprepared(&render(db, &stmt)).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}

fn render(db: &DatabaseConnection, stmt: &IndexCreateStatement) -> String {
    match db.get_database_backend() {
        DbBackend::Postgres => stmt.to_string(PostgresQueryBuilder),
        DbBackend::MySql => stmt.to_string(MysqlQueryBuilder),
        DbBackend::Sqlite => stmt.to_string(SqliteQueryBuilder),
        #[allow(unreachable_patterns)]
        _ => stmt.to_string(PostgresQueryBuilder),
    }
}
