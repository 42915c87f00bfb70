use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(upload_routes(config))
        .routes(routes!(handlers::files::download_file))
        .routes(routes!(handlers::principals::me))
        .routes(routes!(handlers::principals::list_vendors))
        .routes(routes!(handlers::ingestions::list_incomplete))
}

fn upload_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::uploads::submit_upload,
            handlers::uploads::list_uploads
        ))
        .routes(routes!(handlers::uploads::get_upload))
        .layer(handlers::uploads::upload_body_limit(
            config.ingestion.max_request_bytes,
        ))
}
