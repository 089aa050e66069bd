use axum::extract::DefaultBodyLimit;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::StorageConfig;
use crate::handlers;
use crate::state::AppState;

/// Room for the non-file parts of a multipart upload.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

pub fn api_routes(storage: &StorageConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(account_routes())
        .merge(literature_routes())
        .merge(file_routes())
        .merge(allocation_routes())
        .layer(upload_body_limit(storage))
}

fn upload_body_limit(storage: &StorageConfig) -> DefaultBodyLimit {
    let limit = usize::try_from(storage.max_blob_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);
    DefaultBodyLimit::max(limit)
}

fn account_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::account::login))
        .routes(routes!(handlers::account::register))
        .routes(routes!(handlers::account::change_password))
        .routes(routes!(handlers::account::list_users))
}

fn literature_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::literature::upload_literature))
        .routes(routes!(handlers::literature::list_literatures))
        .routes(routes!(handlers::literature::search_literatures))
        .routes(routes!(
            handlers::literature::update_literature,
            handlers::literature::delete_literature
        ))
}

fn file_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::file::preview_file))
        .routes(routes!(handlers::file::download_file))
}

fn allocation_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::allocation::allocate_literature))
        .routes(routes!(handlers::allocation::list_allocations))
        .routes(routes!(handlers::allocation::get_allocations))
        .routes(routes!(handlers::allocation::update_allocation))
}
