/// Router assembly
use crate::{api, middleware, services::AuthService, state::AppState};
use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::{path::Path, sync::Arc};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the full application router
///
/// Uploaded covers under `covers_dir` are served at `/covers`.
pub fn create_router(app_state: AppState, auth_service: Arc<AuthService>, covers_dir: &Path) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(api::health::health))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/refresh", post(api::auth::refresh))
        .route("/check/albums", get(api::check::album_title))
        .route("/check/usernames", get(api::check::username))
        .route("/albums", get(api::albums::list_albums))
        .route("/albums/recommended", get(api::albums::recommended_albums))
        .route("/users/:owner/albums", get(api::albums::owner_albums))
        .route(
            "/users/:owner/albums/active",
            get(api::albums::owner_active_albums),
        )
        .route(
            "/users/:owner/albums/visible",
            get(api::albums::owner_visible_albums),
        );

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/albums", post(api::albums::create_album))
        .route(
            "/albums/:id",
            get(api::albums::get_album)
                .put(api::albums::update_album)
                .delete(api::albums::delete_album),
        )
        .route("/albums/:id/cover", put(api::albums::upload_cover))
        .route("/metadata/suggestions", get(api::metadata::suggestions))
        .route(
            "/metadata/albums/:external_id",
            get(api::metadata::album_detail),
        )
        // Moderation; the moderator check happens in the album core
        .route("/admin/albums", get(api::admin::moderation_queue))
        .route("/admin/albums/counts", get(api::admin::album_counts))
        .route("/admin/albums/status", post(api::admin::change_status))
        .route("/admin/albums/recommend", post(api::admin::set_recommended))
        .layer(axum_middleware::from_fn_with_state(
            auth_service,
            middleware::auth_middleware,
        ));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .nest_service("/covers", ServeDir::new(covers_dir))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
