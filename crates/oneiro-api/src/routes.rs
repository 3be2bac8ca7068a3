use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::middleware::resolve_viewer;
use crate::{ai, comments, dreams, feed, likes, profile};

/// The full HTTP surface. Everything outside `/auth` passes through
/// `resolve_viewer`; handlers that need a caller extract `AuthUser`.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/feed", get(feed::get_feed))
        .route("/explore", get(feed::explore))
        .route("/dreams", post(dreams::create_dream))
        .route(
            "/dreams/{dream_id}",
            get(dreams::get_dream)
                .patch(dreams::update_dream)
                .delete(dreams::delete_dream),
        )
        .route("/dreams/{dream_id}/like", post(likes::toggle_like))
        .route("/dreams/{dream_id}/analysis", post(dreams::analyze_dream))
        .route(
            "/dreams/{dream_id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/comments/{comment_id}", delete(comments::delete_comment))
        .route("/me", get(profile::get_me).patch(profile::update_me))
        .route("/me/dreams", get(profile::my_dreams))
        .route("/me/stats", get(profile::my_stats))
        .route("/ai/tags", post(ai::suggest_tags))
        .route("/ai/image", post(ai::generate_image))
        .layer(middleware::from_fn_with_state(state.clone(), resolve_viewer))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
