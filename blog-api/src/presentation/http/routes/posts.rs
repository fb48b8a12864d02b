use axum::Router;
use axum::middleware;
use axum::routing::{get, patch, post};

use crate::presentation::AppState;
use crate::presentation::http::handlers::comments::{create_comment, list_comments};
use crate::presentation::http::handlers::posts::{
    create_post, delete_post, get_post, like_post, liked_posts, list_posts, unlike_post,
    update_post,
};
use crate::presentation::http::middleware::auth::{
    jwt_auth_middleware, jwt_optional_auth_middleware,
};

pub(crate) fn router(state: AppState) -> Router<AppState> {
    // Read endpoints admit anonymous requests; the optional middleware
    // still validates a token when one is sent, so the visibility
    // policy sees the requester.
    let public = Router::new()
        .route("/", get(list_posts))
        .route("/{id}", get(get_post))
        .route("/{id}/comments", get(list_comments))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_optional_auth_middleware,
        ));

    let protected = Router::new()
        .route("/", post(create_post))
        .route("/liked", get(liked_posts))
        .route("/{id}", patch(update_post).delete(delete_post))
        .route("/{id}/like", post(like_post).delete(unlike_post))
        .route("/{id}/comments", post(create_comment))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    public.merge(protected)
}
