use axum::Router;
use axum::middleware;
use axum::routing::{patch, post};

use crate::presentation::AppState;
use crate::presentation::http::handlers::comments::{
    delete_comment, like_comment, unlike_comment, update_comment,
};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/{id}", patch(update_comment).delete(delete_comment))
        .route("/{id}/like", post(like_comment).delete(unlike_comment))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ))
}
