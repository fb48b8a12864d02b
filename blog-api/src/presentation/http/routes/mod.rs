use axum::Router;

use crate::presentation::AppState;

pub(crate) mod auth;
pub(crate) mod comments;
pub(crate) mod posts;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth::router())
        .nest("/api/posts", posts::router(state.clone()))
        .nest("/api/comments", comments::router(state))
}
