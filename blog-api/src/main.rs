use std::sync::Arc;

use anyhow::Result;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::auth_service::AuthService;
use application::comment_service::CommentService;
use application::post_service::PostService;
use data::repositories::postgres::comment_repository::PostgresCommentRepository;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use data::repositories::postgres::user_repository::PostgresUserRepository;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url).await?;
    run_migrations(&pool).await?;

    let user_repo = PostgresUserRepository::new(pool.clone());
    let post_repo = PostgresPostRepository::new(pool.clone());
    let comment_repo = PostgresCommentRepository::new(pool.clone());

    let auth_service = Arc::new(AuthService::new(
        user_repo,
        JwtService::new(&settings.jwt_secret, settings.jwt_ttl_seconds),
    ));
    let post_service = Arc::new(PostService::new(post_repo.clone()));
    let comment_service = Arc::new(CommentService::new(comment_repo, post_repo));
    let jwt = Arc::new(JwtService::new(
        &settings.jwt_secret,
        settings.jwt_ttl_seconds,
    ));

    let state = AppState::new(auth_service, post_service, comment_service, jwt);

    server::run_http(&settings, state).await
}
