use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::data::post_repository::LikedPost;
use crate::domain::policy::filter::{PageRequest, RawPostFilter};
use crate::domain::post::{Post, PostDraft, PostPatch};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::middleware::auth::{AuthenticatedUser, MaybeAuthenticatedUser};

const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 1, max = 100))]
    pub(crate) title: String,
    #[validate(length(min = 1, max = 1000))]
    pub(crate) content: String,
    pub(crate) is_published: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdatePostDto {
    #[validate(length(min = 1, max = 100))]
    pub(crate) title: Option<String>,
    #[validate(length(min = 1, max = 1000))]
    pub(crate) content: Option<String>,
    pub(crate) is_published: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct ListPostsQuery {
    #[validate(length(min = 1, max = 100))]
    pub(crate) title: Option<String>,
    #[validate(length(min = 1, max = 1000))]
    pub(crate) content: Option<String>,
    pub(crate) author_id: Option<i64>,
    pub(crate) is_published: Option<bool>,
    pub(crate) page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub(crate) size: Option<u32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PageQuery {
    pub(crate) page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub(crate) size: Option<u32>,
}

impl PageQuery {
    pub(crate) fn to_page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page.unwrap_or(0),
            size: self.size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) author_id: i64,
    pub(crate) is_published: bool,
    pub(crate) number_of_likes: i64,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListPostsResponseDto {
    pub(crate) items: Vec<PostDto>,
    pub(crate) page: u32,
    pub(crate) size: u32,
    pub(crate) total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LikedPostDto {
    #[serde(flatten)]
    pub(crate) post: PostDto,
    pub(crate) liked_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LikedPostsResponseDto {
    pub(crate) items: Vec<LikedPostDto>,
    pub(crate) page: u32,
    pub(crate) size: u32,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            is_published: post.is_published,
            number_of_likes: post.number_of_likes,
            created_at: post.created_at,
        }
    }
}

impl From<LikedPost> for LikedPostDto {
    fn from(liked: LikedPost) -> Self {
        Self {
            post: liked.post.into(),
            liked_at: liked.liked_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(
        ("title" = Option<String>, Query, description = "Title substring, case-insensitive"),
        ("content" = Option<String>, Query, description = "Content substring, case-insensitive"),
        ("author_id" = Option<i64>, Query, description = "Restrict to one author"),
        ("is_published" = Option<bool>, Query, description = "Explicit published filter"),
        ("page" = Option<u32>, Query, description = "Zero-based page"),
        ("size" = Option<u32>, Query, description = "Items per page (1..=100)")
    ),
    responses(
        (status = 200, description = "Posts listed", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    requester: MaybeAuthenticatedUser,
    Query(query): Query<ListPostsQuery>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    query.validate()?;
    let page = PageRequest {
        page: query.page.unwrap_or(0),
        size: query.size.unwrap_or(DEFAULT_PAGE_SIZE),
    };
    let raw_filter = RawPostFilter {
        title: query.title,
        content: query.content,
        author_id: query.author_id,
        is_published: query.is_published,
    };

    let result = state
        .post_service
        .list_posts(raw_filter, page, requester.0)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ListPostsResponseDto {
            items: result.items.into_iter().map(PostDto::from).collect(),
            page: result.page,
            size: result.size,
            total: result.total,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDto),
        (status = 404, description = "Post not found or not visible"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    requester: MaybeAuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    let result = state.post_service.get_post(id, requester.0).await?;

    Ok((StatusCode::OK, Json(PostDto::from(result))))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;

    let result = state
        .post_service
        .create_post(
            auth.user_id,
            PostDraft {
                title: dto.title,
                content: dto.content,
                is_published: dto.is_published,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(PostDto::from(result))))
}

#[utoipa::path(
    patch,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(dto): Json<UpdatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;

    let result = state
        .post_service
        .update_post(
            auth.user_id,
            id,
            PostPatch {
                title: dto.title,
                content: dto.content,
                is_published: dto.is_published,
            },
        )
        .await?;

    Ok((StatusCode::OK, Json(PostDto::from(result))))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.post_service.delete_post(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/like",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post liked"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 409, description = "Already liked"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn like_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.post_service.like_post(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}/like",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Like removed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post or like not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn unlike_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.post_service.unlike_post(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/posts/liked",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("page" = Option<u32>, Query, description = "Zero-based page"),
        ("size" = Option<u32>, Query, description = "Items per page (1..=100)")
    ),
    responses(
        (status = 200, description = "Liked posts listed", body = LikedPostsResponseDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn liked_posts(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<(StatusCode, Json<LikedPostsResponseDto>)> {
    query.validate()?;
    let page = query.to_page_request();

    let items = state.post_service.liked_posts(auth.user_id, page).await?;

    Ok((
        StatusCode::OK,
        Json(LikedPostsResponseDto {
            items: items.into_iter().map(LikedPostDto::from).collect(),
            page: page.page,
            size: page.size,
        }),
    ))
}
