use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::policy::filter::{CompiledFilter, PageRequest};
use crate::domain::post::{Post, PostPatch};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) author_id: i64,
    pub(crate) is_published: bool,
}

/// A post joined with the moment the requesting user liked it.
#[derive(Debug, Clone)]
pub(crate) struct LikedPost {
    pub(crate) post: Post,
    pub(crate) liked_at: DateTime<Utc>,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;

    /// Applies present patch fields only; the caller has already done
    /// the ownership check, so this updates by id alone.
    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;

    /// Must select exactly the rows `filter.matches` accepts, ordered
    /// newest first.
    async fn list_posts(
        &self,
        filter: &CompiledFilter,
        page: PageRequest,
    ) -> Result<Vec<Post>, DomainError>;
    async fn count_posts(&self, filter: &CompiledFilter) -> Result<i64, DomainError>;

    async fn post_like_exists(&self, user_id: i64, post_id: i64) -> Result<bool, DomainError>;

    /// Inserts the like row and bumps the counter in one transaction;
    /// a duplicate surfaces as `DomainError::AlreadyExists`.
    async fn like_post(&self, user_id: i64, post_id: i64) -> Result<(), DomainError>;

    /// Returns false when there was no like row to remove. The counter
    /// decrement is floored at zero.
    async fn unlike_post(&self, user_id: i64, post_id: i64) -> Result<bool, DomainError>;

    async fn list_liked_posts(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<Vec<LikedPost>, DomainError>;
}
