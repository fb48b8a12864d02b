use async_trait::async_trait;

use crate::domain::comment::{Comment, CommentPatch};
use crate::domain::error::DomainError;
use crate::domain::policy::filter::PageRequest;

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) content: String,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) parent_id: Option<i64>,
}

#[async_trait]
pub(crate) trait CommentRepository: Send + Sync {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError>;
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError>;

    /// Root and reply comments of one post, oldest first.
    async fn list_comments(
        &self,
        post_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Comment>, DomainError>;

    async fn update_comment(
        &self,
        id: i64,
        patch: CommentPatch,
    ) -> Result<Option<Comment>, DomainError>;
    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError>;

    async fn comment_like_exists(
        &self,
        user_id: i64,
        comment_id: i64,
    ) -> Result<bool, DomainError>;

    /// Same transactional contract as the post like: row insert and
    /// counter bump together, duplicate maps to AlreadyExists.
    async fn like_comment(&self, user_id: i64, comment_id: i64) -> Result<(), DomainError>;
    async fn unlike_comment(&self, user_id: i64, comment_id: i64) -> Result<bool, DomainError>;
}
