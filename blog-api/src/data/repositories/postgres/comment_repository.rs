use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::repositories::postgres::{map_db_error, map_like_db_error};
use crate::domain::comment::{Comment, CommentPatch};
use crate::domain::error::DomainError;
use crate::domain::policy::filter::PageRequest;

#[derive(Debug, Clone)]
pub(crate) struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    content: String,
    post_id: i64,
    author_id: i64,
    parent_id: Option<i64>,
    number_of_likes: i64,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(
            "INSERT INTO comments (content, post_id, author_id, parent_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, content, post_id, author_id, parent_id, number_of_likes, created_at",
        )
        .bind(&input.content)
        .bind(input.post_id)
        .bind(input.author_id)
        .bind(input.parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_db_error(err, "post"))?;

        map_row_to_comment(row)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(
            "SELECT id, content, post_id, author_id, parent_id, number_of_likes, created_at \
             FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| map_db_error(err, "comment"))?;

        row.map(map_row_to_comment).transpose()
    }

    async fn list_comments(
        &self,
        post_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Comment>, DomainError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT id, content, post_id, author_id, parent_id, number_of_likes, created_at \
             FROM comments \
             WHERE post_id = $1 \
             ORDER BY created_at ASC, id ASC \
             LIMIT $2 OFFSET $3",
        )
        .bind(post_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|err| map_db_error(err, "comment"))?;

        rows.into_iter().map(map_row_to_comment).collect()
    }

    async fn update_comment(
        &self,
        id: i64,
        patch: CommentPatch,
    ) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(
            "UPDATE comments SET content = COALESCE($2, content) \
             WHERE id = $1 \
             RETURNING id, content, post_id, author_id, parent_id, number_of_likes, created_at",
        )
        .bind(id)
        .bind(patch.content)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| map_db_error(err, "comment"))?;

        row.map(map_row_to_comment).transpose()
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| map_db_error(err, "comment"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn comment_like_exists(
        &self,
        user_id: i64,
        comment_id: i64,
    ) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM comment_likes WHERE user_id = $1 AND comment_id = $2)",
        )
        .bind(user_id)
        .bind(comment_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_db_error(err, "comment like"))
    }

    async fn like_comment(&self, user_id: i64, comment_id: i64) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| map_db_error(err, "comment"))?;

        sqlx::query("INSERT INTO comment_likes (user_id, comment_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(comment_id)
            .execute(&mut *tx)
            .await
            .map_err(|err| map_like_db_error(err, "comment"))?;

        sqlx::query("UPDATE comments SET number_of_likes = number_of_likes + 1 WHERE id = $1")
            .bind(comment_id)
            .execute(&mut *tx)
            .await
            .map_err(|err| map_db_error(err, "comment"))?;

        tx.commit()
            .await
            .map_err(|err| map_db_error(err, "comment"))
    }

    async fn unlike_comment(&self, user_id: i64, comment_id: i64) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| map_db_error(err, "comment"))?;

        let deleted =
            sqlx::query("DELETE FROM comment_likes WHERE user_id = $1 AND comment_id = $2")
                .bind(user_id)
                .bind(comment_id)
                .execute(&mut *tx)
                .await
                .map_err(|err| map_db_error(err, "comment like"))?
                .rows_affected()
                > 0;

        if !deleted {
            tx.rollback()
                .await
                .map_err(|err| map_db_error(err, "comment"))?;
            return Ok(false);
        }

        sqlx::query(
            "UPDATE comments SET number_of_likes = GREATEST(number_of_likes - 1, 0) WHERE id = $1",
        )
        .bind(comment_id)
        .execute(&mut *tx)
        .await
        .map_err(|err| map_db_error(err, "comment"))?;

        tx.commit()
            .await
            .map_err(|err| map_db_error(err, "comment"))?;
        Ok(true)
    }
}

fn map_row_to_comment(row: CommentRow) -> Result<Comment, DomainError> {
    Comment::new(
        row.id,
        row.content,
        row.post_id,
        row.author_id,
        row.parent_id,
        row.number_of_likes,
        row.created_at,
    )
    .map_err(|err| DomainError::Unexpected(err.to_string()))
}
