use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::data::post_repository::{LikedPost, NewPost, PostRepository};
use crate::data::repositories::postgres::{map_db_error, map_like_db_error};
use crate::domain::error::DomainError;
use crate::domain::policy::filter::{CompiledFilter, PageRequest, PublishedScope};
use crate::domain::post::{Post, PostPatch};

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const POST_COLUMNS: &str = "id, title, content, author_id, is_published, number_of_likes, created_at";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    author_id: i64,
    is_published: bool,
    number_of_likes: i64,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct LikedPostRow {
    id: i64,
    title: String,
    content: String,
    author_id: i64,
    is_published: bool,
    number_of_likes: i64,
    created_at: DateTime<Utc>,
    liked_at: DateTime<Utc>,
}

/// WHERE clauses equivalent to `CompiledFilter::matches`. The listing
/// and the count query share this so the total always agrees with the
/// page contents.
fn push_filter_clauses(qb: &mut QueryBuilder<'_, Postgres>, filter: &CompiledFilter) {
    qb.push(" WHERE ");
    match filter.scope {
        PublishedScope::PublishedOnly => {
            qb.push("is_published = TRUE");
        }
        PublishedScope::OwnedUnpublishedOnly(user_id) => {
            qb.push("is_published = FALSE AND author_id = ");
            qb.push_bind(user_id);
        }
        PublishedScope::AllVisibleTo(Some(user_id)) => {
            qb.push("(is_published = TRUE OR author_id = ");
            qb.push_bind(user_id);
            qb.push(")");
        }
        PublishedScope::AllVisibleTo(None) => {
            qb.push("is_published = TRUE");
        }
        PublishedScope::Nothing => {
            qb.push("FALSE");
        }
    }

    if let Some(substr) = &filter.title_substr {
        qb.push(" AND title ILIKE ");
        qb.push_bind(like_pattern(substr));
    }
    if let Some(substr) = &filter.content_substr {
        qb.push(" AND content ILIKE ");
        qb.push_bind(like_pattern(substr));
    }
    if let Some(author_id) = filter.author_id {
        qb.push(" AND author_id = ");
        qb.push_bind(author_id);
    }
}

/// Substring match pattern with LIKE metacharacters escaped, so a
/// search for "100%" does not turn into a wildcard.
fn like_pattern(substr: &str) -> String {
    let escaped = substr
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            "INSERT INTO posts (title, content, author_id, is_published) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, title, content, author_id, is_published, number_of_likes, created_at",
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(input.author_id)
        .bind(input.is_published)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_db_error(err, "author"))?;

        map_row_to_post(row)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            "SELECT id, title, content, author_id, is_published, number_of_likes, created_at \
             FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| map_db_error(err, "post"))?;

        row.map(map_row_to_post).transpose()
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            "UPDATE posts \
             SET title = COALESCE($2, title), \
                 content = COALESCE($3, content), \
                 is_published = COALESCE($4, is_published) \
             WHERE id = $1 \
             RETURNING id, title, content, author_id, is_published, number_of_likes, created_at",
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.content)
        .bind(patch.is_published)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| map_db_error(err, "post"))?;

        row.map(map_row_to_post).transpose()
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| map_db_error(err, "post"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(
        &self,
        filter: &CompiledFilter,
        page: PageRequest,
    ) -> Result<Vec<Post>, DomainError> {
        let mut qb = QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM posts"));
        push_filter_clauses(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows: Vec<PostRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|err| map_db_error(err, "post"))?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn count_posts(&self, filter: &CompiledFilter) -> Result<i64, DomainError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM posts");
        push_filter_clauses(&mut qb, filter);

        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|err| map_db_error(err, "post"))
    }

    async fn post_like_exists(&self, user_id: i64, post_id: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM post_likes WHERE user_id = $1 AND post_id = $2)",
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_db_error(err, "post like"))
    }

    async fn like_post(&self, user_id: i64, post_id: i64) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| map_db_error(err, "post"))?;

        sqlx::query("INSERT INTO post_likes (user_id, post_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(|err| map_like_db_error(err, "post"))?;

        sqlx::query("UPDATE posts SET number_of_likes = number_of_likes + 1 WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(|err| map_db_error(err, "post"))?;

        tx.commit().await.map_err(|err| map_db_error(err, "post"))
    }

    async fn unlike_post(&self, user_id: i64, post_id: i64) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| map_db_error(err, "post"))?;

        let deleted = sqlx::query("DELETE FROM post_likes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(|err| map_db_error(err, "post like"))?
            .rows_affected()
            > 0;

        if !deleted {
            tx.rollback()
                .await
                .map_err(|err| map_db_error(err, "post"))?;
            return Ok(false);
        }

        sqlx::query(
            "UPDATE posts SET number_of_likes = GREATEST(number_of_likes - 1, 0) WHERE id = $1",
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await
        .map_err(|err| map_db_error(err, "post"))?;

        tx.commit()
            .await
            .map_err(|err| map_db_error(err, "post"))?;
        Ok(true)
    }

    async fn list_liked_posts(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<Vec<LikedPost>, DomainError> {
        let rows = sqlx::query_as::<_, LikedPostRow>(
            "SELECT p.id, p.title, p.content, p.author_id, p.is_published, \
                    p.number_of_likes, p.created_at, pl.created_at AS liked_at \
             FROM post_likes pl \
             JOIN posts p ON p.id = pl.post_id \
             WHERE pl.user_id = $1 \
             ORDER BY pl.created_at DESC, p.id DESC \
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|err| map_db_error(err, "post like"))?;

        rows.into_iter()
            .map(|row| {
                let liked_at = row.liked_at;
                let post = map_row_to_post(PostRow {
                    id: row.id,
                    title: row.title,
                    content: row.content,
                    author_id: row.author_id,
                    is_published: row.is_published,
                    number_of_likes: row.number_of_likes,
                    created_at: row.created_at,
                })?;
                Ok(LikedPost { post, liked_at })
            })
            .collect()
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    Post::new(
        row.id,
        row.title,
        row.content,
        row.author_id,
        row.is_published,
        row.number_of_likes,
        row.created_at,
    )
    .map_err(|err| DomainError::Unexpected(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("back\\slash"), "%back\\\\slash%");
        assert_eq!(like_pattern("plain"), "%plain%");
    }
}
