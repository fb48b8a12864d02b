use tracing::debug;

use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::PostRepository;
use crate::domain::comment::{Comment, CommentDraft, CommentPatch};
use crate::domain::error::DomainError;
use crate::domain::policy::Requester;
use crate::domain::policy::filter::PageRequest;
use crate::domain::policy::like::{LikeState, like, unlike};
use crate::domain::policy::ownership::authorize_mutation;
use crate::domain::policy::visibility::is_visible;

pub(crate) struct CommentService<C: CommentRepository, P: PostRepository> {
    comments: C,
    posts: P,
}

impl<C: CommentRepository, P: PostRepository> CommentService<C, P> {
    pub(crate) fn new(comments: C, posts: P) -> Self {
        Self { comments, posts }
    }

    /// Any authenticated user may comment on a post they can see. A
    /// parent comment must belong to the same post - replies cannot
    /// cross post boundaries.
    pub(crate) async fn create_comment(
        &self,
        author_id: i64,
        post_id: i64,
        draft: CommentDraft,
    ) -> Result<Comment, DomainError> {
        let draft = draft.validate()?;
        self.require_visible_post(post_id, Some(author_id)).await?;

        if let Some(parent_id) = draft.parent_id {
            let parent = self
                .comments
                .get_comment(parent_id)
                .await?
                .ok_or_else(|| comment_not_found(parent_id))?;
            if parent.post_id != post_id {
                return Err(DomainError::Validation {
                    field: "parent_id",
                    message: "must reference a comment on the same post",
                });
            }
        }

        self.comments
            .create_comment(NewComment {
                content: draft.content,
                post_id,
                author_id,
                parent_id: draft.parent_id,
            })
            .await
    }

    pub(crate) async fn list_comments(
        &self,
        post_id: i64,
        page: PageRequest,
        requester: Requester,
    ) -> Result<Vec<Comment>, DomainError> {
        self.require_visible_post(post_id, requester).await?;
        self.comments.list_comments(post_id, page).await
    }

    pub(crate) async fn update_comment(
        &self,
        actor_user_id: i64,
        comment_id: i64,
        patch: CommentPatch,
    ) -> Result<Comment, DomainError> {
        let patch = patch.validate()?;

        let comment = self
            .comments
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| comment_not_found(comment_id))?;
        authorize_mutation(comment.author_id, actor_user_id)?;

        if patch.is_empty() {
            return Ok(comment);
        }

        self.comments
            .update_comment(comment_id, patch)
            .await?
            .ok_or_else(|| comment_not_found(comment_id))
    }

    pub(crate) async fn delete_comment(
        &self,
        actor_user_id: i64,
        comment_id: i64,
    ) -> Result<(), DomainError> {
        let comment = self
            .comments
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| comment_not_found(comment_id))?;
        authorize_mutation(comment.author_id, actor_user_id)?;

        if !self.comments.delete_comment(comment_id).await? {
            return Err(comment_not_found(comment_id));
        }
        Ok(())
    }

    pub(crate) async fn like_comment(
        &self,
        actor_user_id: i64,
        comment_id: i64,
    ) -> Result<(), DomainError> {
        let comment = self.visible_comment(comment_id, actor_user_id).await?;

        let current = self.like_state(actor_user_id, comment_id).await?;
        let next = like(current, comment.number_of_likes)?;
        debug!(comment_id, state = ?next.state, counter = next.counter, "comment like");

        self.comments.like_comment(actor_user_id, comment_id).await
    }

    pub(crate) async fn unlike_comment(
        &self,
        actor_user_id: i64,
        comment_id: i64,
    ) -> Result<(), DomainError> {
        let comment = self.visible_comment(comment_id, actor_user_id).await?;

        let current = self.like_state(actor_user_id, comment_id).await?;
        let next = unlike(current, comment.number_of_likes)?;
        debug!(comment_id, state = ?next.state, counter = next.counter, "comment unlike");

        if !self
            .comments
            .unlike_comment(actor_user_id, comment_id)
            .await?
        {
            return Err(DomainError::NotFound(format!(
                "like on comment id: {comment_id}"
            )));
        }
        Ok(())
    }

    async fn like_state(&self, user_id: i64, comment_id: i64) -> Result<LikeState, DomainError> {
        Ok(
            if self
                .comments
                .comment_like_exists(user_id, comment_id)
                .await?
            {
                LikeState::Liked
            } else {
                LikeState::NotLiked
            },
        )
    }

    /// A comment is only reachable when its post is; a comment on a
    /// hidden post reports the same NotFound as a missing comment.
    async fn visible_comment(
        &self,
        comment_id: i64,
        actor_user_id: i64,
    ) -> Result<Comment, DomainError> {
        let comment = self
            .comments
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| comment_not_found(comment_id))?;

        let post = self
            .posts
            .get_post(comment.post_id)
            .await?
            .ok_or_else(|| comment_not_found(comment_id))?;
        if !is_visible(&post.visibility(), Some(actor_user_id)) {
            return Err(comment_not_found(comment_id));
        }
        Ok(comment)
    }

    async fn require_visible_post(
        &self,
        post_id: i64,
        requester: Requester,
    ) -> Result<(), DomainError> {
        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| post_not_found(post_id))?;
        if !is_visible(&post.visibility(), requester) {
            return Err(post_not_found(post_id));
        }
        Ok(())
    }
}

fn comment_not_found(comment_id: i64) -> DomainError {
    DomainError::NotFound(format!("comment id: {comment_id}"))
}

fn post_not_found(post_id: i64) -> DomainError {
    DomainError::NotFound(format!("post id: {post_id}"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::CommentService;
    use crate::data::comment_repository::{CommentRepository, NewComment};
    use crate::data::post_repository::{LikedPost, NewPost, PostRepository};
    use crate::domain::comment::{Comment, CommentDraft, CommentPatch};
    use crate::domain::error::DomainError;
    use crate::domain::policy::filter::{CompiledFilter, PageRequest};
    use crate::domain::post::{Post, PostPatch};

    #[derive(Clone, Default)]
    struct FakeCommentRepo {
        comments: Arc<Mutex<HashMap<i64, Comment>>>,
        likes: Arc<Mutex<Vec<(i64, i64)>>>,
        next_id: Arc<Mutex<i64>>,
    }

    impl FakeCommentRepo {
        fn with_comment(self, comment: Comment) -> Self {
            self.comments
                .lock()
                .expect("comments mutex poisoned")
                .insert(comment.id, comment);
            self
        }

        fn counter(&self, comment_id: i64) -> i64 {
            self.comments
                .lock()
                .expect("comments mutex poisoned")
                .get(&comment_id)
                .expect("comment must exist")
                .number_of_likes
        }
    }

    #[async_trait]
    impl CommentRepository for FakeCommentRepo {
        async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
            let mut next_id = self.next_id.lock().expect("next_id mutex poisoned");
            *next_id += 1;
            let comment = Comment::new(
                *next_id,
                input.content,
                input.post_id,
                input.author_id,
                input.parent_id,
                0,
                Utc::now(),
            )
            .expect("fake comment must be valid");
            self.comments
                .lock()
                .expect("comments mutex poisoned")
                .insert(comment.id, comment.clone());
            Ok(comment)
        }

        async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
            Ok(self
                .comments
                .lock()
                .expect("comments mutex poisoned")
                .get(&id)
                .cloned())
        }

        async fn list_comments(
            &self,
            post_id: i64,
            _page: PageRequest,
        ) -> Result<Vec<Comment>, DomainError> {
            Ok(self
                .comments
                .lock()
                .expect("comments mutex poisoned")
                .values()
                .filter(|comment| comment.post_id == post_id)
                .cloned()
                .collect())
        }

        async fn update_comment(
            &self,
            id: i64,
            patch: CommentPatch,
        ) -> Result<Option<Comment>, DomainError> {
            let mut comments = self.comments.lock().expect("comments mutex poisoned");
            Ok(comments.get_mut(&id).map(|comment| {
                if let Some(content) = patch.content {
                    comment.content = content;
                }
                comment.clone()
            }))
        }

        async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
            Ok(self
                .comments
                .lock()
                .expect("comments mutex poisoned")
                .remove(&id)
                .is_some())
        }

        async fn comment_like_exists(
            &self,
            user_id: i64,
            comment_id: i64,
        ) -> Result<bool, DomainError> {
            Ok(self
                .likes
                .lock()
                .expect("likes mutex poisoned")
                .contains(&(user_id, comment_id)))
        }

        async fn like_comment(&self, user_id: i64, comment_id: i64) -> Result<(), DomainError> {
            let mut likes = self.likes.lock().expect("likes mutex poisoned");
            if likes.contains(&(user_id, comment_id)) {
                return Err(DomainError::AlreadyExists("like on comment".to_string()));
            }
            likes.push((user_id, comment_id));

            let mut comments = self.comments.lock().expect("comments mutex poisoned");
            if let Some(comment) = comments.get_mut(&comment_id) {
                comment.number_of_likes += 1;
            }
            Ok(())
        }

        async fn unlike_comment(&self, user_id: i64, comment_id: i64) -> Result<bool, DomainError> {
            let mut likes = self.likes.lock().expect("likes mutex poisoned");
            let before = likes.len();
            likes.retain(|like| *like != (user_id, comment_id));
            if likes.len() == before {
                return Ok(false);
            }

            let mut comments = self.comments.lock().expect("comments mutex poisoned");
            if let Some(comment) = comments.get_mut(&comment_id) {
                comment.number_of_likes = (comment.number_of_likes - 1).max(0);
            }
            Ok(true)
        }
    }

    #[derive(Clone, Default)]
    struct FakePostRepo {
        posts: Arc<Mutex<HashMap<i64, Post>>>,
    }

    impl FakePostRepo {
        fn with_post(self, post: Post) -> Self {
            self.posts
                .lock()
                .expect("posts mutex poisoned")
                .insert(post.id, post);
            self
        }
    }

    #[async_trait]
    impl PostRepository for FakePostRepo {
        async fn create_post(&self, _input: NewPost) -> Result<Post, DomainError> {
            unimplemented!("not used by comment tests")
        }

        async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
            Ok(self
                .posts
                .lock()
                .expect("posts mutex poisoned")
                .get(&id)
                .cloned())
        }

        async fn update_post(
            &self,
            _id: i64,
            _patch: PostPatch,
        ) -> Result<Option<Post>, DomainError> {
            unimplemented!("not used by comment tests")
        }

        async fn delete_post(&self, _id: i64) -> Result<bool, DomainError> {
            unimplemented!("not used by comment tests")
        }

        async fn list_posts(
            &self,
            _filter: &CompiledFilter,
            _page: PageRequest,
        ) -> Result<Vec<Post>, DomainError> {
            unimplemented!("not used by comment tests")
        }

        async fn count_posts(&self, _filter: &CompiledFilter) -> Result<i64, DomainError> {
            unimplemented!("not used by comment tests")
        }

        async fn post_like_exists(
            &self,
            _user_id: i64,
            _post_id: i64,
        ) -> Result<bool, DomainError> {
            unimplemented!("not used by comment tests")
        }

        async fn like_post(&self, _user_id: i64, _post_id: i64) -> Result<(), DomainError> {
            unimplemented!("not used by comment tests")
        }

        async fn unlike_post(&self, _user_id: i64, _post_id: i64) -> Result<bool, DomainError> {
            unimplemented!("not used by comment tests")
        }

        async fn list_liked_posts(
            &self,
            _user_id: i64,
            _page: PageRequest,
        ) -> Result<Vec<LikedPost>, DomainError> {
            unimplemented!("not used by comment tests")
        }
    }

    fn sample_post(id: i64, author_id: i64, is_published: bool) -> Post {
        Post::new(id, "Title", "Content", author_id, is_published, 0, Utc::now())
            .expect("sample post must be valid")
    }

    fn sample_comment(id: i64, post_id: i64, author_id: i64) -> Comment {
        Comment::new(id, "a comment", post_id, author_id, None, 0, Utc::now())
            .expect("sample comment must be valid")
    }

    fn service(
        comments: FakeCommentRepo,
        posts: FakePostRepo,
    ) -> CommentService<FakeCommentRepo, FakePostRepo> {
        CommentService::new(comments, posts)
    }

    #[tokio::test]
    async fn create_comment_on_visible_post_succeeds() {
        let posts = FakePostRepo::default().with_post(sample_post(1, 10, true));
        let service = service(FakeCommentRepo::default(), posts);

        let comment = service
            .create_comment(
                5,
                1,
                CommentDraft {
                    content: "  hello  ".to_string(),
                    parent_id: None,
                },
            )
            .await
            .expect("must create");

        assert_eq!(comment.content, "hello");
        assert_eq!(comment.post_id, 1);
        assert_eq!(comment.author_id, 5);
    }

    #[tokio::test]
    async fn create_comment_on_hidden_post_is_not_found() {
        let posts = FakePostRepo::default().with_post(sample_post(1, 10, false));
        let service = service(FakeCommentRepo::default(), posts);

        let err = service
            .create_comment(
                5,
                1,
                CommentDraft {
                    content: "hello".to_string(),
                    parent_id: None,
                },
            )
            .await
            .expect_err("hidden post must look missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn reply_parent_must_belong_to_the_same_post() {
        let posts = FakePostRepo::default()
            .with_post(sample_post(1, 10, true))
            .with_post(sample_post(2, 10, true));
        let comments = FakeCommentRepo::default().with_comment(sample_comment(50, 2, 5));
        let service = service(comments, posts);

        let err = service
            .create_comment(
                5,
                1,
                CommentDraft {
                    content: "reply".to_string(),
                    parent_id: Some(50),
                },
            )
            .await
            .expect_err("cross-post parent must be rejected");
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "parent_id",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn reply_to_parent_on_same_post_succeeds() {
        let posts = FakePostRepo::default().with_post(sample_post(1, 10, true));
        let comments = FakeCommentRepo::default().with_comment(sample_comment(50, 1, 5));
        let service = service(comments, posts);

        let reply = service
            .create_comment(
                6,
                1,
                CommentDraft {
                    content: "reply".to_string(),
                    parent_id: Some(50),
                },
            )
            .await
            .expect("same-post reply must succeed");
        assert_eq!(reply.parent_id, Some(50));
    }

    #[tokio::test]
    async fn update_comment_is_forbidden_for_non_author() {
        let posts = FakePostRepo::default().with_post(sample_post(1, 10, true));
        let comments = FakeCommentRepo::default().with_comment(sample_comment(50, 1, 5));
        let service = service(comments, posts);

        let err = service
            .update_comment(
                6,
                50,
                CommentPatch {
                    content: Some("edit".to_string()),
                },
            )
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));
    }

    #[tokio::test]
    async fn delete_comment_by_author_succeeds() {
        let posts = FakePostRepo::default().with_post(sample_post(1, 10, true));
        let comments = FakeCommentRepo::default().with_comment(sample_comment(50, 1, 5));
        let service = service(comments.clone(), posts);

        service.delete_comment(5, 50).await.expect("author deletes");
        assert!(
            comments
                .comments
                .lock()
                .expect("comments mutex poisoned")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn comment_like_toggle_mirrors_post_semantics() {
        let posts = FakePostRepo::default().with_post(sample_post(1, 10, true));
        let comments = FakeCommentRepo::default().with_comment(sample_comment(50, 1, 5));
        let service = service(comments.clone(), posts);

        service.like_comment(6, 50).await.expect("first like");
        assert_eq!(comments.counter(50), 1);

        let err = service.like_comment(6, 50).await.expect_err("double like");
        assert!(matches!(err, DomainError::AlreadyExists(_)));
        assert_eq!(comments.counter(50), 1);

        service.unlike_comment(6, 50).await.expect("unlike");
        let err = service.unlike_comment(6, 50).await.expect_err("no like");
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(comments.counter(50), 0);
    }

    #[tokio::test]
    async fn liking_a_comment_on_a_hidden_post_is_not_found() {
        let posts = FakePostRepo::default().with_post(sample_post(1, 10, false));
        let comments = FakeCommentRepo::default().with_comment(sample_comment(50, 1, 5));
        let service = service(comments, posts);

        let err = service.like_comment(6, 50).await.expect_err("hidden");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_comments_requires_post_visibility() {
        let posts = FakePostRepo::default().with_post(sample_post(1, 10, false));
        let comments = FakeCommentRepo::default().with_comment(sample_comment(50, 1, 5));
        let service = service(comments, posts);

        let err = service
            .list_comments(1, PageRequest { page: 0, size: 20 }, None)
            .await
            .expect_err("hidden post");
        assert!(matches!(err, DomainError::NotFound(_)));

        // The author can list their own hidden post's comments.
        let posts = FakePostRepo::default().with_post(sample_post(1, 10, false));
        let comments = FakeCommentRepo::default().with_comment(sample_comment(50, 1, 5));
        let service = CommentService::new(comments, posts);
        let items = service
            .list_comments(1, PageRequest { page: 0, size: 20 }, Some(10))
            .await
            .expect("author lists");
        assert_eq!(items.len(), 1);
    }
}
