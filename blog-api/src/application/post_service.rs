use tracing::debug;

use crate::data::post_repository::{LikedPost, NewPost, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::policy::Requester;
use crate::domain::policy::filter::{PageRequest, RawPostFilter, compile};
use crate::domain::policy::like::{LikeState, like, unlike};
use crate::domain::policy::ownership::authorize_mutation;
use crate::domain::policy::visibility::is_visible;
use crate::domain::post::{Post, PostDraft, PostPatch};

#[derive(Debug, Clone)]
pub(crate) struct PostPage {
    pub(crate) items: Vec<Post>,
    pub(crate) page: u32,
    pub(crate) size: u32,
    pub(crate) total: i64,
}

pub(crate) struct PostService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> PostService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    pub(crate) async fn create_post(
        &self,
        author_id: i64,
        draft: PostDraft,
    ) -> Result<Post, DomainError> {
        let draft = draft.validate()?;

        self.repo
            .create_post(NewPost {
                title: draft.title,
                content: draft.content,
                author_id,
                is_published: draft.is_published,
            })
            .await
    }

    pub(crate) async fn get_post(
        &self,
        id: i64,
        requester: Requester,
    ) -> Result<Post, DomainError> {
        self.visible_post(id, requester).await
    }

    /// Empty matches come back as an empty page; only infrastructure
    /// failures are errors here.
    pub(crate) async fn list_posts(
        &self,
        raw_filter: RawPostFilter,
        page: PageRequest,
        requester: Requester,
    ) -> Result<PostPage, DomainError> {
        let filter = compile(&raw_filter, requester);

        let items = self.repo.list_posts(&filter, page).await?;
        let total = self.repo.count_posts(&filter).await?;

        Ok(PostPage {
            items,
            page: page.page,
            size: page.size,
            total,
        })
    }

    pub(crate) async fn update_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
        patch: PostPatch,
    ) -> Result<Post, DomainError> {
        let patch = patch.validate()?;

        let post = self.visible_post(post_id, Some(actor_user_id)).await?;
        authorize_mutation(post.author_id, actor_user_id)?;

        if patch.is_empty() {
            return Ok(post);
        }

        self.repo
            .update_post(post_id, patch)
            .await?
            .ok_or_else(|| post_not_found(post_id))
    }

    pub(crate) async fn delete_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
    ) -> Result<(), DomainError> {
        let post = self.visible_post(post_id, Some(actor_user_id)).await?;
        authorize_mutation(post.author_id, actor_user_id)?;

        if !self.repo.delete_post(post_id).await? {
            return Err(post_not_found(post_id));
        }
        Ok(())
    }

    /// Any authenticated user may like a post they can see; a second
    /// like from the same user is a conflict. The toggle transition
    /// rejects double likes up front, with the composite primary key
    /// backing it under concurrent requests.
    pub(crate) async fn like_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
    ) -> Result<(), DomainError> {
        let post = self.visible_post(post_id, Some(actor_user_id)).await?;

        let current = self.like_state(actor_user_id, post_id).await?;
        let next = like(current, post.number_of_likes)?;
        debug!(post_id, state = ?next.state, counter = next.counter, "post like");

        self.repo.like_post(actor_user_id, post_id).await
    }

    pub(crate) async fn unlike_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
    ) -> Result<(), DomainError> {
        let post = self.visible_post(post_id, Some(actor_user_id)).await?;

        let current = self.like_state(actor_user_id, post_id).await?;
        let next = unlike(current, post.number_of_likes)?;
        debug!(post_id, state = ?next.state, counter = next.counter, "post unlike");

        if !self.repo.unlike_post(actor_user_id, post_id).await? {
            return Err(DomainError::NotFound(format!(
                "like on post id: {post_id}"
            )));
        }
        Ok(())
    }

    pub(crate) async fn liked_posts(
        &self,
        actor_user_id: i64,
        page: PageRequest,
    ) -> Result<Vec<LikedPost>, DomainError> {
        self.repo.list_liked_posts(actor_user_id, page).await
    }

    async fn like_state(&self, user_id: i64, post_id: i64) -> Result<LikeState, DomainError> {
        Ok(if self.repo.post_like_exists(user_id, post_id).await? {
            LikeState::Liked
        } else {
            LikeState::NotLiked
        })
    }

    /// Fetch gated by the visibility predicate. A hidden post produces
    /// the same NotFound as a missing row so existence never leaks.
    async fn visible_post(&self, post_id: i64, requester: Requester) -> Result<Post, DomainError> {
        let post = self
            .repo
            .get_post(post_id)
            .await?
            .ok_or_else(|| post_not_found(post_id))?;

        if !is_visible(&post.visibility(), requester) {
            return Err(post_not_found(post_id));
        }
        Ok(post)
    }
}

fn post_not_found(post_id: i64) -> DomainError {
    DomainError::NotFound(format!("post id: {post_id}"))
}
