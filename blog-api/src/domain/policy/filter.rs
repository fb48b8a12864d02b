use super::Requester;
use super::visibility::{PostVisibility, is_visible};

/// Listing filters exactly as the client sent them, before the
/// requester's identity is taken into account.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawPostFilter {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) author_id: Option<i64>,
    pub(crate) is_published: Option<bool>,
}

/// Which published/unpublished slice of the posts table a compiled
/// filter may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PublishedScope {
    /// Published posts only, by any author.
    PublishedOnly,
    /// Unpublished posts owned by this user, nothing else.
    OwnedUnpublishedOnly(i64),
    /// Published posts by anyone, plus the requester's own unpublished
    /// posts when a requester is present.
    AllVisibleTo(Option<i64>),
    /// Matches no rows. Produced when the request asks for unpublished
    /// posts anonymously; a legitimate filter, not an error.
    Nothing,
}

/// Normalized, conflict-resolved query shape. Built fresh per request,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompiledFilter {
    pub(crate) title_substr: Option<String>,
    pub(crate) content_substr: Option<String>,
    pub(crate) author_id: Option<i64>,
    pub(crate) scope: PublishedScope,
}

/// Zero-based page plus page size; `offset = page * size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageRequest {
    pub(crate) page: u32,
    pub(crate) size: u32,
}

impl PageRequest {
    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub(crate) fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

/// Resolves raw filters against the requester's identity. Total: every
/// input compiles, including contradictory ones, which narrow to the
/// shape the caller's published-filter intent implies.
pub(crate) fn compile(raw: &RawPostFilter, requester: Requester) -> CompiledFilter {
    let (scope, author_id) = match raw.is_published {
        Some(true) => (PublishedScope::PublishedOnly, raw.author_id),
        Some(false) => match requester {
            // No anonymous requester may see unpublished content.
            None => (PublishedScope::Nothing, raw.author_id),
            // An author filter pointing at someone else contradicts the
            // unpublished filter; the requester's own id wins.
            Some(user_id) => (PublishedScope::OwnedUnpublishedOnly(user_id), Some(user_id)),
        },
        None => (PublishedScope::AllVisibleTo(requester), raw.author_id),
    };

    CompiledFilter {
        title_substr: raw.title.clone().filter(|s| !s.is_empty()),
        content_substr: raw.content.clone().filter(|s| !s.is_empty()),
        author_id,
        scope,
    }
}

impl CompiledFilter {
    /// Reference predicate for the filter: the SQL the repository
    /// builds from `self` must select exactly the posts this accepts.
    pub(crate) fn matches(&self, post: &PostRow) -> bool {
        if let Some(substr) = &self.title_substr
            && !contains_ci(&post.title, substr)
        {
            return false;
        }
        if let Some(substr) = &self.content_substr
            && !contains_ci(&post.content, substr)
        {
            return false;
        }
        if let Some(author_id) = self.author_id
            && post.author_id != author_id
        {
            return false;
        }

        let vis = PostVisibility {
            author_id: post.author_id,
            is_published: post.is_published,
        };
        match self.scope {
            PublishedScope::PublishedOnly => post.is_published,
            PublishedScope::OwnedUnpublishedOnly(user_id) => {
                !post.is_published && post.author_id == user_id
            }
            PublishedScope::AllVisibleTo(requester) => is_visible(&vis, requester),
            PublishedScope::Nothing => false,
        }
    }
}

/// The post attributes a filter can observe.
#[derive(Debug, Clone)]
pub(crate) struct PostRow {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) author_id: i64,
    pub(crate) is_published: bool,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
