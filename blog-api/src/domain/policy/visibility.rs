use super::Requester;

/// The two post attributes visibility depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PostVisibility {
    pub(crate) author_id: i64,
    pub(crate) is_published: bool,
}

/// A post is visible iff it is published, or the requester is its
/// author. Both the fetch-by-id path and the listing WHERE clause must
/// agree with this function; a hidden post surfaces as NotFound, never
/// as Forbidden.
pub(crate) fn is_visible(post: &PostVisibility, requester: Requester) -> bool {
    post.is_published || requester == Some(post.author_id)
}

#[cfg(test)]
mod tests {
    use super::{PostVisibility, is_visible};

    fn post(author_id: i64, is_published: bool) -> PostVisibility {
        PostVisibility {
            author_id,
            is_published,
        }
    }

    #[test]
    fn published_posts_are_visible_to_everyone() {
        let p = post(10, true);
        assert!(is_visible(&p, None));
        assert!(is_visible(&p, Some(10)));
        assert!(is_visible(&p, Some(99)));
    }

    #[test]
    fn unpublished_posts_are_visible_only_to_their_author() {
        let p = post(10, false);
        assert!(!is_visible(&p, None));
        assert!(is_visible(&p, Some(10)));
        assert!(!is_visible(&p, Some(99)));
    }

    #[test]
    fn visibility_is_pure() {
        let p = post(7, false);
        assert_eq!(is_visible(&p, Some(7)), is_visible(&p, Some(7)));
        assert_eq!(is_visible(&p, Some(8)), is_visible(&p, Some(8)));
    }
}
