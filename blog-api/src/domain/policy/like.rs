use thiserror::Error;

use super::super::error::DomainError;

/// Per (user, target) like relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LikeState {
    NotLiked,
    Liked,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum LikeError {
    /// Liking twice is a conflict, not an idempotent upsert: like is a
    /// user-visible toggle.
    #[error("already liked")]
    AlreadyLiked,

    #[error("not liked")]
    NotLiked,
}

impl From<LikeError> for DomainError {
    fn from(err: LikeError) -> Self {
        match err {
            LikeError::AlreadyLiked => DomainError::AlreadyExists("like".to_string()),
            LikeError::NotLiked => DomainError::NotFound("like".to_string()),
        }
    }
}

/// State after a successful transition, with the target's new counter
/// value. The counter is a denormalized cache of count(likes) and must
/// be written in the same transaction as the like row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LikeTransition {
    pub(crate) state: LikeState,
    pub(crate) counter: i64,
}

pub(crate) fn like(state: LikeState, counter: i64) -> Result<LikeTransition, LikeError> {
    match state {
        LikeState::NotLiked => Ok(LikeTransition {
            state: LikeState::Liked,
            counter: counter + 1,
        }),
        LikeState::Liked => Err(LikeError::AlreadyLiked),
    }
}

pub(crate) fn unlike(state: LikeState, counter: i64) -> Result<LikeTransition, LikeError> {
    match state {
        // Floored at zero to contain counter drift.
        LikeState::Liked => Ok(LikeTransition {
            state: LikeState::NotLiked,
            counter: (counter - 1).max(0),
        }),
        LikeState::NotLiked => Err(LikeError::NotLiked),
    }
}

#[cfg(test)]
mod tests {
    use super::{LikeError, LikeState, like, unlike};

    #[test]
    fn like_from_not_liked_increments_counter() {
        let t = like(LikeState::NotLiked, 0).expect("must transition");
        assert_eq!(t.state, LikeState::Liked);
        assert_eq!(t.counter, 1);
    }

    #[test]
    fn double_like_is_a_conflict_and_leaves_counter_alone() {
        let t = like(LikeState::NotLiked, 0).expect("must transition");
        assert_eq!(like(t.state, t.counter), Err(LikeError::AlreadyLiked));
        assert_eq!(t.counter, 1);
    }

    #[test]
    fn unlike_from_liked_decrements_counter() {
        let t = unlike(LikeState::Liked, 1).expect("must transition");
        assert_eq!(t.state, LikeState::NotLiked);
        assert_eq!(t.counter, 0);
    }

    #[test]
    fn unlike_without_a_like_is_an_error() {
        assert_eq!(unlike(LikeState::NotLiked, 0), Err(LikeError::NotLiked));
    }

    #[test]
    fn counter_never_goes_negative() {
        // Drifted counter: a like row exists but the counter reads 0.
        let t = unlike(LikeState::Liked, 0).expect("must transition");
        assert_eq!(t.counter, 0);
    }

    #[test]
    fn counter_tracks_number_of_liking_users() {
        // Three users like, one unlikes; the counter equals the number
        // of users left in the Liked state.
        let mut counter = 0;
        for _ in 0..3 {
            counter = like(LikeState::NotLiked, counter)
                .expect("must transition")
                .counter;
        }
        counter = unlike(LikeState::Liked, counter)
            .expect("must transition")
            .counter;
        assert_eq!(counter, 2);
    }
}
