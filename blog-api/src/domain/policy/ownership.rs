use super::super::error::DomainError;

/// Mutation denied: the requester is not the author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Denied;

impl From<Denied> for DomainError {
    fn from(_: Denied) -> Self {
        DomainError::Forbidden
    }
}

/// Gate for update/delete on posts and comments alike. Call only after
/// the resource is known to exist and be visible; existence failures
/// must already have surfaced as NotFound. Likes are not gated here.
pub(crate) fn authorize_mutation(resource_author_id: i64, requester: i64) -> Result<(), Denied> {
    if resource_author_id == requester {
        Ok(())
    } else {
        Err(Denied)
    }
}

#[cfg(test)]
mod tests {
    use super::{Denied, authorize_mutation};

    #[test]
    fn author_may_mutate_own_resource() {
        assert_eq!(authorize_mutation(5, 5), Ok(()));
    }

    #[test]
    fn other_users_are_denied() {
        assert_eq!(authorize_mutation(5, 7), Err(Denied));
    }
}
