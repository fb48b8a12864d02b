//! Post visibility and access policy.
//!
//! Pure decision logic shared by the single-resource and listing code
//! paths: who may see a post, how raw listing filters combine with the
//! requester's identity, who may mutate a resource, and how the
//! like/unlike toggle behaves. Nothing in this module touches the
//! database; the postgres repositories translate these values into SQL
//! and the tests here are the ground truth that translation must match.

pub(crate) mod filter;
pub(crate) mod like;
pub(crate) mod ownership;
pub(crate) mod visibility;

/// Authenticated user id, or `None` for an anonymous request.
pub(crate) type Requester = Option<i64>;
