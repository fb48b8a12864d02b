pub(crate) mod comment_repository;
pub(crate) mod post_repository;
pub(crate) mod user_repository;

use crate::domain::error::DomainError;

/// Postgres unique_violation.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres foreign_key_violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Shared mapping for errors that carry a SQLSTATE the domain cares
/// about: duplicates become AlreadyExists, broken references NotFound.
fn map_db_error(err: sqlx::Error, resource: &str) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return DomainError::AlreadyExists(resource.to_string()),
            Some(FOREIGN_KEY_VIOLATION) => return DomainError::NotFound(resource.to_string()),
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}

/// Like inserts lean on the composite primary key: a duplicate insert
/// fails fast on 23505 instead of an application-level existence check,
/// while a dangling target reference fails on 23503.
fn map_like_db_error(err: sqlx::Error, target: &str) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return DomainError::AlreadyExists(format!("like on {target}"));
            }
            Some(FOREIGN_KEY_VIOLATION) => return DomainError::NotFound(target.to_string()),
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}
