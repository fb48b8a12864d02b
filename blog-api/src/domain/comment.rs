use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) parent_id: Option<i64>,
    pub(crate) number_of_likes: i64,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CommentDraft {
    pub(crate) content: String,
    pub(crate) parent_id: Option<i64>,
}

impl CommentDraft {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if let Some(parent_id) = self.parent_id
            && parent_id <= 0
        {
            return Err(DomainError::Validation {
                field: "parent_id",
                message: "must be > 0",
            });
        }
        Ok(Self {
            content: normalize_comment_content(&self.content)?,
            parent_id: self.parent_id,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CommentPatch {
    pub(crate) content: Option<String>,
}

impl CommentPatch {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            content: self
                .content
                .as_deref()
                .map(normalize_comment_content)
                .transpose()?,
        })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.content.is_none()
    }
}

impl Comment {
    pub(crate) fn new(
        id: i64,
        content: impl Into<String>,
        post_id: i64,
        author_id: i64,
        parent_id: Option<i64>,
        number_of_likes: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 || post_id <= 0 || author_id <= 0 {
            return Err(DomainError::Validation {
                field: "id",
                message: "ids must be > 0",
            });
        }
        if number_of_likes < 0 {
            return Err(DomainError::Validation {
                field: "number_of_likes",
                message: "must be >= 0",
            });
        }
        let content = normalize_comment_content(&content.into())?;

        Ok(Self {
            id,
            content,
            post_id,
            author_id,
            parent_id,
            number_of_likes,
            created_at,
        })
    }
}

fn normalize_comment_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() || content.chars().count() > 500 {
        return Err(DomainError::Validation {
            field: "content",
            message: "must be 1..500 chars",
        });
    }
    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{Comment, CommentDraft, CommentPatch, DomainError};

    #[test]
    fn comment_draft_validate_normalizes_content() {
        let draft = CommentDraft {
            content: "  hello  ".to_string(),
            parent_id: None,
        };

        let validated = draft.validate().expect("must validate");
        assert_eq!(validated.content, "hello");
    }

    #[test]
    fn comment_draft_validate_rejects_oversized_content() {
        let draft = CommentDraft {
            content: "x".repeat(501),
            parent_id: None,
        };

        assert!(matches!(
            draft.validate(),
            Err(DomainError::Validation {
                field: "content",
                ..
            })
        ));
    }

    #[test]
    fn comment_draft_validate_rejects_non_positive_parent() {
        let draft = CommentDraft {
            content: "hello".to_string(),
            parent_id: Some(0),
        };

        assert!(matches!(
            draft.validate(),
            Err(DomainError::Validation {
                field: "parent_id",
                ..
            })
        ));
    }

    #[test]
    fn comment_patch_with_no_fields_is_empty() {
        assert!(CommentPatch::default().is_empty());
    }

    #[test]
    fn comment_new_rejects_negative_counter() {
        let result = Comment::new(1, "hello", 2, 3, None, -1, Utc::now());
        assert!(result.is_err());
    }
}
