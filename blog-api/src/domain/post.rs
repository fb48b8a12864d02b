use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::policy::visibility::PostVisibility;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) author_id: i64,
    pub(crate) is_published: bool,
    pub(crate) number_of_likes: i64,
    pub(crate) created_at: DateTime<Utc>,
}

/// Payload for creating a post; `is_published` is always explicit so a
/// draft never leaks by accident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PostDraft {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) is_published: bool,
}

impl PostDraft {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            content: normalize_content(&self.content)?,
            is_published: self.is_published,
        })
    }
}

/// Field-level partial update. Absent fields keep their current value;
/// present fields go through the same normalization as creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct PostPatch {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) is_published: Option<bool>,
}

impl PostPatch {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: self.title.as_deref().map(normalize_title).transpose()?,
            content: self.content.as_deref().map(normalize_content).transpose()?,
            is_published: self.is_published,
        })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.is_published.is_none()
    }
}

impl Post {
    pub(crate) fn new(
        id: i64,
        title: impl Into<String>,
        content: impl Into<String>,
        author_id: i64,
        is_published: bool,
        number_of_likes: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        validate_positive_i64("author_id", author_id)?;
        let title = normalize_title(&title.into())?;
        let content = normalize_content(&content.into())?;

        if number_of_likes < 0 {
            return Err(DomainError::Validation {
                field: "number_of_likes",
                message: "must be >= 0",
            });
        }

        Ok(Self {
            id,
            title,
            content,
            author_id,
            is_published,
            number_of_likes,
            created_at,
        })
    }

    pub(crate) fn visibility(&self) -> PostVisibility {
        PostVisibility {
            author_id: self.author_id,
            is_published: self.is_published,
        }
    }
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(())
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 100 {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..100 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() || content.chars().count() > 1000 {
        return Err(DomainError::Validation {
            field: "content",
            message: "must be 1..1000 chars",
        });
    }
    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{DomainError, Post, PostDraft, PostPatch};

    #[test]
    fn post_draft_validate_rejects_empty_title() {
        let draft = PostDraft {
            title: "   ".to_string(),
            content: "valid content".to_string(),
            is_published: true,
        };

        let err = draft.validate().expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn post_draft_validate_rejects_oversized_title() {
        let draft = PostDraft {
            title: "x".repeat(101),
            content: "valid content".to_string(),
            is_published: false,
        };

        let err = draft.validate().expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn post_draft_validate_normalizes_fields() {
        let draft = PostDraft {
            title: "  title  ".to_string(),
            content: "  content  ".to_string(),
            is_published: false,
        };

        let validated = draft.validate().expect("must validate");
        assert_eq!(validated.title, "title");
        assert_eq!(validated.content, "content");
        assert!(!validated.is_published);
    }

    #[test]
    fn post_patch_validate_skips_absent_fields() {
        let patch = PostPatch {
            title: None,
            content: Some("  body  ".to_string()),
            is_published: None,
        };

        let validated = patch.validate().expect("must validate");
        assert_eq!(validated.title, None);
        assert_eq!(validated.content.as_deref(), Some("body"));
    }

    #[test]
    fn post_patch_validate_rejects_present_empty_content() {
        let patch = PostPatch {
            title: None,
            content: Some("   ".to_string()),
            is_published: Some(true),
        };

        let err = patch.validate().expect_err("content must be rejected");
        assert_validation_field(err, "content");
    }

    #[test]
    fn post_patch_is_empty_only_when_all_fields_absent() {
        assert!(PostPatch::default().is_empty());
        assert!(
            !PostPatch {
                is_published: Some(true),
                ..PostPatch::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn post_new_rejects_negative_like_counter() {
        let err = Post::new(1, "Title", "Content", 10, true, -1, Utc::now())
            .expect_err("negative counter must fail");
        assert_validation_field(err, "number_of_likes");
    }

    #[test]
    fn post_new_normalizes_and_builds_post() {
        let post = Post::new(1, "  Title  ", "  Content  ", 10, false, 0, Utc::now())
            .expect("post should be created");

        assert_eq!(post.id, 1);
        assert_eq!(post.author_id, 10);
        assert_eq!(post.title, "Title");
        assert_eq!(post.content, "Content");
        assert!(!post.is_published);
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
