//! Post categories and drafts.

use serde::{Deserialize, Serialize};

use super::error::PostError;
use crate::attachment::AttachmentKind;

/// Maximum accepted title length, in characters.
pub const POST_TITLE_MAX_CHARS: usize = 200;

/// Board section a post belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostCategory {
    /// Official announcements; managers only.
    Notice,
    /// General discussion.
    Community,
    /// Image posts with thumbnails.
    Photo,
    /// Questions to the board managers.
    Inquiry,
}

impl PostCategory {
    /// The attachment kind this category accepts: photo posts carry
    /// images, everything else carries general files.
    #[must_use]
    pub const fn attachment_kind(self) -> AttachmentKind {
        match self {
            Self::Photo => AttachmentKind::Image,
            Self::Notice | Self::Community | Self::Inquiry => AttachmentKind::File,
        }
    }

    /// Whether only managers may create, edit, or delete posts here.
    #[must_use]
    pub const fn requires_manager(self) -> bool {
        matches!(self, Self::Notice)
    }

    /// Returns the category name as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Notice => "notice",
            Self::Community => "community",
            Self::Photo => "photo",
            Self::Inquiry => "inquiry",
        }
    }
}

impl std::str::FromStr for PostCategory {
    type Err = PostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notice" => Ok(Self::Notice),
            "community" => Ok(Self::Community),
            "photo" => Ok(Self::Photo),
            "inquiry" => Ok(Self::Inquiry),
            other => Err(PostError::UnknownCategory(other.to_string())),
        }
    }
}

impl std::fmt::Display for PostCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-submitted post content, validated before persistence.
#[derive(Debug, Clone, Deserialize)]
pub struct PostDraft {
    /// Board section.
    pub category: PostCategory,
    /// Post title.
    pub title: String,
    /// Post body.
    pub body: String,
}

impl PostDraft {
    /// Validates the draft's title and body.
    ///
    /// # Errors
    ///
    /// Returns the first failed check: empty title, title length, then
    /// empty body.
    pub fn validate(&self) -> Result<(), PostError> {
        if self.title.trim().is_empty() {
            return Err(PostError::TitleEmpty);
        }
        let length = self.title.chars().count();
        if length > POST_TITLE_MAX_CHARS {
            return Err(PostError::TitleTooLong { length });
        }
        if self.body.trim().is_empty() {
            return Err(PostError::BodyEmpty);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn draft(title: &str, body: &str) -> PostDraft {
        PostDraft {
            category: PostCategory::Community,
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    #[rstest]
    #[case("hello", "world", None)]
    #[case("", "body", Some(PostError::TitleEmpty))]
    #[case("   ", "body", Some(PostError::TitleEmpty))]
    #[case("title", "", Some(PostError::BodyEmpty))]
    #[case("title", "  \n ", Some(PostError::BodyEmpty))]
    fn test_draft_validation(
        #[case] title: &str,
        #[case] body: &str,
        #[case] expected: Option<PostError>,
    ) {
        let result = draft(title, body).validate();
        match expected {
            None => assert!(result.is_ok()),
            Some(err) => assert_eq!(result.unwrap_err(), err),
        }
    }

    #[test]
    fn test_title_length_boundary() {
        assert!(draft(&"a".repeat(POST_TITLE_MAX_CHARS), "body")
            .validate()
            .is_ok());
        assert!(matches!(
            draft(&"a".repeat(POST_TITLE_MAX_CHARS + 1), "body")
                .validate()
                .unwrap_err(),
            PostError::TitleTooLong { .. }
        ));
    }

    #[test]
    fn test_category_attachment_kinds() {
        assert_eq!(PostCategory::Photo.attachment_kind(), AttachmentKind::Image);
        for category in [
            PostCategory::Notice,
            PostCategory::Community,
            PostCategory::Inquiry,
        ] {
            assert_eq!(category.attachment_kind(), AttachmentKind::File);
        }
    }

    #[test]
    fn test_only_notice_requires_manager() {
        assert!(PostCategory::Notice.requires_manager());
        assert!(!PostCategory::Community.requires_manager());
        assert!(!PostCategory::Photo.requires_manager());
        assert!(!PostCategory::Inquiry.requires_manager());
    }

    #[test]
    fn test_category_round_trip() {
        for category in [
            PostCategory::Notice,
            PostCategory::Community,
            PostCategory::Photo,
            PostCategory::Inquiry,
        ] {
            let parsed: PostCategory = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
        }
        assert!("gallery".parse::<PostCategory>().is_err());
    }
}
