//! Comment domain types and validation.

use serde::Deserialize;
use thiserror::Error;

/// Maximum accepted comment length, in characters.
pub const COMMENT_BODY_MAX_CHARS: usize = 1000;

/// Why a comment draft was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommentError {
    /// Body is empty or whitespace.
    #[error("comment body must not be empty")]
    BodyEmpty,

    /// Body exceeds the accepted length.
    #[error("comment body is {length} characters, maximum is {max}", max = COMMENT_BODY_MAX_CHARS)]
    BodyTooLong {
        /// Actual body length in characters.
        length: usize,
    },
}

/// Client-submitted comment content, validated before persistence.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentDraft {
    /// Comment body.
    pub body: String,
}

impl CommentDraft {
    /// Validates the draft's body.
    ///
    /// # Errors
    ///
    /// Returns `BodyEmpty` for blank input and `BodyTooLong` past the
    /// character ceiling.
    pub fn validate(&self) -> Result<(), CommentError> {
        if self.body.trim().is_empty() {
            return Err(CommentError::BodyEmpty);
        }
        let length = self.body.chars().count();
        if length > COMMENT_BODY_MAX_CHARS {
            return Err(CommentError::BodyTooLong { length });
        }
        Ok(())
    }
}
