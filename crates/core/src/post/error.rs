//! Post validation errors.

use thiserror::Error;

use super::types::POST_TITLE_MAX_CHARS;

/// Why a post draft was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostError {
    /// Title is empty or whitespace.
    #[error("post title must not be empty")]
    TitleEmpty,

    /// Title exceeds the accepted length.
    #[error("post title is {length} characters, maximum is {max}", max = POST_TITLE_MAX_CHARS)]
    TitleTooLong {
        /// Actual title length in characters.
        length: usize,
    },

    /// Body is empty or whitespace.
    #[error("post body must not be empty")]
    BodyEmpty,

    /// Unknown category string from a client or the database.
    #[error("unknown post category: {0}")]
    UnknownCategory(String),
}
