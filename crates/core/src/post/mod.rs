//! Post domain types and validation.
//!
//! Categories decide which attachment kind a post accepts and whether
//! managers alone may write it; drafts are validated before any
//! persistence happens.

mod error;
mod filter;
mod types;

pub use error::PostError;
pub use filter::PostSearchFilter;
pub use types::{POST_TITLE_MAX_CHARS, PostCategory, PostDraft};
