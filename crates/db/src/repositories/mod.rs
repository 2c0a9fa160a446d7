//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. All repositories except the attachment adapter own a
//! `DatabaseConnection`; the attachment adapter borrows any
//! `ConnectionTrait` so the engine can run inside a caller-supplied
//! transaction.

pub mod attachment;
pub mod comment;
pub mod member;
pub mod post;
pub mod reaction;
pub mod session;

pub use attachment::SeaAttachmentRepository;
pub use comment::CommentRepository;
pub use member::MemberRepository;
pub use post::PostRepository;
pub use reaction::{ReactionCounts, ReactionOutcome, ReactionRepository};
pub use session::SessionRepository;
