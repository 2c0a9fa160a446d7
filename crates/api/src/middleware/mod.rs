//! Request middleware: authentication and rate limiting.

pub mod auth;
pub mod rate_limit;

pub use auth::{AuthMember, auth_middleware};
pub use rate_limit::rate_limit_middleware;
