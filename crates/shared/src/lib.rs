//! Shared types, errors, and configuration for Corkboard.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - JWT claims and token services

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{Claims, MemberRole, TokenPair};
pub use config::{AppConfig, StorageSettings};
pub use error::AppError;
pub use jwt::{JwtConfig, JwtService};
