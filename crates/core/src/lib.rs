//! Core business logic for Corkboard.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `attachment` - Attachment/thumbnail reconciliation engine
//! - `comment` - Comment domain types and validation
//! - `member` - Password hashing and registration validation
//! - `post` - Post categories, drafts, and search filters
//! - `ratelimit` - Fixed-window request rate limiting
//! - `storage` - Vendor-agnostic object storage via OpenDAL

pub mod attachment;
pub mod comment;
pub mod member;
pub mod post;
pub mod ratelimit;
pub mod storage;
