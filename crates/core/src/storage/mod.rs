//! Object storage for attachment bytes using Apache OpenDAL.
//!
//! Vendor-agnostic byte storage behind one operator:
//! - S3-compatible: Cloudflare R2, Supabase Storage, AWS S3, DigitalOcean Spaces
//! - Azure Blob Storage
//! - Local filesystem (development only)
//!
//! The [`StorageService`] implements the attachment engine's
//! [`AttachmentStore`](crate::attachment::AttachmentStore) port and adds the
//! read side used by downloads.

mod config;
mod error;
mod service;

pub use config::StorageProvider;
pub use error::StorageError;
pub use service::StorageService;
