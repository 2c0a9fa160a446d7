//! Attachment/thumbnail reconciliation engine.
//!
//! Given a post's current set of stored attachments and a client-submitted
//! change request, this module computes which attachments to delete, which
//! to keep, and how the post's single thumbnail pointer transitions. It
//! also owns the companion path for ingesting newly uploaded files:
//!
//! - upload validation against per-kind policies (extension allowlist,
//!   size ceiling, name length)
//! - survivor set-diff deletion
//! - tri-state thumbnail transitions with referential-integrity checks
//! - partial-failure semantics: rejected files are skipped, I/O failures
//!   unwind the whole call

mod error;
mod policy;
mod service;
mod types;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod testkit;

pub use error::AttachmentError;
pub use policy::{
    AttachmentKind, AttachmentPolicy, ORIGINAL_NAME_MAX_CHARS, PolicyCatalog, ValidationError,
    extension_of,
};
pub use service::{AttachmentRepository, AttachmentService, AttachmentStore};
pub use types::{
    AddNewRequest, ApplyOutcome, Attachment, AttachmentUpdate, EditExistingRequest, IngestResult,
    NewAttachmentRecord, NewUpload, ReconcileResult, RejectedUpload, ThumbnailAction,
    ThumbnailAssociation,
};
