//! Upload acceptance policies per attachment kind.
//!
//! A [`PolicyCatalog`] holds one [`AttachmentPolicy`] per [`AttachmentKind`]
//! and is passed to the attachment service by value; there are no global
//! policy constants.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum accepted length of a client-supplied file name, in characters.
pub const ORIGINAL_NAME_MAX_CHARS: usize = 500;

/// Attachment category a post accepts, derived from the post's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    /// General documents and archives.
    File,
    /// Images only (photo posts).
    Image,
}

impl AttachmentKind {
    /// Convert to database string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Image => "image",
        }
    }
}

impl std::fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an upload was rejected.
///
/// Rejections are per-file and never abort a batch; the service records
/// them and continues with the remaining files.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// File name exceeds the accepted length.
    #[error("file name is {length} characters, maximum is {max}")]
    NameTooLong {
        /// Actual name length in characters.
        length: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// File extension is not in the policy's allowlist.
    #[error("extension '{extension}' is not allowed")]
    ExtensionNotAllowed {
        /// The offending extension (lowercased; empty if the name has none).
        extension: String,
    },

    /// File exceeds the policy's size ceiling.
    #[error("file size {size} bytes exceeds maximum {max} bytes")]
    FileTooLarge {
        /// Actual file size.
        size: u64,
        /// Maximum accepted size.
        max: u64,
    },
}

/// Acceptance limits for one attachment kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPolicy {
    allowed_extensions: BTreeSet<String>,
    max_size_bytes: u64,
    max_count: usize,
}

impl AttachmentPolicy {
    /// Default size ceiling: 10 MiB.
    pub const DEFAULT_MAX_SIZE_BYTES: u64 = 10 * 1024 * 1024;

    /// Creates a policy. Extensions are normalized to lowercase.
    #[must_use]
    pub fn new<I, S>(allowed_extensions: I, max_size_bytes: u64, max_count: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.as_ref().to_ascii_lowercase())
                .collect(),
            max_size_bytes,
            max_count,
        }
    }

    /// Maximum number of files accepted per request; excess entries are
    /// silently truncated, not rejected.
    #[must_use]
    pub const fn max_count(&self) -> usize {
        self.max_count
    }

    /// Maximum accepted file size in bytes.
    #[must_use]
    pub const fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Checks whether an extension is allowed (case-insensitive).
    #[must_use]
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions
            .contains(&extension.to_ascii_lowercase())
    }

    /// Validates one upload against this policy.
    ///
    /// Purely computes pass/fail plus the reason; no side effects.
    ///
    /// # Errors
    ///
    /// Returns the first failed check: name length, extension membership,
    /// then size ceiling.
    pub fn validate(&self, original_name: &str, size_bytes: u64) -> Result<(), ValidationError> {
        let length = original_name.chars().count();
        if length > ORIGINAL_NAME_MAX_CHARS {
            return Err(ValidationError::NameTooLong {
                length,
                max: ORIGINAL_NAME_MAX_CHARS,
            });
        }

        let extension = extension_of(original_name);
        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::ExtensionNotAllowed { extension });
        }

        if size_bytes > self.max_size_bytes {
            return Err(ValidationError::FileTooLarge {
                size: size_bytes,
                max: self.max_size_bytes,
            });
        }

        Ok(())
    }
}

/// Per-kind policy table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyCatalog {
    file: AttachmentPolicy,
    image: AttachmentPolicy,
}

impl PolicyCatalog {
    /// Default extensions for `File` posts.
    pub const FILE_EXTENSIONS: [&'static str; 11] = [
        "jpg", "jpeg", "png", "gif", "zip", "pdf", "doc", "docx", "xls", "xlsx", "txt",
    ];
    /// Default extensions for `Image` posts.
    pub const IMAGE_EXTENSIONS: [&'static str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];
    /// Default file count per request for `File` posts.
    pub const FILE_MAX_COUNT: usize = 5;
    /// Default file count per request for `Image` posts.
    pub const IMAGE_MAX_COUNT: usize = 10;

    /// Creates a catalog from explicit per-kind policies.
    #[must_use]
    pub const fn new(file: AttachmentPolicy, image: AttachmentPolicy) -> Self {
        Self { file, image }
    }

    /// Returns the policy for a kind.
    #[must_use]
    pub const fn policy(&self, kind: AttachmentKind) -> &AttachmentPolicy {
        match kind {
            AttachmentKind::File => &self.file,
            AttachmentKind::Image => &self.image,
        }
    }
}

impl Default for PolicyCatalog {
    fn default() -> Self {
        Self {
            file: AttachmentPolicy::new(
                Self::FILE_EXTENSIONS,
                AttachmentPolicy::DEFAULT_MAX_SIZE_BYTES,
                Self::FILE_MAX_COUNT,
            ),
            image: AttachmentPolicy::new(
                Self::IMAGE_EXTENSIONS,
                AttachmentPolicy::DEFAULT_MAX_SIZE_BYTES,
                Self::IMAGE_MAX_COUNT,
            ),
        }
    }
}

/// Extracts the extension from a file name, lowercased.
///
/// Returns an empty string when the name has no extension; an empty
/// extension never passes an allowlist check.
#[must_use]
pub fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn file_policy() -> AttachmentPolicy {
        PolicyCatalog::default().policy(AttachmentKind::File).clone()
    }

    #[rstest]
    #[case("report.pdf", "pdf")]
    #[case("archive.tar.GZ", "gz")]
    #[case("PHOTO.JPG", "jpg")]
    #[case("noext", "")]
    #[case(".hidden", "")]
    #[case("trailing.", "")]
    fn test_extension_of(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(extension_of(name), expected);
    }

    #[rstest]
    #[case("notes.txt", 1024, true)]
    #[case("NOTES.TXT", 1024, true)]
    #[case("malware.exe", 1024, false)]
    #[case("noextension", 1024, false)]
    fn test_extension_membership(#[case] name: &str, #[case] size: u64, #[case] ok: bool) {
        let result = file_policy().validate(name, size);
        assert_eq!(result.is_ok(), ok, "{name}: {result:?}");
    }

    #[test]
    fn test_name_length_boundary() {
        let policy = file_policy();

        let at_limit = format!("{}.txt", "a".repeat(ORIGINAL_NAME_MAX_CHARS - 4));
        assert!(policy.validate(&at_limit, 10).is_ok());

        let over_limit = format!("{}.txt", "a".repeat(ORIGINAL_NAME_MAX_CHARS));
        let err = policy.validate(&over_limit, 10).unwrap_err();
        assert!(matches!(err, ValidationError::NameTooLong { .. }));
    }

    #[test]
    fn test_name_length_counts_characters_not_bytes() {
        let policy = file_policy();
        // 500 multibyte characters plus the extension is still within the
        // character limit even though the byte length is far larger.
        let name = format!("{}.txt", "\u{c548}".repeat(ORIGINAL_NAME_MAX_CHARS - 4));
        assert!(name.len() > ORIGINAL_NAME_MAX_CHARS);
        assert!(policy.validate(&name, 10).is_ok());
    }

    #[test]
    fn test_size_ceiling_boundary() {
        let policy = AttachmentPolicy::new(["txt"], 1024, 5);
        assert!(policy.validate("a.txt", 1024).is_ok());
        let err = policy.validate("a.txt", 1025).unwrap_err();
        assert_eq!(
            err,
            ValidationError::FileTooLarge {
                size: 1025,
                max: 1024
            }
        );
    }

    #[test]
    fn test_validation_order_name_before_extension() {
        let policy = file_policy();
        let long_bad = format!("{}.exe", "a".repeat(600));
        assert!(matches!(
            policy.validate(&long_bad, 10).unwrap_err(),
            ValidationError::NameTooLong { .. }
        ));
    }

    #[test]
    fn test_catalog_kinds_differ() {
        let catalog = PolicyCatalog::default();
        assert!(catalog.policy(AttachmentKind::File).allows_extension("zip"));
        assert!(!catalog.policy(AttachmentKind::Image).allows_extension("zip"));
        assert!(catalog.policy(AttachmentKind::Image).allows_extension("webp"));
        assert_eq!(
            catalog.policy(AttachmentKind::File).max_count(),
            PolicyCatalog::FILE_MAX_COUNT
        );
        assert_eq!(
            catalog.policy(AttachmentKind::Image).max_count(),
            PolicyCatalog::IMAGE_MAX_COUNT
        );
    }
}
