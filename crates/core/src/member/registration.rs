//! Registration input validation.

use serde::Deserialize;
use thiserror::Error;

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN_CHARS: usize = 8;
/// Minimum accepted nickname length, in characters.
pub const NICKNAME_MIN_CHARS: usize = 2;
/// Maximum accepted nickname length, in characters.
pub const NICKNAME_MAX_CHARS: usize = 40;

/// Why a registration draft was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Email does not look like an address.
    #[error("email address is not valid")]
    InvalidEmail,

    /// Password shorter than the minimum.
    #[error("password must be at least {min} characters", min = PASSWORD_MIN_CHARS)]
    PasswordTooShort,

    /// Nickname outside the accepted length range.
    #[error(
        "nickname must be between {min} and {max} characters",
        min = NICKNAME_MIN_CHARS,
        max = NICKNAME_MAX_CHARS
    )]
    InvalidNickname,
}

/// Client-submitted registration input, validated before hashing or
/// persistence.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationDraft {
    /// Member email address.
    pub email: String,
    /// Plaintext password; hashed before storage.
    pub password: String,
    /// Display nickname.
    pub nickname: String,
}

impl RegistrationDraft {
    /// Validates email shape, password length, and nickname length.
    ///
    /// # Errors
    ///
    /// Returns the first failed check: email, password, then nickname.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        if !looks_like_email(&self.email) {
            return Err(RegistrationError::InvalidEmail);
        }
        if self.password.chars().count() < PASSWORD_MIN_CHARS {
            return Err(RegistrationError::PasswordTooShort);
        }
        let nickname_len = self.nickname.trim().chars().count();
        if !(NICKNAME_MIN_CHARS..=NICKNAME_MAX_CHARS).contains(&nickname_len) {
            return Err(RegistrationError::InvalidNickname);
        }
        Ok(())
    }
}

/// Shape check only: one `@` with a dotted domain behind it. Anything
/// stricter belongs to a confirmation mail flow.
fn looks_like_email(input: &str) -> bool {
    let Some((local, domain)) = input.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !input.contains(char::is_whitespace)
}
