//! Member domain: registration validation and password hashing.

mod password;
mod registration;

pub use password::{PasswordError, hash_password, verify_password};
pub use registration::{
    NICKNAME_MAX_CHARS, NICKNAME_MIN_CHARS, PASSWORD_MIN_CHARS, RegistrationDraft,
    RegistrationError,
};
