//! Error handling utilities for native-store.
//!
//! This module provides the central error type `StoreError`, which wraps the
//! three failure families of member conversion (`AccessError`,
//! `ConversionError`, `EncryptionError`) alongside configuration and I/O
//! failures, and the convenience alias `StoreResult`.
//!
//! No conversion error is retried or swallowed. The one documented exception
//! is encryption requested for a non-string value, which is skipped rather than
//! reported (see [`crate::convert`]).

use crate::member::DeclaredType;
use std::io;
use thiserror::Error;

/// Boxed error returned by user-supplied property accessors.
pub type AccessorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for property getters and setters registered on a
/// [`TypeDescriptor`](crate::member::TypeDescriptor).
pub type AccessorResult<T> = Result<T, AccessorError>;

/// A member's accessor could not be read or written.
///
/// # Examples
///
/// ```
/// use native_store::errors::AccessError;
///
/// let error = AccessError::ReadOnly {
///     type_name: "Account",
///     member: "display_name",
/// };
///
/// assert!(format!("{}", error).contains("read-only"));
/// assert!(format!("{}", error).contains("Account.display_name"));
/// ```
#[derive(Debug, Error)]
pub enum AccessError {
    /// The property has no setter.
    #[error("Member {type_name}.{member} is read-only and cannot be assigned")]
    ReadOnly {
        /// Name of the owning type
        type_name: &'static str,
        /// Name of the member
        member: &'static str,
    },

    /// The property getter faulted.
    #[error("Failed to read member {type_name}.{member}: {source}")]
    Getter {
        /// Name of the owning type
        type_name: &'static str,
        /// Name of the member
        member: &'static str,
        /// The error raised by the getter
        #[source]
        source: AccessorError,
    },

    /// The property setter faulted.
    #[error("Failed to write member {type_name}.{member}: {source}")]
    Setter {
        /// Name of the owning type
        type_name: &'static str,
        /// Name of the member
        member: &'static str,
        /// The error raised by the setter
        #[source]
        source: AccessorError,
    },
}

/// A transportable value could not be produced from, or coerced into, a
/// member's declared type.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The value does not match the declared type of the member.
    #[error("Cannot convert value for {type_name}.{member} to {expected}: {source}")]
    TypeMismatch {
        /// Name of the owning type
        type_name: &'static str,
        /// Name of the member
        member: &'static str,
        /// Declared type of the member
        expected: DeclaredType,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The value has no JSON form, such as a NaN or infinite float.
    #[error("Value of {type_name}.{member} cannot be represented as {expected} in a transportable value")]
    NotRepresentable {
        /// Name of the owning type
        type_name: &'static str,
        /// Name of the member
        member: &'static str,
        /// Declared type of the member
        expected: DeclaredType,
    },

    /// A list of nested objects was expected but the tree has another shape.
    #[error("Malformed list for {type_name}.{member}: expected a JSON array, found {found}")]
    MalformedList {
        /// Name of the owning type
        type_name: &'static str,
        /// Name of the member
        member: &'static str,
        /// Short description of the value found instead
        found: &'static str,
    },

    /// A nested object was expected but the tree has another shape.
    #[error("Malformed tree for {type_name}: expected a JSON object, found {found}")]
    MalformedTree {
        /// Name of the type being decoded
        type_name: &'static str,
        /// Short description of the value found instead
        found: &'static str,
    },

    /// A sealed string could not be decoded back into text.
    #[error("Sealed value for {type_name}.{member} is not valid: {reason}")]
    InvalidSealedValue {
        /// Name of the owning type
        type_name: &'static str,
        /// Name of the member
        member: &'static str,
        /// Why decoding failed
        reason: String,
    },

    /// Nested members go deeper than the engine allows.
    #[error("Nesting depth limit of {limit} exceeded while converting {type_name}. Self-referential object graphs are not supported.")]
    DepthExceeded {
        /// Name of the type at which the limit was hit
        type_name: &'static str,
        /// The configured limit
        limit: usize,
    },
}

/// Failures of a real cipher implementation.
///
/// The bundled [`Base64Cipher`](crate::crypto::Base64Cipher) never produces
/// these; they exist so an authenticated cipher can report tampering or a bad
/// key without changing the converter's signature.
///
/// # Examples
///
/// ```
/// use native_store::errors::EncryptionError;
///
/// let error = EncryptionError::Tampered;
/// assert!(format!("{}", error).contains("integrity"));
/// ```
#[derive(Debug, Error)]
pub enum EncryptionError {
    /// The key cannot be used with this cipher.
    #[error("Encryption key rejected: {0}")]
    InvalidKey(String),

    /// Authentication of the cipher text failed.
    #[error("Sealed value failed its integrity check")]
    Tampered,

    /// Any other cipher failure.
    #[error("Cipher failure: {0}")]
    Cipher(String),
}

/// Failure to open a sealed value.
#[derive(Debug, Error)]
pub enum DecryptError {
    /// The input was not produced by this cipher.
    #[error("{0}")]
    Malformed(String),

    /// The cipher itself failed.
    #[error(transparent)]
    Cipher(#[from] EncryptionError),
}

/// Represents all errors that native-store operations can produce.
///
/// # Examples
///
/// Creating a configuration error:
/// ```
/// use native_store::errors::StoreError;
///
/// let error = StoreError::Config("Encryption key cannot be empty".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Encryption key cannot be empty");
/// ```
///
/// Converting from an access error:
/// ```
/// use native_store::errors::{AccessError, StoreError};
///
/// let error: StoreError = AccessError::ReadOnly { type_name: "Account", member: "id" }.into();
/// assert!(matches!(error, StoreError::Access(_)));
/// ```
#[derive(Debug, Error)]
pub enum StoreError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors, only raised by the CLI.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A member accessor could not be read or written.
    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    /// A value could not be converted.
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// A cipher failure.
    #[error("Encryption error: {0}")]
    Encryption(#[from] EncryptionError),
}

/// A type alias for `Result<T, StoreError>`.
///
/// # Examples
///
/// ```
/// use native_store::errors::{StoreError, StoreResult};
///
/// fn check_key(key: &str) -> StoreResult<()> {
///     if key.is_empty() {
///         return Err(StoreError::Config("Encryption key cannot be empty".to_string()));
///     }
///     Ok(())
/// }
///
/// assert!(check_key("").is_err());
/// ```
pub type StoreResult<T> = Result<T, StoreError>;
