//! Sealing of string member values.
//!
//! **The bundled [`Base64Cipher`] is not encryption.** It is a reversible
//! encoding of the UTF-8 bytes that ignores the key entirely. Anyone holding a
//! sealed value can read it. It exists so that the converter's encryption
//! decision tree can be exercised end to end; callers that need
//! confidentiality must install an authenticated cipher through
//! [`StoreResolver::with_cipher`](crate::StoreResolver::with_cipher).
//!
//! A [`Cipher`] takes text and returns text. Null handling lives in the
//! converter: `null` transportable values never reach the cipher.

use crate::errors::{DecryptError, EncryptionError, StoreError, StoreResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt;
use zeroize::Zeroizing;

/// Secret used to key a [`Cipher`].
///
/// The key material is zeroized when the value is dropped and never shown by
/// `Debug`.
#[derive(Clone)]
pub struct EncryptionKey(Zeroizing<String>);

impl EncryptionKey {
    /// Wraps `key`, rejecting empty or whitespace-only input.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` when the key is blank.
    pub fn new(key: impl Into<String>) -> StoreResult<Self> {
        let key = Zeroizing::new(key.into());
        if key.trim().is_empty() {
            return Err(StoreError::Config(
                "Encryption key cannot be empty".to_string(),
            ));
        }
        Ok(Self(key))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey([REDACTED])")
    }
}

/// String-in, string-out encryption strategy.
///
/// Implementations must be reversible: `decrypt(encrypt(s, k), k) == s`.
pub trait Cipher: Send + Sync {
    /// Seals `plain_text`.
    fn encrypt(&self, plain_text: &str, key: &EncryptionKey) -> Result<String, EncryptionError>;

    /// Opens a value produced by [`encrypt`](Cipher::encrypt).
    ///
    /// `DecryptError::Malformed` means `sealed` is not something this cipher
    /// could have produced; the converter reports it as a conversion error.
    fn decrypt(&self, sealed: &str, key: &EncryptionKey) -> Result<String, DecryptError>;
}

/// Placeholder cipher: standard base64 over the UTF-8 bytes. The key is unused.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Cipher;

impl Cipher for Base64Cipher {
    fn encrypt(&self, plain_text: &str, _key: &EncryptionKey) -> Result<String, EncryptionError> {
        Ok(STANDARD.encode(plain_text.as_bytes()))
    }

    fn decrypt(&self, sealed: &str, _key: &EncryptionKey) -> Result<String, DecryptError> {
        let bytes = STANDARD
            .decode(sealed)
            .map_err(|err| DecryptError::Malformed(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| DecryptError::Malformed(err.to_string()))
    }
}
