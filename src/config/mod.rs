//! Configuration for native-store.
//!
//! The only setting is the process-wide default encryption key, consulted by
//! [`StoreResolver::new`](crate::StoreResolver::new) when no explicit key is
//! given.
//!
//! # Initialization order
//!
//! The process-wide options are set at most once. Either call
//! [`StoreOptions::install`] early in `main`, before any resolver is built, or
//! let the first call to [`StoreOptions::global`] load them from the
//! environment. Once set they never change.
//!
//! # Environment Variables
//!
//! - `NATIVE_STORE_ENCRYPTION_KEY`: default encryption key (falls back to a
//!   built-in value, which is fine only because the bundled cipher ignores the
//!   key)

use crate::constants::{DEFAULT_ENCRYPTION_KEY, ENV_VAR_ENCRYPTION_KEY};
use crate::crypto::EncryptionKey;
use crate::errors::{StoreError, StoreResult};
use std::env;
use std::fmt;
use once_cell::sync::OnceCell;
use tracing::debug;

static GLOBAL_OPTIONS: OnceCell<StoreOptions> = OnceCell::new();

/// Options shared by every resolver in the process.
///
/// # Examples
///
/// ```
/// use native_store::config::StoreOptions;
///
/// let options = StoreOptions::with_key("my-key").expect("valid key");
/// assert_eq!(options.encryption_key().expose(), "my-key");
/// ```
#[derive(Clone)]
pub struct StoreOptions {
    encryption_key: EncryptionKey,
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("encryption_key", &"[REDACTED]")
            .finish()
    }
}

impl StoreOptions {
    /// Builds options around an explicit key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if the key is empty or whitespace.
    pub fn with_key(key: impl Into<String>) -> StoreResult<Self> {
        Ok(Self {
            encryption_key: EncryptionKey::new(key)?,
        })
    }

    pub fn encryption_key(&self) -> &EncryptionKey {
        &self.encryption_key
    }

    /// Loads options from environment variables with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if `NATIVE_STORE_ENCRYPTION_KEY` is set but
    /// blank, or is not valid unicode.
    pub fn load() -> StoreResult<Self> {
        match env::var(ENV_VAR_ENCRYPTION_KEY) {
            Ok(key) => {
                debug!("Using encryption key from {}", ENV_VAR_ENCRYPTION_KEY);
                Self::with_key(key).map_err(|_| {
                    StoreError::Config(format!("{} is set but empty", ENV_VAR_ENCRYPTION_KEY))
                })
            }
            Err(env::VarError::NotPresent) => {
                debug!("No encryption key configured, using built-in default");
                Self::with_key(DEFAULT_ENCRYPTION_KEY)
            }
            Err(env::VarError::NotUnicode(_)) => Err(StoreError::Config(format!(
                "{} is not valid unicode",
                ENV_VAR_ENCRYPTION_KEY
            ))),
        }
    }

    /// Sets the process-wide options.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if options were already installed or
    /// already loaded by [`global`](StoreOptions::global).
    pub fn install(options: StoreOptions) -> StoreResult<()> {
        GLOBAL_OPTIONS.set(options).map_err(|_| {
            StoreError::Config("Store options are already initialized".to_string())
        })
    }

    /// Returns the process-wide options, loading them from the environment on
    /// first use.
    pub fn global() -> StoreResult<&'static StoreOptions> {
        if let Some(options) = GLOBAL_OPTIONS.get() {
            return Ok(options);
        }
        let loaded = Self::load()?;
        Ok(GLOBAL_OPTIONS.get_or_init(|| loaded))
    }
}
