//! Constants used throughout the crate.
//!
//! Configuration keys, defaults and limits live here so the library and the
//! `native-store` binary reference them consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "native-store";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str =
    "Member resolution, value conversion and string encryption for object persistence";

// Logging Configuration
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "warn";
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "native_store";
/// Name for the root tracing span covering a CLI invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";

// Configuration Keys & Environment Variables
/// Environment variable holding the process-wide default encryption key.
pub const ENV_VAR_ENCRYPTION_KEY: &str = "NATIVE_STORE_ENCRYPTION_KEY";
/// Key used when neither an explicit key nor the environment provides one.
pub const DEFAULT_ENCRYPTION_KEY: &str = "native-store-default-key";

// Conversion
/// Maximum depth of nested complex members walked by one conversion.
pub const MAX_NESTING_DEPTH: usize = 64;

// Messages
/// Printed by the CLI before every cipher operation.
pub const PLACEHOLDER_CIPHER_WARNING: &str =
    "warning: sealed values use a reversible encoding, not encryption. Do not rely on them for access control.";
