/*!
# native-store

native-store decides which members of an object are persisted and converts
their values to and from `serde_json::Value`, sealing string members on the
way out when asked to. The surrounding store that decides when to read or
write disk is not part of this crate.

## Core Features

- Member resolution combining visibility with `Include`, `Ignore` and
  `Encrypt` markers (`Ignore` always wins)
- Recursive conversion of nested objects through the same rules
- Encryption applied to every string of an object (class flag) or to single
  members (`Encrypt` marker)

**The bundled cipher is a reversible base64 encoding, not encryption.** See
[`crypto`] before relying on sealed values.

## Architecture

- `member`: member metadata, markers and the registration table
- `resolver`: which members are eligible, and in what order
- `convert`: reading and writing member values, nested objects, sealing
- `crypto`: the cipher seam and its placeholder implementation
- `config`: process-wide default encryption key
- `errors`: error types
- `logging`: tracing subscriber setup for binaries

## Usage Example

```rust
use native_store::member::{Marker, Persistable, TypeDescriptor, Visibility};
use native_store::StoreResolver;

#[derive(Debug, Default, PartialEq)]
struct Account {
    name: String,
    token: String,
}

impl Persistable for Account {
    const TYPE_NAME: &'static str = "Account";

    fn describe() -> TypeDescriptor<Self> {
        Self::descriptor()
            .field("name", Visibility::Public, |a| &a.name, |a, v| a.name = v)
            .field("token", Visibility::Private, |a| &a.token, |a, v| a.token = v)
            .marked(Marker::Encrypt)
    }
}

fn main() -> native_store::StoreResult<()> {
    let resolver = StoreResolver::new(Some("example-key"))?;
    let account = Account { name: "ada".into(), token: "secret".into() };

    let tree = resolver.encode(&account)?;
    assert_eq!(tree["token"], "c2VjcmV0");

    let restored: Account = resolver.decode(&tree)?;
    assert_eq!(restored, account);
    Ok(())
}
```
*/

/// Command-line interface for the `native-store` binary
pub mod cli;
/// Process-wide configuration
pub mod config;
/// Constants shared by the library and the binary
pub mod constants;
/// Reading and writing member values
pub mod convert;
/// Cipher seam and placeholder implementation
pub mod crypto;
/// Error types and utilities for error handling
pub mod errors;
/// Tracing subscriber initialization
pub mod logging;
/// Member metadata and registration
pub mod member;
/// Member eligibility and ordering
pub mod resolver;

// Re-export important types for convenience
pub use config::StoreOptions;
pub use convert::{ConvertContext, StoreResolver};
pub use crypto::{Base64Cipher, Cipher, EncryptionKey};
pub use errors::{StoreError, StoreResult};
pub use member::{DeclaredType, Marker, Member, MemberKind, Persistable, TypeDescriptor, Visibility};
