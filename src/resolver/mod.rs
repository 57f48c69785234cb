//! Member resolution.
//!
//! Decides which declared members of a type take part in persistence:
//!
//! 1. every public member,
//! 2. plus every non-public member marked [`Marker::Include`] or
//!    [`Marker::Encrypt`],
//! 3. minus every member marked [`Marker::Ignore`], public or not.
//!
//! Properties come first, then fields, each group in declaration order. A
//! member declared twice under the same kind and name appears once, at its
//! first position.

use crate::member::{Marker, Member, MemberKind, Persistable, TypeDescriptor, Visibility};
use std::collections::HashSet;
use tracing::debug;

/// Whether `member` participates in persistence.
pub fn is_eligible<T>(member: &Member<T>) -> bool {
    if member.has_marker(Marker::Ignore) {
        return false;
    }
    match member.visibility() {
        Visibility::Public => true,
        Visibility::Private => {
            member.has_marker(Marker::Include) || member.has_marker(Marker::Encrypt)
        }
    }
}

/// Resolves the eligible members of `T` from a freshly built descriptor.
///
/// # Examples
///
/// ```
/// use native_store::member::{Marker, Persistable, TypeDescriptor, Visibility};
/// use native_store::resolver::resolve;
///
/// #[derive(Default)]
/// struct Account {
///     name: String,
///     cache: String,
///     token: String,
/// }
///
/// impl Persistable for Account {
///     const TYPE_NAME: &'static str = "Account";
///
///     fn describe() -> TypeDescriptor<Self> {
///         Self::descriptor()
///             .field("name", Visibility::Public, |a| &a.name, |a, v| a.name = v)
///             .field("cache", Visibility::Public, |a| &a.cache, |a, v| a.cache = v)
///             .marked(Marker::Ignore)
///             .field("token", Visibility::Private, |a| &a.token, |a, v| a.token = v)
///             .marked(Marker::Encrypt)
///     }
/// }
///
/// let names: Vec<_> = resolve::<Account>().iter().map(|m| m.name()).collect();
/// assert_eq!(names, vec!["name", "token"]);
/// ```
pub fn resolve<T: Persistable>() -> Vec<Member<T>> {
    resolve_descriptor(T::describe())
}

/// Resolves the eligible members listed in `descriptor`.
pub fn resolve_descriptor<T: 'static>(descriptor: TypeDescriptor<T>) -> Vec<Member<T>> {
    let type_name = descriptor.type_name();
    let declared = descriptor.into_members();
    let declared_count = declared.len();

    let (properties, fields): (Vec<_>, Vec<_>) = declared
        .into_iter()
        .partition(|member| member.kind() == MemberKind::Property);

    let mut seen = HashSet::new();
    let resolved: Vec<Member<T>> = properties
        .into_iter()
        .chain(fields)
        .filter(|member| seen.insert((member.kind(), member.name())))
        .filter(is_eligible)
        .collect();

    debug!(
        type_name,
        declared = declared_count,
        resolved = resolved.len(),
        "Resolved persistable members"
    );
    resolved
}
