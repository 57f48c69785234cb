use native_store::errors::AccessorResult;
use native_store::member::{Marker, MemberKind, Persistable, TypeDescriptor, Visibility};
use native_store::resolver::{is_eligible, resolve};

#[derive(Default)]
struct Settings {
    theme: String,
    width: u32,
    history: Vec<String>,
    secret: String,
    scratch: String,
    session: String,
}

impl Settings {
    fn label(&self) -> AccessorResult<String> {
        Ok(format!("{}@{}", self.theme, self.width))
    }
}

impl Persistable for Settings {
    const TYPE_NAME: &'static str = "Settings";

    fn describe() -> TypeDescriptor<Self> {
        Self::descriptor()
            .field("theme", Visibility::Public, |s| &s.theme, |s, v| s.theme = v)
            .field("width", Visibility::Private, |s| &s.width, |s, v| s.width = v)
            .marked(Marker::Include)
            .field("history", Visibility::Private, |s| &s.history, |s, v| s.history = v)
            .field("secret", Visibility::Private, |s| &s.secret, |s, v| s.secret = v)
            .marked(Marker::Encrypt)
            .field("scratch", Visibility::Public, |s| &s.scratch, |s, v| s.scratch = v)
            .marked(Marker::Ignore)
            .field("session", Visibility::Private, |s| &s.session, |s, v| s.session = v)
            .marked(Marker::Include)
            .marked(Marker::Ignore)
            .read_only_property("label", Visibility::Public, Settings::label)
    }
}

fn names<T: Persistable>() -> Vec<&'static str> {
    resolve::<T>().iter().map(|m| m.name()).collect()
}

#[test]
fn test_resolves_expected_members_in_order() {
    assert_eq!(names::<Settings>(), vec!["label", "theme", "width", "secret"]);
}

#[test]
fn test_properties_precede_fields() {
    let members = resolve::<Settings>();
    let first_field = members
        .iter()
        .position(|m| m.kind() == MemberKind::Field)
        .unwrap();
    assert!(members[..first_field]
        .iter()
        .all(|m| m.kind() == MemberKind::Property));
    assert!(members[first_field..]
        .iter()
        .all(|m| m.kind() == MemberKind::Field));
}

#[test]
fn test_every_resolved_member_is_eligible() {
    let described = Settings::describe();
    let resolved = resolve::<Settings>();

    for member in described.members() {
        let expected = resolved.iter().any(|m| m.name() == member.name());
        assert_eq!(is_eligible(member), expected, "member {}", member.name());
    }
}

#[test]
fn test_ignore_wins_over_include() {
    let resolved = names::<Settings>();
    assert!(!resolved.contains(&"session"));
    assert!(!resolved.contains(&"scratch"));
}

#[test]
fn test_private_unmarked_member_is_excluded() {
    assert!(!names::<Settings>().contains(&"history"));
}

#[test]
fn test_resolution_is_stable() {
    assert_eq!(names::<Settings>(), names::<Settings>());
}

#[test]
fn test_type_without_members() {
    #[derive(Default)]
    struct Empty;

    impl Persistable for Empty {
        const TYPE_NAME: &'static str = "Empty";

        fn describe() -> TypeDescriptor<Self> {
            Self::descriptor()
        }
    }

    assert!(resolve::<Empty>().is_empty());
}
