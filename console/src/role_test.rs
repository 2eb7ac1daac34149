use super::*;

// =============================================================
// Ordering
// =============================================================

#[test]
fn hierarchy_is_admin_pasteur_media_user() {
    assert!(Role::Admin > Role::Pasteur);
    assert!(Role::Pasteur > Role::Media);
    assert!(Role::Media > Role::User);
}

#[test]
fn at_least_holds_for_every_dominating_pair() {
    for held in Role::ALL {
        for required in Role::ALL {
            assert_eq!(
                held.at_least(required),
                held >= required,
                "held={held} required={required}"
            );
        }
    }
}

#[test]
fn media_is_not_admin() {
    assert!(!Role::Media.at_least(Role::Admin));
    assert!(Role::Admin.at_least(Role::Media));
}

// =============================================================
// Parsing
// =============================================================

#[test]
fn parse_is_case_insensitive() {
    assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
    assert_eq!(Role::parse(" Pasteur "), Some(Role::Pasteur));
    assert_eq!(Role::parse("editor"), None);
}

#[test]
fn deserialize_unknown_role_ranks_lowest() {
    let role: Role = serde_json::from_str("\"superuser\"").unwrap();
    assert_eq!(role, Role::User);
    assert_eq!(role.rank(), 0);
}

#[test]
fn serialize_uses_lowercase_names() {
    assert_eq!(serde_json::to_string(&Role::Pasteur).unwrap(), "\"pasteur\"");
    let back: Role = serde_json::from_str("\"media\"").unwrap();
    assert_eq!(back, Role::Media);
}

#[test]
fn from_str_reports_unknown_names() {
    let err = "root".parse::<Role>().unwrap_err();
    assert!(err.contains("unknown role"));
}
