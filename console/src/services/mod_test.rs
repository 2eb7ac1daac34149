use serde_json::json;

use super::*;
use crate::models::Audio;

#[test]
fn list_query_skips_unselected_filters() {
    let query = ListQuery::new()
        .set("page", 2)
        .set("limit", 20)
        .set_opt("category", None::<&str>)
        .set_opt("role", Some("media"));
    assert_eq!(
        query.pairs(),
        &[
            ("page".to_owned(), "2".to_owned()),
            ("limit".to_owned(), "20".to_owned()),
            ("role".to_owned(), "media".to_owned()),
        ]
    );
}

#[test]
fn page_has_more_only_when_full() {
    assert!(Page::new(vec![1, 2], 1, 2).has_more);
    assert!(!Page::new(vec![1], 1, 2).has_more);
    assert!(!Page::<u8>::new(vec![], 1, 0).has_more);
}

#[test]
fn list_from_reads_envelope_or_bare_array() {
    let wrapped = json!({ "audios": [{ "id": "a", "title": "One" }] });
    let audios: Vec<Audio> = list_from(wrapped, "audios").unwrap();
    assert_eq!(audios[0].id, "a");

    let bare = json!([{ "id": "b", "title": "Two" }]);
    let audios: Vec<Audio> = list_from(bare, "audios").unwrap();
    assert_eq!(audios[0].id, "b");
}

#[test]
fn list_from_missing_key_errors() {
    let err = list_from::<Audio>(json!({ "items": [] }), "audios").unwrap_err();
    assert!(matches!(err, ApiError::MissingField("audios")));
}

#[test]
fn one_from_unwraps_or_falls_back() {
    let wrapped: Audio = one_from(json!({ "audio": { "id": "a", "title": "One" } }), "audio").unwrap();
    assert_eq!(wrapped.title, "One");
    let bare: Audio = one_from(json!({ "id": "b", "title": "Two" }), "audio").unwrap();
    assert_eq!(bare.title, "Two");
}

#[test]
fn contains_term_ignores_case_and_missing_values() {
    assert!(contains_term(Some("Youth Camp"), "camp"));
    assert!(!contains_term(None, "camp"));
    assert!(contains_term(Some("anything"), ""));
}

#[test]
fn record_path_keeps_id_in_one_segment() {
    assert_eq!(record_path("/audios", "a1").unwrap(), "/audios/a1");
    assert_eq!(record_path("/audios", "../admin/users").unwrap(), "/audios/..%2Fadmin%2Fusers");
    assert_eq!(record_path("/posts", "x?y#z").unwrap(), "/posts/x%3Fy%23z");
}

#[test]
fn record_path_rejects_dot_and_blank_ids() {
    for id in ["", "  ", ".", ".."] {
        assert!(matches!(record_path("/audios", id), Err(ApiError::InvalidId(_))), "{id:?}");
    }
}
