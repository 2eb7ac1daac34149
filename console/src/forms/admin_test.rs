use super::*;

#[test]
fn invite_accepts_media_and_pasteur() {
    for role in [Role::Media, Role::Pasteur] {
        let form = InviteForm { email: "new@church.org".to_owned(), display_name: "Kofi".to_owned(), role };
        assert!(form.validate().is_ok(), "role={role}");
    }
}

#[test]
fn invite_rejects_admin_role_bad_email_and_short_name() {
    let form = InviteForm { email: "nope".to_owned(), display_name: "K".to_owned(), role: Role::Admin };
    let errors = form.validate().unwrap_err();
    assert_eq!(errors.get("email"), Some("Invalid email"));
    assert!(errors.get("displayName").is_some());
    assert!(errors.get("role").is_some());
}

#[test]
fn invite_json_uses_backend_field_names() {
    let form = InviteForm { email: " new@church.org ".to_owned(), display_name: "Kofi".to_owned(), role: Role::Media };
    let json = form.to_json();
    assert_eq!(json["email"], "new@church.org");
    assert_eq!(json["displayName"], "Kofi");
    assert_eq!(json["role"], "media");
}

#[test]
fn live_start_validates_title_and_url() {
    let form = LiveStartForm { title: "Live".to_owned(), youtube_url: "not a url".to_owned() };
    let errors = form.validate().unwrap_err();
    assert!(errors.get("liveTitle").is_some());
    assert_eq!(errors.get("liveYoutubeUrl"), Some("Invalid YouTube URL"));
}

#[test]
fn live_start_json_turns_broadcast_on() {
    let form = LiveStartForm {
        title: "Sunday worship".to_owned(),
        youtube_url: "https://youtube.com/live/abc".to_owned(),
    };
    assert!(form.validate().is_ok());
    assert_eq!(form.to_json()["isLive"], true);
}

#[test]
fn notification_defaults_are_valid() {
    assert!(NotificationForm::default().validate().is_ok());
}

#[test]
fn notification_body_needs_ten_characters() {
    let form = NotificationForm { title: "Live now".to_owned(), body: "Come".to_owned() };
    assert!(form.validate().unwrap_err().get("body").is_some());
}
