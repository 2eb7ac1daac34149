//! Forms for administrative actions: invitations and live broadcasts.

#[cfg(test)]
#[path = "admin_test.rs"]
mod admin_test;

use serde_json::{Value, json};

use super::{ValidationErrors, is_valid_email, is_valid_url, require_min_chars};
use crate::role::Role;

pub const DEFAULT_NOTIFICATION_TITLE: &str = "🔴 LIVE NOW!";
pub const DEFAULT_NOTIFICATION_BODY: &str = "Join us now for the live service";

/// Invitation of a new staff member. Only pasteur and media accounts can be
/// invited; admins are provisioned out of band.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InviteForm {
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl InviteForm {
    /// # Errors
    ///
    /// Returns per-field messages for every violated rule.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !is_valid_email(&self.email) {
            errors.add("email", "Invalid email");
        }
        require_min_chars(&mut errors, "displayName", &self.display_name, 2, "Name");
        if !matches!(self.role, Role::Pasteur | Role::Media) {
            errors.add("role", "Role must be pasteur or media");
        }
        errors.into_result()
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "email": self.email.trim(),
            "displayName": self.display_name.trim(),
            "role": self.role.as_str(),
        })
    }
}

/// Details required to go live.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LiveStartForm {
    pub title: String,
    pub youtube_url: String,
}

impl LiveStartForm {
    /// # Errors
    ///
    /// Returns per-field messages for every violated rule.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_min_chars(&mut errors, "liveTitle", &self.title, 5, "Title");
        if !is_valid_url(&self.youtube_url) {
            errors.add("liveYoutubeUrl", "Invalid YouTube URL");
        }
        errors.into_result()
    }

    /// Body for `PUT /admin/live/status` switching the broadcast on.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "isLive": true,
            "liveTitle": self.title.trim(),
            "liveYoutubeUrl": self.youtube_url.trim(),
        })
    }
}

/// Push notification announcing the running broadcast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationForm {
    pub title: String,
    pub body: String,
}

impl Default for NotificationForm {
    fn default() -> Self {
        Self { title: DEFAULT_NOTIFICATION_TITLE.to_owned(), body: DEFAULT_NOTIFICATION_BODY.to_owned() }
    }
}

impl NotificationForm {
    /// # Errors
    ///
    /// Returns per-field messages for every violated rule.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_min_chars(&mut errors, "title", &self.title, 5, "Title");
        require_min_chars(&mut errors, "body", &self.body, 10, "Message");
        errors.into_result()
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({ "title": self.title.trim(), "body": self.body.trim() })
    }
}
