//! Records exchanged with the REST backend.
//!
//! These mirror the backend's camelCase JSON. The console never checks
//! referential integrity; the server is the source of truth. Optional and
//! counter fields default when absent so partial payloads still decode.

#[cfg(test)]
#[path = "models_test.rs"]
mod models_test;

use serde::{Deserialize, Serialize};

use crate::role::Role;

// =============================================================================
// IDENTITY
// =============================================================================

/// The signed-in staff member as returned by `/auth/login` and `/auth/me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    pub role: Role,
}

/// A staff account as listed under `/admin/users`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    pub role: Role,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub needs_password_reset: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_logout: Option<String>,
}

// =============================================================================
// MEDIA
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCategory {
    Emission,
    Podcast,
    #[default]
    Teaching,
}

impl AudioCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Emission => "emission",
            Self::Podcast => "podcast",
            Self::Teaching => "teaching",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audio {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: AudioCategory,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub plays: u64,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub uploaded_by_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sermon {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One day's recap attached to a multi-day event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub summary: String,
}

impl DailySummary {
    /// Entries missing either half are dropped on submit.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.date.trim().is_empty() && !self.summary.trim().is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub daily_summaries: Vec<DailySummary>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    #[default]
    Image,
    Video,
}

impl PostType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostCategory {
    #[default]
    Pensee,
    Pasteur,
    Media,
}

impl PostCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pensee => "pensee",
            Self::Pasteur => "pasteur",
            Self::Media => "media",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub content: String,
    #[serde(default, rename = "type")]
    pub kind: PostType,
    #[serde(default)]
    pub category: PostCategory,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_role: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

// =============================================================================
// LIVE
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStatus {
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub live_title: Option<String>,
    #[serde(default)]
    pub live_youtube_url: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
}

// =============================================================================
// DONATIONS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DonationType {
    OneTime,
    Monthly,
}

impl DonationType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneTime => "oneTime",
            Self::Monthly => "monthly",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentMethod {
    CreditCard,
    Paypal,
    Tmoney,
    Flooz,
}

impl PaymentMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "creditCard",
            Self::Paypal => "paypal",
            Self::Tmoney => "tmoney",
            Self::Flooz => "flooz",
        }
    }
}

/// Reporting window accepted by the donations endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Period {
    Last7Days,
    Last30Days,
    Last90Days,
    ThisYear,
}

impl Period {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Last7Days => "7days",
            Self::Last30Days => "30days",
            Self::Last90Days => "90days",
            Self::ThisYear => "year",
        }
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7days" => Ok(Self::Last7Days),
            "30days" => Ok(Self::Last30Days),
            "90days" => Ok(Self::Last90Days),
            "year" => Ok(Self::ThisYear),
            other => Err(format!("unknown period `{other}` (expected 7days, 30days, 90days or year)")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: String,
    #[serde(default)]
    pub user_name: String,
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(rename = "type")]
    pub kind: DonationType,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}
