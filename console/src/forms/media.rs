//! Forms for content records: audios, sermons, events and posts.

#[cfg(test)]
#[path = "media_test.rs"]
mod media_test;

use serde_json::{Value, json};

use super::{
    AUDIO_MAX_BYTES, FormMode, IMAGE_MAX_BYTES, PDF_MAX_BYTES, Upload, VIDEO_MAX_BYTES, ValidationErrors, limit_size,
    require_min_chars, require_present,
};
use crate::models::{AudioCategory, DailySummary, PostCategory, PostType};
use crate::net::client::MultipartBody;

const IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];
const VIDEO_TYPES: [&str; 4] = ["video/mp4", "video/quicktime", "video/x-msvideo", "video/avi"];

// =============================================================================
// AUDIO
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioForm {
    pub title: String,
    pub description: Option<String>,
    pub category: AudioCategory,
    pub audio: Option<Upload>,
    pub thumbnail: Option<Upload>,
}

impl AudioForm {
    /// # Errors
    ///
    /// Returns per-field messages for every violated rule.
    pub fn validate(&self, mode: FormMode) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_min_chars(&mut errors, "title", &self.title, 3, "Title");
        match &self.audio {
            Some(audio) => limit_size(&mut errors, "audio", audio, AUDIO_MAX_BYTES, "Audio file"),
            None if mode == FormMode::Create => errors.add("audio", "Please select an audio file"),
            None => {}
        }
        if let Some(thumbnail) = &self.thumbnail {
            limit_size(&mut errors, "thumbnail", thumbnail, IMAGE_MAX_BYTES, "Thumbnail");
        }
        errors.into_result()
    }

    /// Multipart body for `POST /audios`.
    #[must_use]
    pub fn to_multipart(&self) -> MultipartBody {
        let mut body = MultipartBody::new()
            .text("title", self.title.trim())
            .text("category", self.category.as_str())
            .text_opt("description", self.description.as_deref());
        if let Some(audio) = &self.audio {
            body = body.file("audio", audio.clone());
        }
        if let Some(thumbnail) = &self.thumbnail {
            body = body.file("thumbnail", thumbnail.clone());
        }
        body
    }

    /// JSON body for `PUT /audios/{id}`. Files are not re-uploaded on edit.
    #[must_use]
    pub fn to_update_json(&self) -> Value {
        json!({
            "title": self.title.trim(),
            "description": self.description.as_deref().map(str::trim).unwrap_or_default(),
            "category": self.category.as_str(),
        })
    }
}

// =============================================================================
// SERMON
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SermonForm {
    pub title: String,
    pub date: String,
    pub image: Option<Upload>,
    pub pdf: Option<Upload>,
}

impl SermonForm {
    /// # Errors
    ///
    /// Returns per-field messages for every violated rule.
    pub fn validate(&self, mode: FormMode) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_min_chars(&mut errors, "title", &self.title, 3, "Title");
        require_present(&mut errors, "date", &self.date, "Date");

        if let Some(image) = &self.image {
            limit_size(&mut errors, "image", image, IMAGE_MAX_BYTES, "Image");
        }
        if let Some(pdf) = &self.pdf {
            if !pdf.is_content_type(&["application/pdf"]) {
                errors.add("pdf", "Only PDF files are accepted");
            }
            limit_size(&mut errors, "pdf", pdf, PDF_MAX_BYTES, "PDF");
        }
        if mode == FormMode::Create && (self.image.is_none() || self.pdf.is_none()) {
            let field = if self.image.is_none() { "image" } else { "pdf" };
            errors.add(field, "Please select an image and a PDF file");
        }
        errors.into_result()
    }

    #[must_use]
    pub fn to_multipart(&self) -> MultipartBody {
        let mut body = MultipartBody::new()
            .text("title", self.title.trim())
            .text("date", self.date.trim());
        if let Some(image) = &self.image {
            body = body.file("image", image.clone());
        }
        if let Some(pdf) = &self.pdf {
            body = body.file("pdf", pdf.clone());
        }
        body
    }

    #[must_use]
    pub fn to_update_json(&self) -> Value {
        json!({ "title": self.title.trim(), "date": self.date.trim() })
    }
}

// =============================================================================
// EVENT
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventForm {
    pub title: String,
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub location: Option<String>,
    pub daily_summaries: Vec<DailySummary>,
    pub image: Option<Upload>,
}

impl EventForm {
    /// Events need no upload, so create and edit share one rule set.
    ///
    /// # Errors
    ///
    /// Returns per-field messages for every violated rule.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_min_chars(&mut errors, "title", &self.title, 3, "Title");
        require_present(&mut errors, "startDate", &self.start_date, "Start date");
        if let Some(image) = &self.image {
            limit_size(&mut errors, "image", image, IMAGE_MAX_BYTES, "Image");
        }
        errors.into_result()
    }

    /// Summaries with both a date and text; the rest are dropped on submit.
    #[must_use]
    pub fn complete_summaries(&self) -> Vec<&DailySummary> {
        self.daily_summaries.iter().filter(|s| s.is_complete()).collect()
    }

    /// Multipart body shared by `POST /events` and `PUT /events/{id}`.
    #[must_use]
    pub fn to_multipart(&self) -> MultipartBody {
        let mut body = MultipartBody::new()
            .text("title", self.title.trim())
            .text("startDate", self.start_date.trim())
            .text_opt("description", self.description.as_deref())
            .text_opt("endDate", self.end_date.as_deref())
            .text_opt("location", self.location.as_deref());

        if !self.daily_summaries.is_empty() {
            let summaries = Value::from(
                self.complete_summaries()
                    .into_iter()
                    .map(|s| json!({ "date": s.date.trim(), "summary": s.summary.trim() }))
                    .collect::<Vec<_>>(),
            );
            body = body.text("dailySummaries", summaries.to_string());
        }
        if let Some(image) = &self.image {
            body = body.file("image", image.clone());
        }
        body
    }
}

// =============================================================================
// POST
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostForm {
    pub content: String,
    pub kind: PostType,
    pub category: PostCategory,
    pub media: Option<Upload>,
}

impl PostForm {
    /// # Errors
    ///
    /// Returns per-field messages for every violated rule.
    pub fn validate(&self, mode: FormMode) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_min_chars(&mut errors, "content", &self.content, 10, "Content");

        match (&self.media, self.kind) {
            (Some(media), PostType::Image) => {
                limit_size(&mut errors, "media", media, IMAGE_MAX_BYTES, "File");
                if !media.is_content_type(&IMAGE_TYPES) {
                    errors.add("media", "Invalid file type. Use JPG, PNG or WEBP");
                }
            }
            (Some(media), PostType::Video) => {
                limit_size(&mut errors, "media", media, VIDEO_MAX_BYTES, "File");
                if !media.is_content_type(&VIDEO_TYPES) {
                    errors.add("media", "Invalid file type. Use MP4, MOV or AVI");
                }
            }
            (None, _) if mode == FormMode::Create => errors.add("media", "Please select a media file"),
            (None, _) => {}
        }
        errors.into_result()
    }

    #[must_use]
    pub fn to_multipart(&self) -> MultipartBody {
        let body = MultipartBody::new()
            .text("content", self.content.trim())
            .text("type", self.kind.as_str())
            .text("category", self.category.as_str());
        match &self.media {
            Some(media) => body.file("media", media.clone()),
            None => body,
        }
    }

    #[must_use]
    pub fn to_update_json(&self) -> Value {
        json!({
            "content": self.content.trim(),
            "type": self.kind.as_str(),
            "category": self.category.as_str(),
        })
    }
}
