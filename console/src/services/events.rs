//! `/events`: church events with optional per-day summaries.

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use time::Date;
use time::macros::format_description;

use super::{ListQuery, Page, contains_term, list_from, one_from, record_path};
use crate::error::ApiError;
use crate::forms::EventForm;
use crate::models::Event;
use crate::net::client::{ApiClient, ApiRequest};

pub const DEFAULT_EVENT_PAGE_SIZE: u32 = 50;

/// Client-side time filter relative to today.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EventFilter {
    #[default]
    All,
    Upcoming,
    Past,
}

impl EventFilter {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Upcoming => "upcoming",
            Self::Past => "past",
        }
    }

    /// Upcoming events start after today; past events ended before today.
    /// An event without an end date ends on its start date.
    #[must_use]
    pub fn matches(self, event: &Event, today: Date) -> bool {
        match self {
            Self::All => true,
            Self::Upcoming => event_start(event).is_some_and(|start| start > today),
            Self::Past => event_end(event).is_some_and(|end| end < today),
        }
    }
}

impl fmt::Display for EventFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "upcoming" => Ok(Self::Upcoming),
            "past" => Ok(Self::Past),
            other => Err(format!("unknown event filter `{other}` (expected all, upcoming or past)")),
        }
    }
}

/// Calendar date of an ISO date or timestamp (`2025-06-01`, `2025-06-01T09:00:00Z`).
#[must_use]
pub fn parse_event_date(raw: &str) -> Option<Date> {
    let day = raw.trim().get(..10)?;
    Date::parse(day, format_description!("[year]-[month]-[day]")).ok()
}

fn event_start(event: &Event) -> Option<Date> {
    parse_event_date(&event.start_date)
}

fn event_end(event: &Event) -> Option<Date> {
    event.end_date.as_deref().and_then(parse_event_date).or_else(|| event_start(event))
}

/// Apply the time filter and search term, newest start date first.
#[must_use]
pub fn filter_events<'e>(events: &'e [Event], filter: EventFilter, term: &str, today: Date) -> Vec<&'e Event> {
    let mut matched: Vec<&Event> = events
        .iter()
        .filter(|event| {
            contains_term(Some(&event.title), term)
                || contains_term(event.description.as_deref(), term)
                || contains_term(event.location.as_deref(), term)
        })
        .filter(|event| filter.matches(event, today))
        .collect();
    matched.sort_by_key(|event| std::cmp::Reverse(event_start(event)));
    matched
}

/// Counts shown above the event list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventCounts {
    pub total: usize,
    pub upcoming: usize,
    pub past: usize,
}

#[must_use]
pub fn count_events(events: &[Event], today: Date) -> EventCounts {
    EventCounts {
        total: events.len(),
        upcoming: events.iter().filter(|e| EventFilter::Upcoming.matches(e, today)).count(),
        past: events.iter().filter(|e| EventFilter::Past.matches(e, today)).count(),
    }
}

pub struct Events<'a> {
    api: &'a ApiClient,
}

impl<'a> Events<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn list(&self, page: u32, limit: u32) -> Result<Page<Event>, ApiError> {
        let params = ListQuery::new().set("page", page).set("limit", limit);
        let body = self.api.send_value(ApiRequest::get("/events").query(params.into_pairs())).await?;
        Ok(Page::new(list_from(body, "events")?, page, limit))
    }

    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn get(&self, id: &str) -> Result<Event, ApiError> {
        one_from(self.api.send_value(ApiRequest::get(record_path("/events", id)?)).await?, "event")
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for invalid input, otherwise
    /// transport or status errors.
    pub async fn create(&self, form: &EventForm) -> Result<Value, ApiError> {
        form.validate()?;
        self.api.send_value(ApiRequest::post("/events").multipart(form.to_multipart())).await
    }

    /// Events are updated with the same multipart body they are created with.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for invalid input, otherwise
    /// transport or status errors.
    pub async fn update(&self, id: &str, form: &EventForm) -> Result<Value, ApiError> {
        form.validate()?;
        self.api
            .send_value(ApiRequest::put(record_path("/events", id)?).multipart(form.to_multipart()))
            .await
    }

    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn delete(&self, id: &str) -> Result<Value, ApiError> {
        self.api.send_value(ApiRequest::delete(record_path("/events", id)?)).await
    }
}
