//! `/admin/donations`: donation ledger, totals and CSV export.

#[cfg(test)]
#[path = "donations_test.rs"]
mod donations_test;

use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use super::{ListQuery, contains_term, list_from, one_from, record_path};
use crate::error::ApiError;
use crate::models::{Donation, DonationType, PaymentMethod, Period};
use crate::net::client::{ApiClient, ApiRequest};

pub const DEFAULT_DONATION_PAGE_SIZE: u32 = 100;

const CSV_HEADER: [&str; 6] = ["Date", "Donor", "Amount", "Type", "Method", "Message"];

/// Server-side filters. `None` means "all".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DonationQuery {
    pub limit: u32,
    pub kind: Option<DonationType>,
    pub payment_method: Option<PaymentMethod>,
    pub period: Option<Period>,
}

impl Default for DonationQuery {
    fn default() -> Self {
        Self { limit: DEFAULT_DONATION_PAGE_SIZE, kind: None, payment_method: None, period: None }
    }
}

impl DonationQuery {
    fn filters(self) -> ListQuery {
        ListQuery::new()
            .set_opt("type", self.kind.map(DonationType::as_str))
            .set_opt("paymentMethod", self.payment_method.map(PaymentMethod::as_str))
            .set_opt("period", self.period.map(Period::as_str))
    }

    fn to_params(self) -> ListQuery {
        let mut params = ListQuery::new().set("limit", self.limit);
        for (key, value) in self.filters().into_pairs() {
            params = params.set(&key, value);
        }
        params
    }
}

/// Totals over the donations currently displayed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DonationSummary {
    pub count: usize,
    pub total: f64,
    pub one_time_total: f64,
    pub monthly_total: f64,
    pub average: f64,
}

impl DonationSummary {
    #[must_use]
    pub fn from_donations<'d>(donations: impl IntoIterator<Item = &'d Donation>) -> Self {
        let mut summary = Self::default();
        for donation in donations {
            summary.count += 1;
            summary.total += donation.amount;
            match donation.kind {
                DonationType::OneTime => summary.one_time_total += donation.amount,
                DonationType::Monthly => summary.monthly_total += donation.amount,
            }
        }
        if summary.count > 0 {
            #[allow(clippy::cast_precision_loss)]
            let count = summary.count as f64;
            summary.average = summary.total / count;
        }
        summary
    }
}

/// Case-insensitive match on donor name or message.
#[must_use]
pub fn search_donations<'d>(donations: &'d [Donation], term: &str) -> Vec<&'d Donation> {
    donations
        .iter()
        .filter(|d| contains_term(Some(&d.user_name), term) || contains_term(d.message.as_deref(), term))
        .collect()
}

#[must_use]
pub fn donation_type_label(kind: DonationType) -> &'static str {
    match kind {
        DonationType::OneTime => "One-time",
        DonationType::Monthly => "Monthly",
    }
}

#[must_use]
pub fn payment_method_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::CreditCard => "Credit card",
        PaymentMethod::Paypal => "PayPal",
        PaymentMethod::Tmoney => "T-Money",
        PaymentMethod::Flooz => "Flooz",
    }
}

fn display_timestamp(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    OffsetDateTime::parse(raw, &Rfc3339)
        .ok()
        .and_then(|ts| ts.format(format_description!("[day]/[month]/[year] [hour]:[minute]")).ok())
        .unwrap_or_else(|| raw.to_owned())
}

fn csv_cell(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Render the given donations as CSV, one quoted cell per column.
/// Anonymous donors are never named.
#[must_use]
pub fn donations_csv<'d>(donations: impl IntoIterator<Item = &'d Donation>) -> String {
    let mut lines = vec![CSV_HEADER.join(",")];
    for d in donations {
        let donor = if d.is_anonymous { "Anonymous" } else { d.user_name.as_str() };
        let row = [
            display_timestamp(d.created_at.as_deref()),
            donor.to_owned(),
            format!("{:.2} {}", d.amount, d.currency.as_deref().unwrap_or("FCFA")),
            donation_type_label(d.kind).to_owned(),
            payment_method_label(d.payment_method).to_owned(),
            d.message.clone().unwrap_or_default(),
        ];
        lines.push(row.iter().map(|cell| csv_cell(cell)).collect::<Vec<_>>().join(","));
    }
    lines.join("\n")
}

pub struct Donations<'a> {
    api: &'a ApiClient,
}

impl<'a> Donations<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn list(&self, query: DonationQuery) -> Result<Vec<Donation>, ApiError> {
        let request = ApiRequest::get("/admin/donations").query(query.to_params().into_pairs());
        list_from(self.api.send_value(request).await?, "donations")
    }

    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn get(&self, id: &str) -> Result<Donation, ApiError> {
        one_from(self.api.send_value(ApiRequest::get(record_path("/admin/donations", id)?)).await?, "donation")
    }

    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn stats(&self, period: Option<Period>) -> Result<Value, ApiError> {
        let params = ListQuery::new().set_opt("period", period.map(Period::as_str));
        self.api
            .send_value(ApiRequest::get("/admin/donations/stats").query(params.into_pairs()))
            .await
    }

    /// Server-rendered CSV for the filtered ledger, as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn export(&self, query: DonationQuery) -> Result<Vec<u8>, ApiError> {
        self.api
            .send_bytes(ApiRequest::get("/admin/donations/export").query(query.filters().into_pairs()))
            .await
    }
}
