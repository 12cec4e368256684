use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::{BookingLedger, BookingSink, BusySlotSource, ServiceCatalog};
use crate::models::{
    hhmm, Booking, BookingRequest, BookingStatus, BusySet, Master, Service, WorkingWindow,
};
use crate::services::scheduling::busy_grid;

/// Hosted catalog and bookings behind a PostgREST endpoint.
pub struct SupabaseStore {
    base_url: String,
    anon_key: String,
    window: WorkingWindow,
    client: reqwest::Client,
}

impl SupabaseStore {
    pub fn new(base_url: String, anon_key: String, window: WorkingWindow) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            window,
            client: reqwest::Client::new(),
        }
    }

    fn table_url(&self, table: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}/rest/v1/{table}", self.base_url)
        } else {
            format!("{}/rest/v1/{table}?{query}", self.base_url)
        }
    }

    fn cancel_request(&self, id: &str) -> reqwest::RequestBuilder {
        let url = self.table_url("bookings", "");
        by_id(self.client.patch(&url), id)
            .header("Prefer", "return=representation")
            .json(&json!({ "status": BookingStatus::Cancelled.as_str() }))
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
        what: &str,
    ) -> anyhow::Result<T> {
        let resp = self
            .authed(req)
            .send()
            .await
            .with_context(|| format!("failed to call Supabase ({what})"))?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .with_context(|| format!("failed to parse Supabase response ({what})"))?;

        if !status.is_success() {
            anyhow::bail!("{}", error_message(&data, status));
        }

        serde_json::from_value(data).with_context(|| format!("unexpected Supabase payload ({what})"))
    }
}

/// Row filter on `id`. The id travels as an encoded query value.
fn by_id(req: reqwest::RequestBuilder, id: &str) -> reqwest::RequestBuilder {
    req.query(&[("id", format!("eq.{id}"))])
}

/// PostgREST puts a human-readable reason in `message`.
fn error_message(data: &serde_json::Value, status: reqwest::StatusCode) -> String {
    data["message"]
        .as_str()
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("Supabase error ({status}): {data}"))
}

// ── Rows ──

#[derive(Debug, Deserialize)]
struct ServiceRow {
    id: serde_json::Value,
    name: String,
    description: Option<String>,
    price: f64,
    duration_minutes: u32,
    #[serde(default = "default_true")]
    is_active: bool,
    #[serde(default)]
    is_popular: bool,
}

fn default_true() -> bool {
    true
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        let id = match row.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Service {
            id,
            name: row.name,
            description: row.description,
            price: row.price.round() as i64,
            duration_minutes: row.duration_minutes,
            is_active: row.is_active,
            is_popular: row.is_popular,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BookingRow {
    id: serde_json::Value,
    service_id: serde_json::Value,
    booking_date: NaiveDate,
    booking_time: String,
    end_time: String,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

fn id_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

fn parse_timestamp(raw: Option<&str>) -> NaiveDateTime {
    raw.and_then(|s| {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc).naive_utc())
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok())
    })
    .unwrap_or_else(|| Utc::now().naive_utc())
}

impl TryFrom<BookingRow> for Booking {
    type Error = anyhow::Error;

    fn try_from(row: BookingRow) -> anyhow::Result<Self> {
        Ok(Booking {
            start_time: hhmm::parse(&row.booking_time)?,
            end_time: hhmm::parse(&row.end_time)?,
            created_at: parse_timestamp(row.created_at.as_deref()),
            status: row
                .status
                .as_deref()
                .map(BookingStatus::parse)
                .unwrap_or(BookingStatus::Pending),
            price: row.price.map(|p| p.round() as i64).unwrap_or(0),
            id: id_string(row.id),
            service_id: id_string(row.service_id),
            date: row.booking_date,
        })
    }
}

fn insert_body(request: &BookingRequest) -> serde_json::Value {
    json!({
        "service_id": request.service_id,
        "booking_date": request.date.format("%Y-%m-%d").to_string(),
        "booking_time": format!("{}:00", hhmm::format(&request.start_time)),
        "end_time": format!("{}:00", hhmm::format(&request.end_time)),
        "status": BookingStatus::Confirmed.as_str(),
        "price": request.price,
    })
}

// ── Collaborators ──

#[async_trait]
impl ServiceCatalog for SupabaseStore {
    async fn active_services(&self) -> anyhow::Result<Vec<Service>> {
        let url = self.table_url(
            "services",
            "select=*&is_active=eq.true&order=is_popular.desc,name.asc",
        );
        let rows: Vec<ServiceRow> = self.fetch(self.client.get(&url), "services").await?;
        tracing::info!(count = rows.len(), "services loaded from Supabase");
        Ok(rows.into_iter().map(Service::from).collect())
    }

    async fn master(&self) -> anyhow::Result<Option<Master>> {
        let url = self.table_url("masters", "select=name,description&limit=1");
        let rows: Vec<Master> = self.fetch(self.client.get(&url), "master").await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl BusySlotSource for SupabaseStore {
    async fn busy_slots(&self, date: NaiveDate) -> anyhow::Result<BusySet> {
        let url = self.table_url(
            "bookings",
            &format!(
                "select=booking_time,end_time&booking_date=eq.{}&status=neq.cancelled",
                date.format("%Y-%m-%d")
            ),
        );

        #[derive(Deserialize)]
        struct Span {
            booking_time: String,
            end_time: String,
        }

        let spans: Vec<Span> = self.fetch(self.client.get(&url), "busy slots").await?;
        let mut intervals = Vec::with_capacity(spans.len());
        for span in spans {
            intervals.push((hhmm::parse(&span.booking_time)?, hhmm::parse(&span.end_time)?));
        }
        Ok(busy_grid(intervals, self.window.interval_minutes))
    }
}

#[async_trait]
impl BookingSink for SupabaseStore {
    async fn create_booking(&self, request: &BookingRequest) -> anyhow::Result<Booking> {
        let url = self.table_url("bookings", "");
        let req = self
            .client
            .post(&url)
            .header("Prefer", "return=representation")
            .json(&insert_body(request));

        let rows: Vec<BookingRow> = self.fetch(req, "create booking").await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Supabase returned no booking row"))?;
        let booking = Booking::try_from(row)?;

        tracing::info!(booking_id = %booking.id, date = %booking.date, "booking created in Supabase");
        Ok(booking)
    }
}

#[async_trait]
impl BookingLedger for SupabaseStore {
    async fn recent_bookings(&self, limit: i64) -> anyhow::Result<Vec<Booking>> {
        let url = self.table_url(
            "bookings",
            &format!("select=*&order=created_at.desc&limit={limit}"),
        );
        let rows: Vec<BookingRow> = self.fetch(self.client.get(&url), "recent bookings").await?;
        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn find_booking(&self, id: &str) -> anyhow::Result<Option<Booking>> {
        let url = self.table_url("bookings", "select=*");
        let req = by_id(self.client.get(&url), id);
        let rows: Vec<BookingRow> = self.fetch(req, "find booking").await?;
        rows.into_iter().next().map(Booking::try_from).transpose()
    }

    async fn cancel_booking(&self, id: &str) -> anyhow::Result<bool> {
        let rows: Vec<serde_json::Value> = self
            .fetch(self.cancel_request(id), "cancel booking")
            .await?;
        Ok(!rows.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_table_url() {
        let store = SupabaseStore::new(
            "https://demo.supabase.co/".to_string(),
            "anon".to_string(),
            WorkingWindow::default(),
        );
        assert_eq!(
            store.table_url("services", "select=*"),
            "https://demo.supabase.co/rest/v1/services?select=*"
        );
        assert_eq!(
            store.table_url("bookings", ""),
            "https://demo.supabase.co/rest/v1/bookings"
        );
    }

    #[test]
    fn test_cancel_request_encodes_id() {
        let store = SupabaseStore::new(
            "https://demo.supabase.co".to_string(),
            "anon".to_string(),
            WorkingWindow::default(),
        );
        let request = store
            .cancel_request("b-1&status=eq.confirmed")
            .build()
            .unwrap();
        assert_eq!(request.method(), reqwest::Method::PATCH);
        assert_eq!(request.url().path(), "/rest/v1/bookings");

        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![("id".to_string(), "eq.b-1&status=eq.confirmed".to_string())]
        );
    }

    #[test]
    fn test_master_row() {
        let rows: Vec<Master> =
            serde_json::from_value(json!([{ "name": "Anna Smirnova", "description": null }]))
                .unwrap();
        assert_eq!(rows[0].name, "Anna Smirnova");
        assert_eq!(rows[0].description, None);
    }

    #[test]
    fn test_service_row_with_numeric_id() {
        let row: ServiceRow = serde_json::from_value(json!({
            "id": 7,
            "name": "Gel polish",
            "description": null,
            "price": 2200.0,
            "duration_minutes": 90,
            "is_popular": true
        }))
        .unwrap();
        let service = Service::from(row);
        assert_eq!(service.id, "7");
        assert_eq!(service.price, 2200);
        assert!(service.is_active);
        assert!(service.is_popular);
    }

    #[test]
    fn test_booking_row_parsing() {
        let row: BookingRow = serde_json::from_value(json!({
            "id": "b-1",
            "service_id": 2,
            "booking_date": "2024-09-03",
            "booking_time": "10:00:00",
            "end_time": "11:30:00",
            "price": 2200,
            "status": "confirmed",
            "created_at": "2024-09-02T09:15:00+00:00"
        }))
        .unwrap();
        let booking = Booking::try_from(row).unwrap();
        assert_eq!(booking.service_id, "2");
        assert_eq!(booking.start_time, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(booking.end_time, NaiveTime::from_hms_opt(11, 30, 0).unwrap());
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(
            booking.created_at,
            NaiveDate::from_ymd_opt(2024, 9, 2)
                .unwrap()
                .and_hms_opt(9, 15, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_insert_body_uses_seconds() {
        let request = BookingRequest {
            service_id: "1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 9, 3).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            price: 1500,
        };
        let body = insert_body(&request);
        assert_eq!(body["booking_time"], "10:00:00");
        assert_eq!(body["end_time"], "11:00:00");
        assert_eq!(body["status"], "confirmed");
    }

    #[test]
    fn test_error_message_prefers_message_field() {
        let data = json!({ "message": "duplicate key value violates unique constraint" });
        assert_eq!(
            error_message(&data, reqwest::StatusCode::CONFLICT),
            "duplicate key value violates unique constraint"
        );
        let bare = json!({});
        assert!(error_message(&bare, reqwest::StatusCode::BAD_GATEWAY).contains("502"));
    }
}
