use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{hhmm, Booking, Service};
use crate::services::collaborators::UsageStats;
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: i64 = 50;
const MAX_SERVICE_MINUTES: u32 = 24 * 60;

#[allow(clippy::result_large_err)]
fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), Response> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized.into_response());
    }
    Ok(())
}

fn internal(e: anyhow::Error) -> Response {
    AppError::Internal(e).into_response()
}

// GET /api/admin/stats
#[derive(Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    usage: UsageStats,
    active_sessions: usize,
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, Response> {
    check_auth(&headers, &state.config.admin_token)?;

    let usage = state.counters.snapshot().await.map_err(internal)?;
    let active_sessions = state.sessions.len().map_err(|e| e.into_response())?;

    Ok(Json(StatsResponse {
        usage,
        active_sessions,
    }))
}

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct BookingResponse {
    id: String,
    service_id: String,
    date: String,
    start_time: String,
    end_time: String,
    price: i64,
    status: String,
    created_at: String,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            start_time: hhmm::format(&b.start_time),
            end_time: hhmm::format(&b.end_time),
            date: b.date.format("%Y-%m-%d").to_string(),
            status: b.status.as_str().to_string(),
            created_at: b.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            id: b.id,
            service_id: b.service_id,
            price: b.price,
        }
    }
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>, Response> {
    check_auth(&headers, &state.config.admin_token)?;

    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, 500);
    let bookings = state.ledger.recent_bookings(limit).await.map_err(internal)?;

    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

fn booking_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "booking not found"})),
    )
        .into_response()
}

// GET /api/admin/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, Response> {
    check_auth(&headers, &state.config.admin_token)?;

    match state.ledger.find_booking(&id).await.map_err(internal)? {
        Some(booking) => Ok(Json(BookingResponse::from(booking))),
        None => Err(booking_not_found()),
    }
}

// POST /api/admin/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, Response> {
    check_auth(&headers, &state.config.admin_token)?;

    let updated = state.ledger.cancel_booking(&id).await.map_err(internal)?;

    if updated {
        Ok(Json(serde_json::json!({"ok": true})))
    } else {
        Err(booking_not_found())
    }
}

/// A service must fit in one day and cost something non-negative.
fn is_bookable(service: &Service) -> bool {
    (1..=MAX_SERVICE_MINUTES).contains(&service.duration_minutes) && service.price >= 0
}

// PUT /api/admin/services
pub async fn replace_services(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(services): Json<Vec<Service>>,
) -> Result<Json<serde_json::Value>, Response> {
    check_auth(&headers, &state.config.admin_token)?;

    if let Some(bad) = services.iter().find(|s| !is_bookable(s)) {
        return Err(AppError::BadRequest(format!("invalid service {}", bad.id)).into_response());
    }

    state
        .catalog
        .replace_services(&services)
        .await
        .map_err(internal)?;

    Ok(Json(serde_json::json!({"ok": true, "count": services.len()})))
}
