use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{arrange_catalog, hhmm, CalendarMonth, Service};
use crate::services::session;
use crate::services::wizard::{SlotOutcome, WizardView};
use crate::state::AppState;

fn session_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("session {raw}")))
}

// GET /api/services
pub async fn list_services(State(state): State<Arc<AppState>>) -> Json<Vec<Service>> {
    Json(arrange_catalog(session::load_catalog(&state).await))
}

// POST /api/wizard
#[derive(Serialize)]
pub struct OpenResponse {
    session_id: String,
    view: WizardView,
}

pub async fn open(State(state): State<Arc<AppState>>) -> Result<Json<OpenResponse>, AppError> {
    let (id, view) = session::open(&state).await?;
    Ok(Json(OpenResponse {
        session_id: id.to_string(),
        view,
    }))
}

// GET /api/wizard/:id
pub async fn get_view(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(session::view(&state, session_id(&id)?)?))
}

// POST /api/wizard/:id/service
#[derive(Deserialize)]
pub struct ServiceRequest {
    pub service_id: String,
}

pub async fn select_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ServiceRequest>,
) -> Result<Json<WizardView>, AppError> {
    let view = session::choose_service(&state, session_id(&id)?, &body.service_id)?;
    Ok(Json(view))
}

// GET /api/wizard/:id/calendar
#[derive(Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Serialize)]
pub struct CalendarResponse {
    title: String,
    #[serde(flatten)]
    month: CalendarMonth,
}

pub async fn calendar(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let month = session::calendar(&state, session_id(&id)?, query.year, query.month)?;
    Ok(Json(CalendarResponse {
        title: month.title(),
        month,
    }))
}

// POST /api/wizard/:id/date
#[derive(Deserialize)]
pub struct DateRequest {
    pub date: String,
}

#[derive(Serialize)]
pub struct DateResponse {
    availability: SlotOutcome,
    view: WizardView,
}

pub async fn select_date(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<DateRequest>,
) -> Result<Json<DateResponse>, AppError> {
    let id = session_id(&id)?;
    let date = NaiveDate::parse_from_str(body.date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("invalid date: {}", body.date)))?;

    let (availability, view) = session::choose_date(&state, id, date).await?;
    Ok(Json(DateResponse { availability, view }))
}

// POST /api/wizard/:id/time
#[derive(Deserialize)]
pub struct TimeRequest {
    pub time: String,
}

pub async fn select_time(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<TimeRequest>,
) -> Result<Json<WizardView>, AppError> {
    let id = session_id(&id)?;
    let time = hhmm::parse(&body.time)
        .map_err(|_| AppError::BadRequest(format!("invalid time: {}", body.time)))?;
    Ok(Json(session::choose_time(&state, id, time)?))
}

// POST /api/wizard/:id/back
pub async fn back(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(session::back(&state, session_id(&id)?)?))
}

// POST /api/wizard/:id/confirm
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(session::confirm(&state, session_id(&id)?).await?))
}

// POST /api/wizard/:id/restart
pub async fn restart(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(session::restart(&state, session_id(&id)?).await?))
}
