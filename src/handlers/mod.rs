pub mod admin;
pub mod health;
pub mod wizard;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/services", get(wizard::list_services))
        .route("/api/wizard", post(wizard::open))
        .route("/api/wizard/:id", get(wizard::get_view))
        .route("/api/wizard/:id/service", post(wizard::select_service))
        .route("/api/wizard/:id/calendar", get(wizard::calendar))
        .route("/api/wizard/:id/date", post(wizard::select_date))
        .route("/api/wizard/:id/time", post(wizard::select_time))
        .route("/api/wizard/:id/back", post(wizard::back))
        .route("/api/wizard/:id/confirm", post(wizard::confirm))
        .route("/api/wizard/:id/restart", post(wizard::restart))
        .route("/api/admin/stats", get(admin::get_stats))
        .route("/api/admin/bookings", get(admin::get_bookings))
        .route("/api/admin/bookings/:id", get(admin::get_booking))
        .route(
            "/api/admin/bookings/:id/cancel",
            post(admin::cancel_booking),
        )
        .route("/api/admin/services", put(admin::replace_services))
        .with_state(state)
}
