use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;

/// Failures of wizard operations. Only `InvalidTransition` indicates a bug in the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("invalid transition: {action} requires {requires}")]
    InvalidTransition {
        action: &'static str,
        requires: &'static str,
    },

    #[error("unknown service: {0}")]
    UnknownService(String),

    #[error("date {date} is not selectable ({kind})")]
    DateNotSelectable { date: NaiveDate, kind: &'static str },

    #[error("time slot {0} is not available")]
    SlotUnavailable(String),

    #[error("a booking confirmation is already in progress")]
    ConfirmationPending,

    #[error("{0}")]
    PersistenceFailure(String),

    #[error("service catalog unavailable: {0}")]
    CatalogUnavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Wizard(e) => match e {
                WizardError::InvalidTransition { .. } | WizardError::ConfirmationPending => {
                    StatusCode::CONFLICT
                }
                WizardError::UnknownService(_)
                | WizardError::DateNotSelectable { .. }
                | WizardError::SlotUnavailable(_) => StatusCode::UNPROCESSABLE_ENTITY,
                WizardError::PersistenceFailure(_) => StatusCode::BAD_GATEWAY,
                WizardError::CatalogUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::Wizard(WizardError::InvalidTransition { action, requires }) = &self {
            tracing::error!(
                action = *action,
                requires = *requires,
                "wizard operation called out of order"
            );
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
