use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::errors::{AppError, WizardError};
use crate::models::{CalendarMonth, Master, Service};
use crate::services::availability::busy_or_empty;
use crate::services::collaborators::fallback::{default_master, default_services};
use crate::services::wizard::{SlotOutcome, WizardController, WizardView};
use crate::state::AppState;

struct SessionEntry {
    controller: WizardController,
    last_activity: Instant,
}

/// Live wizards keyed by session id. Idle entries expire after `ttl`.
pub struct SessionStore {
    entries: Mutex<HashMap<Uuid, SessionEntry>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, SessionEntry>>, AppError> {
        self.entries
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("session store lock poisoned")))
    }

    pub fn insert(&self, controller: WizardController) -> Result<Uuid, AppError> {
        let mut entries = self.lock()?;
        let ttl = self.ttl;
        entries.retain(|_, e| e.last_activity.elapsed() < ttl);

        let id = Uuid::new_v4();
        entries.insert(
            id,
            SessionEntry {
                controller,
                last_activity: Instant::now(),
            },
        );
        Ok(id)
    }

    /// Runs `f` against the session's controller and marks it active.
    pub fn with<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut WizardController) -> R,
    ) -> Result<R, AppError> {
        let mut entries = self.lock()?;

        let expired = entries
            .get(&id)
            .map(|e| e.last_activity.elapsed() >= self.ttl)
            .unwrap_or(false);
        if expired {
            entries.remove(&id);
            tracing::info!(session = %id, "session expired");
        }

        let entry = entries
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("session {id}")))?;
        entry.last_activity = Instant::now();
        Ok(f(&mut entry.controller))
    }

    pub fn purge_expired(&self) -> Result<usize, AppError> {
        let mut entries = self.lock()?;
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, e| e.last_activity.elapsed() < ttl);
        Ok(before - entries.len())
    }

    pub fn len(&self) -> Result<usize, AppError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, AppError> {
        Ok(self.lock()?.is_empty())
    }
}

// ── Catalog / Counters ──

/// Active services, or the demo catalog when the real one is unreachable.
pub async fn load_catalog(state: &AppState) -> Vec<Service> {
    match state.catalog.active_services().await {
        Ok(services) => services,
        Err(e) => {
            let err = WizardError::CatalogUnavailable(format!("{e:#}"));
            if state.config.fallback_catalog {
                tracing::warn!(error = %err, "falling back to demo services");
                default_services()
            } else {
                tracing::error!(error = %err, "no services to offer");
                Vec::new()
            }
        }
    }
}

/// The provider profile, or the default one when the catalog has none.
pub async fn load_master(state: &AppState) -> Master {
    match state.catalog.master().await {
        Ok(Some(master)) => master,
        Ok(None) => default_master(),
        Err(e) => {
            tracing::warn!(error = %e, "master profile unavailable, using default");
            default_master()
        }
    }
}

async fn record_view(state: &AppState) {
    if let Err(e) = state.counters.record_view().await {
        tracing::warn!(error = %e, "failed to record view");
    }
}

async fn record_completion(state: &AppState) {
    if let Err(e) = state.counters.record_completion().await {
        tracing::warn!(error = %e, "failed to record completion");
    }
}

// ── Wizard Operations ──

pub async fn open(state: &AppState) -> Result<(Uuid, WizardView), AppError> {
    let mut controller = WizardController::new(state.clock.today(), state.config.wizard_config()?);
    controller.set_master(load_master(state).await);
    controller.set_services(load_catalog(state).await);
    let view = controller.view();

    let id = state.sessions.insert(controller)?;
    record_view(state).await;

    tracing::info!(session = %id, services = view.services.len(), "wizard opened");
    Ok((id, view))
}

pub fn view(state: &AppState, id: Uuid) -> Result<WizardView, AppError> {
    state.sessions.with(id, |c| c.view())
}

pub fn calendar(
    state: &AppState,
    id: Uuid,
    year: Option<i32>,
    month: Option<u32>,
) -> Result<CalendarMonth, AppError> {
    let today = state.clock.today();
    let month = state.sessions.with(id, |c| {
        c.set_today(today);
        match (year, month) {
            (Some(year), Some(month)) => c.calendar_for(year, month),
            (None, None) => Ok(c.calendar()),
            _ => Err(anyhow::anyhow!("year and month must be given together")),
        }
    })?;
    month.map_err(|e| AppError::BadRequest(e.to_string()))
}

pub fn choose_service(state: &AppState, id: Uuid, service_id: &str) -> Result<WizardView, AppError> {
    let view = state.sessions.with(id, |c| {
        c.select_service(service_id)?;
        Ok::<_, WizardError>(c.view())
    })??;
    tracing::info!(session = %id, service_id, "wizard advanced to date selection");
    Ok(view)
}

/// Checks the date, fetches busy slots without holding the session, then applies.
pub async fn choose_date(
    state: &AppState,
    id: Uuid,
    date: NaiveDate,
) -> Result<(SlotOutcome, WizardView), AppError> {
    state.sessions.with(id, |c| c.check_date(date))??;

    let busy = busy_or_empty(date, state.busy.as_ref()).await;

    let (outcome, view) = state.sessions.with(id, |c| {
        let outcome = c.select_date(date, &busy)?;
        Ok::<_, WizardError>((outcome, c.view()))
    })??;

    if outcome == SlotOutcome::NoAvailability {
        tracing::info!(session = %id, %date, "no free slots on date");
    }
    Ok((outcome, view))
}

pub fn choose_time(state: &AppState, id: Uuid, time: NaiveTime) -> Result<WizardView, AppError> {
    let view = state.sessions.with(id, |c| {
        c.select_time(time)?;
        Ok::<_, WizardError>(c.view())
    })??;
    Ok(view)
}

pub fn back(state: &AppState, id: Uuid) -> Result<WizardView, AppError> {
    let view = state.sessions.with(id, |c| {
        c.back()?;
        Ok::<_, WizardError>(c.view())
    })??;
    Ok(view)
}

/// Releases a session's confirmation if the write's answer is never applied,
/// e.g. when the request future is dropped mid-write.
struct PendingWrite<'a> {
    sessions: &'a SessionStore,
    id: Uuid,
    settled: bool,
}

impl Drop for PendingWrite<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        if let Err(e) = self.sessions.with(self.id, |c| c.cancel_confirm()) {
            tracing::warn!(session = %self.id, error = %e, "could not release confirmation");
        }
    }
}

/// Begin and finish run under the session lock; the sink write runs outside it.
pub async fn confirm(state: &AppState, id: Uuid) -> Result<WizardView, AppError> {
    let request = state.sessions.with(id, |c| c.begin_confirm())??;
    let mut pending = PendingWrite {
        sessions: &state.sessions,
        id,
        settled: false,
    };
    tracing::info!(
        session = %id,
        service_id = %request.service_id,
        date = %request.date,
        "writing booking"
    );

    let result = state.sink.create_booking(&request).await;
    pending.settled = true;

    let view = state.sessions.with(id, |c| {
        c.finish_confirm(result)?;
        Ok::<_, WizardError>(c.view())
    })??;

    record_completion(state).await;
    Ok(view)
}

pub async fn restart(state: &AppState, id: Uuid) -> Result<WizardView, AppError> {
    state.sessions.with(id, |c| c.restart())??;

    let master = load_master(state).await;
    let services = load_catalog(state).await;
    let today = state.clock.today();
    let view = state.sessions.with(id, |c| {
        c.set_today(today);
        c.set_master(master);
        c.set_services(services);
        c.view()
    })?;

    record_view(state).await;
    tracing::info!(session = %id, "wizard restarted");
    Ok(view)
}
