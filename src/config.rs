use std::env;

use chrono::NaiveTime;

use crate::errors::AppError;
use crate::models::{hhmm, WorkingWindow};
use crate::services::calendar::BookingPolicy;
use crate::services::wizard::WizardConfig;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PersistenceBackend {
    Sqlite,
    Supabase,
}

/// Where the wizard learns which slots are taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusySource {
    /// The persistence backend's bookings.
    Store,
    /// Deterministic fake conflicts for demos.
    Placeholder,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_token: String,
    pub persistence_backend: PersistenceBackend,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub workday_start: String,
    pub workday_end: String,
    pub slot_interval_minutes: u32,
    pub booking_horizon_days: u32,
    pub same_day_booking: bool,
    pub fallback_catalog: bool,
    pub demo_catalog: bool,
    pub busy_source: BusySource,
    pub session_ttl_minutes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: "okoshko.db".to_string(),
            admin_token: "changeme".to_string(),
            persistence_backend: PersistenceBackend::Sqlite,
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            workday_start: "10:00".to_string(),
            workday_end: "18:00".to_string(),
            slot_interval_minutes: 30,
            booking_horizon_days: 14,
            same_day_booking: true,
            fallback_catalog: true,
            demo_catalog: false,
            busy_source: BusySource::Store,
            session_ttl_minutes: 30,
        }
    }
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn flag(name: &str, default: bool) -> bool {
    let Ok(raw) = env::var(name) else {
        return default;
    };
    parse_flag(&raw).unwrap_or_else(|| {
        tracing::warn!(
            var = name,
            value = %raw,
            default,
            "unrecognised flag value, using default"
        );
        default
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn busy_source(raw: Option<&str>) -> BusySource {
    match raw.map(|r| r.trim().to_ascii_lowercase()).as_deref() {
        Some("placeholder") => BusySource::Placeholder,
        _ => BusySource::Store,
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: parsed("PORT", defaults.port),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or(defaults.admin_token),
            persistence_backend: match env::var("PERSISTENCE_BACKEND").as_deref() {
                Ok("supabase") => PersistenceBackend::Supabase,
                _ => PersistenceBackend::Sqlite,
            },
            supabase_url: env::var("SUPABASE_URL").unwrap_or_default(),
            supabase_anon_key: env::var("SUPABASE_ANON_KEY").unwrap_or_default(),
            workday_start: env::var("WORKDAY_START").unwrap_or(defaults.workday_start),
            workday_end: env::var("WORKDAY_END").unwrap_or(defaults.workday_end),
            slot_interval_minutes: parsed("SLOT_INTERVAL_MINUTES", defaults.slot_interval_minutes),
            booking_horizon_days: parsed("BOOKING_HORIZON_DAYS", defaults.booking_horizon_days),
            same_day_booking: flag("SAME_DAY_BOOKING", defaults.same_day_booking),
            fallback_catalog: flag("FALLBACK_CATALOG", defaults.fallback_catalog),
            demo_catalog: flag("DEMO_CATALOG", defaults.demo_catalog),
            busy_source: busy_source(env::var("BUSY_SOURCE").ok().as_deref()),
            session_ttl_minutes: parsed("SESSION_TTL_MINUTES", defaults.session_ttl_minutes),
        }
    }

    pub fn working_window(&self) -> Result<WorkingWindow, AppError> {
        let opens = parse_time("WORKDAY_START", &self.workday_start)?;
        let closes = parse_time("WORKDAY_END", &self.workday_end)?;
        WorkingWindow::new(opens, closes, self.slot_interval_minutes)
            .map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn wizard_config(&self) -> Result<WizardConfig, AppError> {
        Ok(WizardConfig {
            window: self.working_window()?,
            policy: BookingPolicy {
                horizon_days: self.booking_horizon_days,
                same_day_booking: self.same_day_booking,
            },
            ..WizardConfig::default()
        })
    }

    pub fn session_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_ttl_minutes.saturating_mul(60))
    }
}

fn parse_time(name: &str, raw: &str) -> Result<NaiveTime, AppError> {
    hhmm::parse(raw).map_err(|e| AppError::Config(format!("{name}: {e}")))
}
