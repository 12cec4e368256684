pub mod fallback;
pub mod sqlite;
pub mod supabase;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Booking, BookingRequest, BusySet, Master, Service};

#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    /// Active services in any order; callers arrange them for display.
    async fn active_services(&self) -> anyhow::Result<Vec<Service>>;

    /// Swaps the whole catalog. Services are never patched field by field.
    async fn replace_services(&self, _services: &[Service]) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("this service catalog is read-only"))
    }

    /// The provider's profile. `None` when the catalog does not record one.
    async fn master(&self) -> anyhow::Result<Option<Master>> {
        Ok(None)
    }
}

#[async_trait]
pub trait BusySlotSource: Send + Sync {
    async fn busy_slots(&self, date: NaiveDate) -> anyhow::Result<BusySet>;
}

#[async_trait]
pub trait BookingSink: Send + Sync {
    /// The error's message is shown to the user as-is.
    async fn create_booking(&self, request: &BookingRequest) -> anyhow::Result<Booking>;
}

#[async_trait]
pub trait BookingLedger: Send + Sync {
    async fn recent_bookings(&self, limit: i64) -> anyhow::Result<Vec<Booking>>;
    async fn find_booking(&self, id: &str) -> anyhow::Result<Option<Booking>>;
    async fn cancel_booking(&self, id: &str) -> anyhow::Result<bool>;
}

/// Advisory view/completion counters. Never allowed to block the wizard.
#[async_trait]
pub trait UsageCounters: Send + Sync {
    async fn record_view(&self) -> anyhow::Result<i64>;
    async fn record_completion(&self) -> anyhow::Result<i64>;
    async fn snapshot(&self) -> anyhow::Result<UsageStats>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageStats {
    pub views: i64,
    pub completions: i64,
}
