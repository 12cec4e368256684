use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;

use super::{BookingLedger, BookingSink, BusySlotSource, ServiceCatalog, UsageCounters, UsageStats};
use crate::db::queries;
use crate::models::{
    Booking, BookingRequest, BookingStatus, BusySet, Master, Service, WorkingWindow,
};
use crate::services::scheduling::{busy_grid, validate_booking_time};

const VIEWS: &str = "views";
const COMPLETIONS: &str = "completions";

/// Every collaborator backed by the local SQLite file.
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Connection>>,
    window: WorkingWindow,
}

impl SqliteStore {
    pub fn new(db: Arc<Mutex<Connection>>, window: WorkingWindow) -> Self {
        Self { db, window }
    }

    fn conn(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))
    }
}

#[async_trait]
impl ServiceCatalog for SqliteStore {
    async fn active_services(&self) -> anyhow::Result<Vec<Service>> {
        let conn = self.conn()?;
        queries::list_services(&conn, true)
    }

    async fn replace_services(&self, services: &[Service]) -> anyhow::Result<()> {
        let conn = self.conn()?;
        queries::replace_services(&conn, services)?;
        tracing::info!(count = services.len(), "service catalog replaced");
        Ok(())
    }

    async fn master(&self) -> anyhow::Result<Option<Master>> {
        let conn = self.conn()?;
        queries::get_master(&conn)
    }
}

#[async_trait]
impl BusySlotSource for SqliteStore {
    async fn busy_slots(&self, date: NaiveDate) -> anyhow::Result<BusySet> {
        let bookings = {
            let conn = self.conn()?;
            queries::get_bookings_on_date(&conn, date)?
        };
        Ok(busy_grid(
            bookings.iter().map(|b| (b.start_time, b.end_time)),
            self.window.interval_minutes,
        ))
    }
}

#[async_trait]
impl BookingSink for SqliteStore {
    async fn create_booking(&self, request: &BookingRequest) -> anyhow::Result<Booking> {
        let conn = self.conn()?;

        let existing = queries::get_bookings_on_date(&conn, request.date)?;
        if let Err(e) = validate_booking_time(&existing, request, Some(&self.window)) {
            tracing::warn!(
                date = %request.date,
                start = %request.start_time,
                error = %e,
                "booking rejected"
            );
            anyhow::bail!("{e}");
        }

        let booking = Booking::from_request(
            uuid::Uuid::new_v4().to_string(),
            request,
            Utc::now().naive_utc(),
        );
        queries::create_booking(&conn, &booking)?;

        tracing::info!(
            booking_id = %booking.id,
            service_id = %booking.service_id,
            date = %booking.date,
            start = %booking.start_time,
            "booking created"
        );
        Ok(booking)
    }
}

#[async_trait]
impl BookingLedger for SqliteStore {
    async fn recent_bookings(&self, limit: i64) -> anyhow::Result<Vec<Booking>> {
        let conn = self.conn()?;
        queries::get_recent_bookings(&conn, limit)
    }

    async fn find_booking(&self, id: &str) -> anyhow::Result<Option<Booking>> {
        let conn = self.conn()?;
        queries::get_booking_by_id(&conn, id)
    }

    async fn cancel_booking(&self, id: &str) -> anyhow::Result<bool> {
        let conn = self.conn()?;
        let updated = queries::update_booking_status(&conn, id, &BookingStatus::Cancelled)?;
        if updated {
            tracing::info!(booking_id = %id, "booking cancelled");
        }
        Ok(updated)
    }
}

#[async_trait]
impl UsageCounters for SqliteStore {
    async fn record_view(&self) -> anyhow::Result<i64> {
        let conn = self.conn()?;
        queries::increment_counter(&conn, VIEWS)
    }

    async fn record_completion(&self) -> anyhow::Result<i64> {
        let conn = self.conn()?;
        queries::increment_counter(&conn, COMPLETIONS)
    }

    async fn snapshot(&self) -> anyhow::Result<UsageStats> {
        let conn = self.conn()?;
        Ok(UsageStats {
            views: queries::get_counter(&conn, VIEWS)?,
            completions: queries::get_counter(&conn, COMPLETIONS)?,
        })
    }
}
