use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::clock::Clock;
use crate::services::collaborators::{
    BookingLedger, BookingSink, BusySlotSource, ServiceCatalog, UsageCounters,
};
use crate::services::session::SessionStore;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub catalog: Box<dyn ServiceCatalog>,
    pub busy: Box<dyn BusySlotSource>,
    pub sink: Box<dyn BookingSink>,
    pub ledger: Box<dyn BookingLedger>,
    pub counters: Box<dyn UsageCounters>,
    pub clock: Box<dyn Clock>,
    pub sessions: SessionStore,
}
