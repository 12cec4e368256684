use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::errors::WizardError;
use crate::models::{
    arrange_catalog, hhmm, Booking, BookingRequest, BusySet, CalendarDay, CalendarMonth, Master,
    Selection, SelectionSummary, Service, TimeSlot, WizardStep, WorkingWindow,
};
use crate::services::availability::generate_slots;
use crate::services::calendar::{self, BookingPolicy};
use crate::services::collaborators::BookingSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardConfig {
    pub window: WorkingWindow,
    pub policy: BookingPolicy,
    /// Presentation hint: pause before leaving the service step.
    pub service_advance_ms: u64,
    /// Presentation hint: pause before leaving the date/time step.
    pub time_advance_ms: u64,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            window: WorkingWindow::default(),
            policy: BookingPolicy::default(),
            service_advance_ms: 500,
            time_advance_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SlotOutcome {
    Open { available: usize, total: usize },
    NoAvailability,
}

/// Step state machine for one booking attempt. One instance per session.
#[derive(Debug, Clone)]
pub struct WizardController {
    config: WizardConfig,
    today: NaiveDate,
    step: WizardStep,
    master: Option<Master>,
    services: Vec<Service>,
    selection: Selection,
    slots: Vec<TimeSlot>,
    confirm_in_flight: bool,
    booking: Option<Booking>,
}

impl WizardController {
    pub fn new(today: NaiveDate, config: WizardConfig) -> Self {
        Self {
            config,
            today,
            step: WizardStep::ServiceSelection,
            master: None,
            services: Vec::new(),
            selection: Selection::default(),
            slots: Vec::new(),
            confirm_in_flight: false,
            booking: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Moves the calendar's notion of today. Dates already chosen are kept.
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    pub fn master(&self) -> Option<&Master> {
        self.master.as_ref()
    }

    pub fn set_master(&mut self, master: Master) {
        self.master = Some(master);
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn booking(&self) -> Option<&Booking> {
        self.booking.as_ref()
    }

    pub fn is_confirming(&self) -> bool {
        self.confirm_in_flight
    }

    /// Replaces the catalog wholesale. A service already in the selection keeps its loaded values.
    pub fn set_services(&mut self, services: Vec<Service>) {
        self.services = arrange_catalog(services);
    }

    pub fn calendar(&self) -> CalendarMonth {
        calendar::available_dates(self.today, &self.config.policy)
    }

    pub fn calendar_for(&self, year: i32, month: u32) -> anyhow::Result<CalendarMonth> {
        calendar::month_view(year, month, self.today, &self.config.policy)
    }

    pub fn select_service(&mut self, service_id: &str) -> Result<(), WizardError> {
        self.require_step(WizardStep::ServiceSelection, "select_service")?;

        let service = self
            .services
            .iter()
            .find(|s| s.id == service_id)
            .cloned()
            .ok_or_else(|| WizardError::UnknownService(service_id.to_string()))?;

        tracing::info!(service_id, duration = service.duration_minutes, "service selected");
        self.selection.select_service(service);
        self.slots.clear();
        self.step = WizardStep::DateTimeSelection;
        Ok(())
    }

    /// Validates `date` for the current selection without changing anything.
    pub fn check_date(&self, date: NaiveDate) -> Result<CalendarDay, WizardError> {
        self.require_step(WizardStep::DateTimeSelection, "select_date")?;
        if self.selection.service().is_none() {
            return Err(WizardError::InvalidTransition {
                action: "select_date",
                requires: "a selected service",
            });
        }

        let day = calendar::calendar_day(date, self.today, &self.config.policy);
        if !day.is_selectable() {
            return Err(WizardError::DateNotSelectable {
                date,
                kind: day.kind.as_str(),
            });
        }
        Ok(day)
    }

    /// Chooses a date and derives its slots from `busy`. Any chosen time is dropped.
    pub fn select_date(
        &mut self,
        date: NaiveDate,
        busy: &BusySet,
    ) -> Result<SlotOutcome, WizardError> {
        let day = self.check_date(date)?;
        let duration = self
            .selection
            .service()
            .map(|s| s.duration_minutes)
            .unwrap_or_default();

        let slots = generate_slots(&self.config.window, duration, busy);
        self.selection.select_date(day)?;
        self.slots = slots;

        let available = self.slots.iter().filter(|s| s.is_available()).count();
        tracing::info!(%date, available, total = self.slots.len(), "date selected");

        if available == 0 {
            Ok(SlotOutcome::NoAvailability)
        } else {
            Ok(SlotOutcome::Open {
                available,
                total: self.slots.len(),
            })
        }
    }

    pub fn select_time(&mut self, time: NaiveTime) -> Result<(), WizardError> {
        self.require_step(WizardStep::DateTimeSelection, "select_time")?;
        if self.selection.date().is_none() {
            return Err(WizardError::InvalidTransition {
                action: "select_time",
                requires: "a selected date",
            });
        }

        let slot = self
            .slots
            .iter()
            .find(|s| s.start == time)
            .copied()
            .filter(|s| s.is_available())
            .ok_or_else(|| WizardError::SlotUnavailable(hhmm::format(&time)))?;

        self.selection.select_time(slot)?;
        self.step = WizardStep::Confirmation;
        tracing::info!(time = %hhmm::format(&time), "time selected");
        Ok(())
    }

    /// Steps back once. Returning to service selection drops the date and time.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        if self.confirm_in_flight {
            return Err(WizardError::ConfirmationPending);
        }

        match self.step {
            WizardStep::ServiceSelection => {
                return Err(WizardError::InvalidTransition {
                    action: "back",
                    requires: "a step after service selection",
                })
            }
            WizardStep::Success => {
                return Err(WizardError::InvalidTransition {
                    action: "back",
                    requires: "an unfinished booking",
                })
            }
            WizardStep::DateTimeSelection => {
                self.selection.clear_date_and_time();
                self.slots.clear();
                self.step = WizardStep::ServiceSelection;
            }
            WizardStep::Confirmation => {
                self.step = WizardStep::DateTimeSelection;
            }
        }
        Ok(self.step)
    }

    pub fn restart(&mut self) -> Result<(), WizardError> {
        if self.confirm_in_flight {
            return Err(WizardError::ConfirmationPending);
        }
        self.selection.reset();
        self.slots.clear();
        self.booking = None;
        self.step = WizardStep::ServiceSelection;
        Ok(())
    }

    /// Locks the confirmation action and returns the write to send.
    pub fn begin_confirm(&mut self) -> Result<BookingRequest, WizardError> {
        if self.confirm_in_flight {
            return Err(WizardError::ConfirmationPending);
        }
        self.require_step(WizardStep::Confirmation, "confirm")?;
        let request = self
            .selection
            .booking_request()
            .ok_or(WizardError::InvalidTransition {
                action: "confirm",
                requires: "a complete selection",
            })?;

        self.confirm_in_flight = true;
        Ok(request)
    }

    /// Applies the sink's answer. On failure the step and selection stay as they were.
    pub fn finish_confirm(
        &mut self,
        result: anyhow::Result<Booking>,
    ) -> Result<Booking, WizardError> {
        if !self.confirm_in_flight {
            return Err(WizardError::InvalidTransition {
                action: "finish_confirm",
                requires: "a confirmation in progress",
            });
        }
        self.confirm_in_flight = false;

        match result {
            Ok(booking) => {
                tracing::info!(booking_id = %booking.id, "booking confirmed");
                self.booking = Some(booking.clone());
                self.step = WizardStep::Success;
                Ok(booking)
            }
            Err(e) => {
                tracing::warn!(error = %e, "booking write rejected");
                Err(WizardError::PersistenceFailure(e.to_string()))
            }
        }
    }

    /// Abandons a write whose outcome never arrived. The wizard stays on
    /// Confirmation with its selection so the customer can retry.
    pub fn cancel_confirm(&mut self) -> bool {
        if !self.confirm_in_flight {
            return false;
        }
        self.confirm_in_flight = false;
        tracing::warn!("booking write abandoned");
        true
    }

    pub async fn confirm(&mut self, sink: &dyn BookingSink) -> Result<Booking, WizardError> {
        let request = self.begin_confirm()?;
        let result = sink.create_booking(&request).await;
        self.finish_confirm(result)
    }

    pub fn view(&self) -> WizardView {
        let date_chosen = self.selection.date().is_some();
        WizardView {
            step: self.step,
            step_number: self.step.number(),
            master: self.master.clone(),
            can_go_back: matches!(
                self.step,
                WizardStep::DateTimeSelection | WizardStep::Confirmation
            ) && !self.confirm_in_flight,
            services: self.services.clone(),
            no_services: self.services.is_empty(),
            selection: self.selection.summary(),
            slots: self.slots.clone(),
            no_availability: date_chosen && !self.slots.iter().any(|s| s.is_available()),
            confirm_enabled: self.step == WizardStep::Confirmation
                && self.selection.is_complete()
                && !self.confirm_in_flight,
            confirming: self.confirm_in_flight,
            auto_advance: AutoAdvance {
                after_service_ms: self.config.service_advance_ms,
                after_time_ms: self.config.time_advance_ms,
            },
            success_message: self.success_message(),
            booking: self.booking.clone(),
        }
    }

    fn success_message(&self) -> Option<String> {
        let booking = self.booking.as_ref()?;
        let when = format!(
            "{} at {}",
            booking.date.format("%-d %B"),
            hhmm::format(&booking.start_time)
        );
        Some(match &self.master {
            Some(master) => format!("You're booked with {} on {when}", master.name),
            None => format!("You're booked on {when}"),
        })
    }

    fn require_step(&self, step: WizardStep, action: &'static str) -> Result<(), WizardError> {
        if self.step == step {
            return Ok(());
        }
        let requires = match step {
            WizardStep::ServiceSelection => "the service selection step",
            WizardStep::DateTimeSelection => "the date and time selection step",
            WizardStep::Confirmation => "the confirmation step",
            WizardStep::Success => "the success step",
        };
        Err(WizardError::InvalidTransition { action, requires })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub step: WizardStep,
    pub step_number: u8,
    pub master: Option<Master>,
    pub can_go_back: bool,
    pub services: Vec<Service>,
    pub no_services: bool,
    pub selection: SelectionSummary,
    pub slots: Vec<TimeSlot>,
    pub no_availability: bool,
    pub confirm_enabled: bool,
    pub confirming: bool,
    pub auto_advance: AutoAdvance,
    pub success_message: Option<String>,
    pub booking: Option<Booking>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AutoAdvance {
    pub after_service_ms: u64,
    pub after_time_ms: u64,
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::models::{BookingStatus, SlotStatus};

    fn sept(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn service(id: &str, name: &str, duration: u32, popular: bool) -> Service {
        Service {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            price: 1500,
            duration_minutes: duration,
            is_active: true,
            is_popular: popular,
        }
    }

    fn wizard() -> WizardController {
        let mut w = WizardController::new(sept(2), WizardConfig::default());
        w.set_services(vec![
            service("1", "Classic manicure", 60, false),
            service("2", "Gel polish", 90, true),
            service("3", "Full day", 600, false),
        ]);
        w
    }

    fn at_confirmation() -> WizardController {
        let mut w = wizard();
        w.select_service("1").unwrap();
        w.select_date(sept(3), &BusySet::new()).unwrap();
        w.select_time(t(10, 0)).unwrap();
        w
    }

    struct CountingSink {
        calls: AtomicUsize,
        failures_left: AtomicUsize,
    }

    impl CountingSink {
        fn new(failures: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failures_left: AtomicUsize::new(failures),
            }
        }
    }

    #[async_trait]
    impl BookingSink for CountingSink {
        async fn create_booking(&self, request: &BookingRequest) -> anyhow::Result<Booking> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failures_left.load(Ordering::SeqCst) > 0 {
                self.failures_left.fetch_sub(1, Ordering::SeqCst);
                return Err(anyhow::anyhow!("database is read-only"));
            }
            Ok(Booking::from_request(
                "bk-1".to_string(),
                request,
                Utc::now().naive_utc(),
            ))
        }
    }

    #[test]
    fn test_starts_at_service_selection() {
        let w = wizard();
        assert_eq!(w.step(), WizardStep::ServiceSelection);
        assert_eq!(w.services()[0].id, "2");
        let view = w.view();
        assert!(!view.no_services);
        assert!(!view.can_go_back);
        assert!(!view.confirm_enabled);
    }

    #[test]
    fn test_empty_catalog_is_terminal_empty_state() {
        let mut w = WizardController::new(sept(2), WizardConfig::default());
        w.set_services(vec![]);
        assert!(w.view().no_services);
        let err = w.select_service("1").unwrap_err();
        assert_eq!(err, WizardError::UnknownService("1".to_string()));
        assert_eq!(w.step(), WizardStep::ServiceSelection);
    }

    #[test]
    fn test_select_service_advances() {
        let mut w = wizard();
        w.select_service("2").unwrap();
        assert_eq!(w.step(), WizardStep::DateTimeSelection);
        assert_eq!(w.selection().service().unwrap().duration_minutes, 90);
    }

    #[test]
    fn test_select_service_outside_its_step() {
        let mut w = wizard();
        w.select_service("1").unwrap();
        let err = w.select_service("2").unwrap_err();
        assert!(matches!(err, WizardError::InvalidTransition { .. }));
        assert_eq!(w.selection().service().unwrap().id, "1");
    }

    #[test]
    fn test_date_before_service_is_invalid() {
        let mut w = wizard();
        let err = w.select_date(sept(3), &BusySet::new()).unwrap_err();
        assert!(matches!(err, WizardError::InvalidTransition { .. }));
        assert!(w.selection().date().is_none());
    }

    #[test]
    fn test_non_selectable_dates_rejected() {
        let mut w = wizard();
        w.select_service("1").unwrap();
        for (d, kind) in [(1, "past"), (7, "weekend"), (17, "beyond_horizon")] {
            let err = w.select_date(sept(d), &BusySet::new()).unwrap_err();
            assert_eq!(
                err,
                WizardError::DateNotSelectable {
                    date: sept(d),
                    kind
                }
            );
        }
        assert!(w.selection().date().is_none());
        assert!(w.slots().is_empty());
    }

    #[test]
    fn test_select_date_builds_duration_aware_slots() {
        let mut w = wizard();
        w.select_service("2").unwrap();
        let busy: BusySet = [t(11, 0)].into_iter().collect();
        let outcome = w.select_date(sept(3), &busy).unwrap();
        assert_eq!(
            outcome,
            SlotOutcome::Open {
                available: 11,
                total: 14
            }
        );
        assert_eq!(w.slots().last().unwrap().start, t(16, 30));
        assert_eq!(w.step(), WizardStep::DateTimeSelection);
    }

    #[test]
    fn test_service_longer_than_day_has_no_availability() {
        let mut w = wizard();
        w.select_service("3").unwrap();
        let outcome = w.select_date(sept(3), &BusySet::new()).unwrap();
        assert_eq!(outcome, SlotOutcome::NoAvailability);
        assert!(w.view().no_availability);
        assert!(w.select_time(t(10, 0)).is_err());
    }

    #[test]
    fn test_select_time_rejects_busy_and_off_grid() {
        let mut w = wizard();
        w.select_service("1").unwrap();
        let busy: BusySet = [t(11, 0)].into_iter().collect();
        w.select_date(sept(3), &busy).unwrap();

        assert_eq!(
            w.select_time(t(11, 0)).unwrap_err(),
            WizardError::SlotUnavailable("11:00".to_string())
        );
        assert_eq!(
            w.select_time(t(10, 15)).unwrap_err(),
            WizardError::SlotUnavailable("10:15".to_string())
        );
        assert_eq!(w.step(), WizardStep::DateTimeSelection);
        assert!(w.selection().time().is_none());
    }

    #[test]
    fn test_time_before_date_is_invalid() {
        let mut w = wizard();
        w.select_service("1").unwrap();
        let err = w.select_time(t(10, 0)).unwrap_err();
        assert!(matches!(err, WizardError::InvalidTransition { .. }));
    }

    #[test]
    fn test_select_time_advances_to_confirmation() {
        let w = at_confirmation();
        assert_eq!(w.step(), WizardStep::Confirmation);
        let selected = w.selection().time().unwrap();
        assert_eq!(selected.start, t(10, 0));
        assert_eq!(selected.status, SlotStatus::Available);
        let view = w.view();
        assert!(view.confirm_enabled);
        assert_eq!(view.selection.end_time, Some(t(11, 0)));
    }

    #[test]
    fn test_confirm_with_incomplete_selection() {
        let mut w = wizard();
        w.select_service("1").unwrap();
        w.select_date(sept(3), &BusySet::new()).unwrap();

        let err = w.begin_confirm().unwrap_err();
        assert!(matches!(err, WizardError::InvalidTransition { .. }));
        assert_eq!(w.step(), WizardStep::DateTimeSelection);
        assert!(!w.is_confirming());
    }

    #[tokio::test]
    async fn test_confirm_success() {
        let mut w = at_confirmation();
        let sink = CountingSink::new(0);
        let booking = w.confirm(&sink).await.unwrap();

        assert_eq!(w.step(), WizardStep::Success);
        assert_eq!(booking.service_id, "1");
        assert_eq!(booking.date, sept(3));
        assert_eq!(booking.start_time, t(10, 0));
        assert_eq!(booking.end_time, t(11, 0));
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(w.booking(), Some(&booking));
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_confirmation_then_retry_succeeds() {
        let mut w = at_confirmation();
        let before = w.selection().clone();
        let sink = CountingSink::new(1);

        let err = w.confirm(&sink).await.unwrap_err();
        assert_eq!(
            err,
            WizardError::PersistenceFailure("database is read-only".to_string())
        );
        assert_eq!(w.step(), WizardStep::Confirmation);
        assert_eq!(w.selection(), &before);
        assert!(w.view().confirm_enabled);

        w.confirm(&sink).await.unwrap();
        assert_eq!(w.step(), WizardStep::Success);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_second_confirm_while_pending_is_rejected() {
        let mut w = at_confirmation();
        let request = w.begin_confirm().unwrap();
        assert!(w.is_confirming());
        assert!(!w.view().confirm_enabled);

        assert_eq!(w.begin_confirm().unwrap_err(), WizardError::ConfirmationPending);

        let booking = Booking::from_request("bk-9".into(), &request, Utc::now().naive_utc());
        w.finish_confirm(Ok(booking)).unwrap();
        assert_eq!(w.step(), WizardStep::Success);

        // the attempt is over; a late duplicate cannot write again
        let err = w.begin_confirm().unwrap_err();
        assert!(matches!(err, WizardError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_abandoned_write_returns_to_confirmation() {
        let mut w = at_confirmation();
        let before = w.selection().clone();
        w.begin_confirm().unwrap();

        assert!(w.cancel_confirm());
        assert!(!w.is_confirming());
        assert_eq!(w.step(), WizardStep::Confirmation);
        assert_eq!(w.selection(), &before);
        assert!(w.view().confirm_enabled);
        assert!(!w.cancel_confirm());

        w.confirm(&CountingSink::new(0)).await.unwrap();
        assert_eq!(w.step(), WizardStep::Success);
    }

    #[test]
    fn test_finish_without_begin_is_invalid() {
        let mut w = at_confirmation();
        let err = w.finish_confirm(Err(anyhow::anyhow!("boom"))).unwrap_err();
        assert!(matches!(err, WizardError::InvalidTransition { .. }));
        assert_eq!(w.step(), WizardStep::Confirmation);
    }

    #[test]
    fn test_back_from_confirmation_keeps_date_and_time() {
        let mut w = at_confirmation();
        assert_eq!(w.back().unwrap(), WizardStep::DateTimeSelection);
        assert_eq!(w.selection().date().map(|d| d.date), Some(sept(3)));
        assert_eq!(w.selection().time().map(|s| s.start), Some(t(10, 0)));
        assert!(!w.slots().is_empty());

        // a fresh choice overwrites
        w.select_time(t(12, 0)).unwrap();
        assert_eq!(w.selection().time().map(|s| s.start), Some(t(12, 0)));
        assert_eq!(w.step(), WizardStep::Confirmation);
    }

    #[test]
    fn test_back_to_service_selection_clears_date_and_time() {
        let mut w = at_confirmation();
        w.back().unwrap();
        assert_eq!(w.back().unwrap(), WizardStep::ServiceSelection);
        assert_eq!(w.selection().service().map(|s| s.id.as_str()), Some("1"));
        assert!(w.selection().date().is_none());
        assert!(w.selection().time().is_none());
        assert!(w.slots().is_empty());
    }

    #[test]
    fn test_back_from_first_step_and_while_confirming() {
        let mut w = wizard();
        assert!(matches!(
            w.back().unwrap_err(),
            WizardError::InvalidTransition { .. }
        ));

        let mut w = at_confirmation();
        w.begin_confirm().unwrap();
        assert_eq!(w.back().unwrap_err(), WizardError::ConfirmationPending);
        assert_eq!(w.step(), WizardStep::Confirmation);
    }

    #[tokio::test]
    async fn test_back_from_success_is_rejected() {
        let mut w = at_confirmation();
        w.confirm(&CountingSink::new(0)).await.unwrap();
        assert!(matches!(
            w.back().unwrap_err(),
            WizardError::InvalidTransition { .. }
        ));
        assert_eq!(w.step(), WizardStep::Success);
    }

    #[tokio::test]
    async fn test_restart_from_success() {
        let mut w = at_confirmation();
        w.confirm(&CountingSink::new(0)).await.unwrap();
        w.restart().unwrap();

        assert_eq!(w.step(), WizardStep::ServiceSelection);
        assert!(!w.selection().is_complete());
        assert_eq!(w.selection(), &Selection::default());
        assert!(w.booking().is_none());
        assert!(w.slots().is_empty());
        assert_eq!(w.services().len(), 3);
    }

    #[test]
    fn test_restart_mid_flow_and_while_confirming() {
        let mut w = wizard();
        w.select_service("1").unwrap();
        w.restart().unwrap();
        assert_eq!(w.step(), WizardStep::ServiceSelection);
        assert!(w.selection().service().is_none());

        let mut w = at_confirmation();
        w.begin_confirm().unwrap();
        assert_eq!(w.restart().unwrap_err(), WizardError::ConfirmationPending);
    }

    #[tokio::test]
    async fn test_success_message_names_master() {
        let mut w = at_confirmation();
        w.set_master(Master {
            name: "Anna Smirnova".to_string(),
            description: None,
        });
        assert_eq!(w.view().master.unwrap().name, "Anna Smirnova");
        assert!(w.view().success_message.is_none());

        w.confirm(&CountingSink::new(0)).await.unwrap();
        assert_eq!(
            w.view().success_message.as_deref(),
            Some("You're booked with Anna Smirnova on 3 September at 10:00")
        );

        w.restart().unwrap();
        assert!(w.view().success_message.is_none());
        assert!(w.master().is_some());
    }

    #[test]
    fn test_set_today_moves_calendar() {
        let mut w = wizard();
        w.set_today(sept(3));
        let month = w.calendar();
        assert_eq!(month.day(sept(2)).unwrap().kind.as_str(), "past");
        assert!(month.day(sept(3)).unwrap().is_current);

        w.select_service("1").unwrap();
        assert!(matches!(
            w.check_date(sept(2)).unwrap_err(),
            WizardError::DateNotSelectable { kind: "past", .. }
        ));
    }

    #[test]
    fn test_calendar_views() {
        let w = wizard();
        let month = w.calendar();
        assert_eq!((month.year, month.month), (2024, 9));
        assert_eq!(month.selectable().count(), 11);
        let october = w.calendar_for(2024, 10).unwrap();
        assert_eq!(october.selectable().count(), 0);
        assert!(w.calendar_for(2024, 0).is_err());
    }
}
