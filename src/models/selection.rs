use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use super::{hhmm, BookingRequest, CalendarDay, Service, TimeSlot};
use crate::errors::WizardError;

/// The user's in-progress choices. A time needs a date, a date needs a service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    service: Option<Service>,
    date: Option<CalendarDay>,
    time: Option<TimeSlot>,
}

impl Selection {
    pub fn service(&self) -> Option<&Service> {
        self.service.as_ref()
    }

    pub fn date(&self) -> Option<&CalendarDay> {
        self.date.as_ref()
    }

    pub fn time(&self) -> Option<&TimeSlot> {
        self.time.as_ref()
    }

    /// Durations differ between services, so any chosen date and slot are dropped.
    pub fn select_service(&mut self, service: Service) {
        self.service = Some(service);
        self.date = None;
        self.time = None;
    }

    pub fn select_date(&mut self, day: CalendarDay) -> Result<(), WizardError> {
        if self.service.is_none() {
            return Err(WizardError::InvalidTransition {
                action: "select_date",
                requires: "a selected service",
            });
        }
        self.date = Some(day);
        self.time = None;
        Ok(())
    }

    pub fn select_time(&mut self, slot: TimeSlot) -> Result<(), WizardError> {
        if self.date.is_none() {
            return Err(WizardError::InvalidTransition {
                action: "select_time",
                requires: "a selected date",
            });
        }
        self.time = Some(slot);
        Ok(())
    }

    pub(crate) fn clear_date_and_time(&mut self) {
        self.date = None;
        self.time = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_complete(&self) -> bool {
        self.service.is_some() && self.date.is_some() && self.time.is_some()
    }

    pub fn end_time(&self) -> Option<NaiveTime> {
        match (&self.service, &self.time) {
            (Some(service), Some(slot)) => Some(slot.end_for(service.duration_minutes)),
            _ => None,
        }
    }

    pub fn booking_request(&self) -> Option<BookingRequest> {
        let (service, day, slot) = match (&self.service, &self.date, &self.time) {
            (Some(s), Some(d), Some(t)) => (s, d, t),
            _ => return None,
        };
        Some(BookingRequest {
            service_id: service.id.clone(),
            date: day.date,
            start_time: slot.start,
            end_time: slot.end_for(service.duration_minutes),
            price: service.price,
        })
    }

    pub fn summary(&self) -> SelectionSummary {
        SelectionSummary {
            service_id: self.service.as_ref().map(|s| s.id.clone()),
            service_name: self.service.as_ref().map(|s| s.name.clone()),
            price: self.service.as_ref().map(|s| s.price),
            duration_minutes: self.service.as_ref().map(|s| s.duration_minutes),
            date: self.date.as_ref().map(|d| d.date),
            time: self.time.as_ref().map(|t| t.start),
            end_time: self.end_time(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionSummary {
    pub service_id: Option<String>,
    pub service_name: Option<String>,
    pub price: Option<i64>,
    pub duration_minutes: Option<u32>,
    pub date: Option<NaiveDate>,
    #[serde(serialize_with = "hhmm::option::serialize")]
    pub time: Option<NaiveTime>,
    #[serde(serialize_with = "hhmm::option::serialize")]
    pub end_time: Option<NaiveTime>,
}
