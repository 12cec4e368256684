pub mod availability;
pub mod booking;
pub mod calendar;
pub mod hhmm;
pub mod master;
pub mod selection;
pub mod service;
pub mod step;

pub use availability::{BusySet, SlotStatus, TimeSlot, WorkingWindow};
pub use booking::{Booking, BookingRequest, BookingStatus};
pub use calendar::{CalendarDay, CalendarMonth, DayKind};
pub use master::Master;
pub use selection::{Selection, SelectionSummary};
pub use service::{arrange_catalog, Service};
pub use step::WizardStep;
