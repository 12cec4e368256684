use chrono::NaiveTime;

use crate::models::availability::{minute_of_day, time_from_minute};
use crate::models::{hhmm, Booking, BookingRequest, BusySet, WorkingWindow};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulingError {
    #[error("That time is outside our working hours. We're available {hours}")]
    OutsideBusinessHours { hours: String },
    #[error("Sorry, that time slot is already booked. Please pick a different time.")]
    Conflict,
}

/// Last check before a booking is written: inside the window and clear of
/// every booking already taken for that day.
pub fn validate_booking_time(
    existing: &[Booking],
    request: &BookingRequest,
    window: Option<&WorkingWindow>,
) -> Result<(), SchedulingError> {
    if let Some(window) = window {
        if request.start_time < window.opens
            || request.end_time > window.closes
            || request.end_time <= request.start_time
        {
            return Err(SchedulingError::OutsideBusinessHours {
                hours: format!(
                    "{}-{}",
                    hhmm::format(&window.opens),
                    hhmm::format(&window.closes)
                ),
            });
        }
    }

    // Overlap: booking starts before proposed ends AND booking ends after proposed starts
    if existing
        .iter()
        .filter(|b| b.date == request.date)
        .any(|b| b.overlaps(request.start_time, request.end_time))
    {
        return Err(SchedulingError::Conflict);
    }

    Ok(())
}

/// Grid start times covered by `[start, end)` intervals, so a long booking
/// blocks every slot start it spans.
pub fn busy_grid<I>(intervals: I, grid_minutes: u32) -> BusySet
where
    I: IntoIterator<Item = (NaiveTime, NaiveTime)>,
{
    let step = grid_minutes.max(1);
    let mut busy = BusySet::new();
    for (start, end) in intervals {
        let end_minute = minute_of_day(&end);
        let mut minute = minute_of_day(&start);
        busy.insert(start);
        while minute < end_minute {
            if let Some(t) = time_from_minute(minute) {
                busy.insert(t);
            }
            minute += step;
        }
    }
    busy
}
