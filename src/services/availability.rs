use chrono::{Datelike, NaiveDate, NaiveTime};

use crate::models::availability::{minute_of_day, time_from_minute};
use crate::models::{BusySet, SlotStatus, TimeSlot, WorkingWindow};
use crate::services::collaborators::BusySlotSource;

/// Candidate start times for a service of `duration_minutes` inside `window`.
///
/// Starts whose end would pass the closing time are left out entirely, so longer
/// services get fewer slots. A slot is unavailable when any busy start time falls
/// inside `[start, start + duration)`. An empty result means no availability.
pub fn generate_slots(
    window: &WorkingWindow,
    duration_minutes: u32,
    busy: &BusySet,
) -> Vec<TimeSlot> {
    if duration_minutes > window.length_minutes() {
        return Vec::new();
    }

    let opens = window.opens_minute();
    let closes = window.closes_minute();
    let busy_minutes: Vec<u32> = busy.iter().map(minute_of_day).collect();

    let mut slots = Vec::new();
    let mut start = opens;
    while let Some(end) = start
        .checked_add(duration_minutes)
        .filter(|&end| start < closes && end <= closes)
    {
        let Some(time) = time_from_minute(start) else {
            break;
        };
        let taken = busy_minutes
            .iter()
            .any(|&m| m == start || (m > start && m < end));

        slots.push(TimeSlot {
            start: time,
            status: if taken {
                SlotStatus::Unavailable
            } else {
                SlotStatus::Available
            },
        });
        let Some(next) = start.checked_add(window.interval_minutes) else {
            break;
        };
        start = next;
    }
    slots
}

/// The day's busy set from `source`. A failing source counts as "no known
/// conflicts".
pub async fn busy_or_empty(date: NaiveDate, source: &dyn BusySlotSource) -> BusySet {
    match source.busy_slots(date).await {
        Ok(busy) => busy,
        Err(e) => {
            tracing::warn!(error = %e, %date, "busy-slot source failed, assuming no conflicts");
            BusySet::new()
        }
    }
}

/// Deterministic stand-in for a real conflict source, derived from the day of month.
pub fn placeholder_busy(date: NaiveDate) -> BusySet {
    let seed = date.day() * 13;
    let mut busy = BusySet::new();
    let mut mark = |h: u32| {
        if let Some(t) = NaiveTime::from_hms_opt(h, 0, 0) {
            busy.insert(t);
        }
    };
    if seed % 3 == 0 {
        mark(11);
    }
    if seed % 4 == 1 {
        mark(13);
    }
    if seed % 5 == 2 {
        mark(17);
    }
    if seed % 7 == 3 {
        mark(15);
    }
    busy
}
