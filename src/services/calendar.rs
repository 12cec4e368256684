use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::{CalendarDay, CalendarMonth, DayKind};

/// Which dates may be booked relative to "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    /// Days after today that are still bookable.
    pub horizon_days: u32,
    /// When false, today itself counts as past.
    pub same_day_booking: bool,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            horizon_days: 14,
            same_day_booking: true,
        }
    }
}

/// Past wins over weekend, weekend over beyond-horizon.
pub fn classify(date: NaiveDate, reference: NaiveDate, policy: &BookingPolicy) -> DayKind {
    if date < reference || (date == reference && !policy.same_day_booking) {
        DayKind::Past
    } else if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        DayKind::Weekend
    } else if (date - reference).num_days() > i64::from(policy.horizon_days) {
        DayKind::BeyondHorizon
    } else {
        DayKind::Available
    }
}

pub fn calendar_day(date: NaiveDate, reference: NaiveDate, policy: &BookingPolicy) -> CalendarDay {
    let kind = classify(date, reference, policy);
    CalendarDay {
        date,
        kind,
        is_current: date == reference && kind == DayKind::Available,
    }
}

/// The month containing `reference`, every day classified.
pub fn available_dates(reference: NaiveDate, policy: &BookingPolicy) -> CalendarMonth {
    build_month(first_of_month(reference), reference, policy)
}

/// Any month, classified against `reference`. Needed when the horizon crosses a month end.
pub fn month_view(
    year: i32,
    month: u32,
    reference: NaiveDate,
    policy: &BookingPolicy,
) -> anyhow::Result<CalendarMonth> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow::anyhow!("invalid month: {year}-{month:02}"))?;
    Ok(build_month(first, reference, policy))
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn build_month(first: NaiveDate, reference: NaiveDate, policy: &BookingPolicy) -> CalendarMonth {
    let days: Vec<CalendarDay> = first
        .iter_days()
        .take_while(|d| d.month() == first.month())
        .map(|d| calendar_day(d, reference, policy))
        .collect();

    CalendarMonth {
        year: first.year(),
        month: first.month(),
        leading_blanks: first.weekday().number_from_monday() - 1,
        days,
    }
}
