use std::collections::BTreeSet;

use chrono::{Duration, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::hhmm;

/// Start times already taken on a given date.
pub type BusySet = BTreeSet<NaiveTime>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    pub status: SlotStatus,
}

impl TimeSlot {
    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }

    pub fn end_for(&self, duration_minutes: u32) -> NaiveTime {
        self.start + Duration::minutes(i64::from(duration_minutes))
    }
}

/// Opening hours of the provider plus the slot granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingWindow {
    pub opens: NaiveTime,
    pub closes: NaiveTime,
    pub interval_minutes: u32,
}

impl Default for WorkingWindow {
    fn default() -> Self {
        Self {
            opens: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN),
            closes: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
            interval_minutes: 30,
        }
    }
}

impl WorkingWindow {
    pub fn new(opens: NaiveTime, closes: NaiveTime, interval_minutes: u32) -> anyhow::Result<Self> {
        if closes <= opens {
            return Err(anyhow::anyhow!(
                "working window closes ({closes}) before it opens ({opens})"
            ));
        }
        if interval_minutes == 0 {
            return Err(anyhow::anyhow!("slot interval must be positive"));
        }
        Ok(Self {
            opens,
            closes,
            interval_minutes,
        })
    }

    pub fn opens_minute(&self) -> u32 {
        minute_of_day(&self.opens)
    }

    pub fn closes_minute(&self) -> u32 {
        minute_of_day(&self.closes)
    }

    pub fn length_minutes(&self) -> u32 {
        self.closes_minute().saturating_sub(self.opens_minute())
    }
}

pub fn minute_of_day(time: &NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

pub fn time_from_minute(minute: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(minute / 60, minute % 60, 0)
}
