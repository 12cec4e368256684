use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    Past,
    Weekend,
    Available,
    BeyondHorizon,
}

impl DayKind {
    pub fn is_selectable(&self) -> bool {
        matches!(self, DayKind::Available)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayKind::Past => "past",
            DayKind::Weekend => "weekend",
            DayKind::Available => "available",
            DayKind::BeyondHorizon => "beyond_horizon",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub kind: DayKind,
    /// Today and bookable. Display only.
    pub is_current: bool,
}

impl CalendarDay {
    pub fn is_selectable(&self) -> bool {
        self.kind.is_selectable()
    }
}

/// One month of classified days laid out Monday-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    /// Empty cells before day 1 in the first week row.
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

impl CalendarMonth {
    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        if date.year() != self.year || date.month() != self.month {
            return None;
        }
        self.days.get(date.day0() as usize)
    }

    pub fn selectable(&self) -> impl Iterator<Item = &CalendarDay> {
        self.days.iter().filter(|d| d.is_selectable())
    }

    pub fn title(&self) -> String {
        let name = u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("?");
        format!("{name} {}", self.year)
    }

    /// Week rows of seven cells; `None` marks padding before day 1 and after the last day.
    pub fn weeks(&self) -> Vec<Vec<Option<&CalendarDay>>> {
        let mut cells: Vec<Option<&CalendarDay>> = Vec::new();
        cells.extend((0..self.leading_blanks).map(|_| None));
        cells.extend(self.days.iter().map(Some));
        while cells.len() % 7 != 0 {
            cells.push(None);
        }
        cells.chunks(7).map(|row| row.to_vec()).collect()
    }
}
