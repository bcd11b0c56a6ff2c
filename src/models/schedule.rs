use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::NewCourseRequest;

/// 24-hour clock format used for every stored time.
pub const TIME_FORMAT: &str = "%H:%M";

/// Per-day time-table of a course, keyed by calendar date.
pub type Schedule = BTreeMap<NaiveDate, TimeSlot>;

/// Start/end time of a single scheduled day, minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "hhmm", alias = "mula")]
    pub start: NaiveTime,
    #[serde(with = "hhmm", alias = "tamat")]
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start: truncate_seconds(start),
            end: truncate_seconds(end),
        }
    }

    /// `"HH:MM - HH:MM"`, as shown in tables and exports.
    pub fn display_range(&self) -> String {
        format!(
            "{} - {}",
            self.start.format(TIME_FORMAT),
            self.end.format(TIME_FORMAT)
        )
    }
}

fn truncate_seconds(t: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t)
}

/// Accepts `HH:MM` and `HH:MM:SS`; seconds are dropped.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
        .map(truncate_seconds)
}

pub fn encode_schedule(schedule: &Schedule) -> Result<String, serde_json::Error> {
    serde_json::to_string(schedule)
}

pub fn decode_schedule(blob: &str) -> Result<Schedule, serde_json::Error> {
    serde_json::from_str(blob)
}

/// Checks one entry against the course's date range.
pub fn check_day(
    date: NaiveDate,
    slot: &TimeSlot,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<(), ValidationError> {
    if date < start_date || date > end_date {
        return Err(ValidationError::DateOutOfRange {
            date,
            start: start_date,
            end: end_date,
        });
    }
    if slot.start >= slot.end {
        return Err(ValidationError::InvertedTimeSlot {
            date,
            start: slot.start,
            end: slot.end,
        });
    }
    Ok(())
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&time.format(super::TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_time(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid time '{}', expected HH:MM", raw))
        })
    }
}

/// In-progress, day-by-day entry of a schedule. Never persisted on its own.
#[derive(Debug, Clone)]
pub struct ScheduleDraft {
    start_date: NaiveDate,
    end_date: NaiveDate,
    days: Schedule,
}

impl ScheduleDraft {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, ValidationError> {
        if start_date > end_date {
            return Err(ValidationError::InvertedDateRange {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            start_date,
            end_date,
            days: Schedule::new(),
        })
    }

    /// Every calendar date in the course range, in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |d| *d <= self.end_date)
    }

    pub fn next_pending_date(&self) -> Option<NaiveDate> {
        self.dates().find(|d| !self.days.contains_key(d))
    }

    pub fn record(&mut self, date: NaiveDate, slot: TimeSlot) -> Result<(), ValidationError> {
        let slot = TimeSlot::new(slot.start, slot.end);
        check_day(date, &slot, self.start_date, self.end_date)?;
        self.days.insert(date, slot);
        Ok(())
    }

    /// Fills the earliest date without a slot. Returns `None` once every day is filled.
    pub fn record_next(&mut self, slot: TimeSlot) -> Result<Option<NaiveDate>, ValidationError> {
        let Some(date) = self.next_pending_date() else {
            return Ok(None);
        };
        self.record(date, slot)?;
        Ok(Some(date))
    }

    pub fn is_complete(&self) -> bool {
        self.next_pending_date().is_none()
    }

    pub fn schedule(&self) -> &Schedule {
        &self.days
    }

    pub fn into_new_course(self, name: impl Into<String>, venue: impl Into<String>) -> NewCourseRequest {
        NewCourseRequest {
            name: name.into(),
            venue: venue.into(),
            start_date: self.start_date,
            end_date: self.end_date,
            schedule: self.days,
        }
    }
}
