use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::ValidationError;
use crate::models::schedule::{Schedule, check_day};

/// Storage format of `start_date`/`end_date` and schedule keys.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub venue: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub schedule: Schedule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_end: Option<String>,
}

impl Course {
    /// Earliest scheduled day, if any.
    pub fn first_day(&self) -> Option<(&NaiveDate, &crate::models::TimeSlot)> {
        self.schedule.iter().next()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub name: String,
    pub venue: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub schedule: Schedule,
}

impl NewCourseRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.start_date > self.end_date {
            return Err(ValidationError::InvertedDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.schedule.is_empty() {
            return Err(ValidationError::EmptySchedule);
        }
        for (date, slot) in &self.schedule {
            check_day(*date, slot, self.start_date, self.end_date)?;
        }
        Ok(())
    }
}

/// Raw `courses` row; every column is nullable because legacy rows predate most of them.
#[derive(Debug, Clone, FromRow)]
pub struct CourseRow {
    pub id: String,
    pub name: Option<String>,
    pub venue: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub schedule: Option<String>,
    pub legacy_date: Option<String>,
    pub legacy_start: Option<String>,
    pub legacy_end: Option<String>,
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}
