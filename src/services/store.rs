use sqlx::SqlitePool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::repository;
use crate::error::AppError;
use crate::models::course::parse_date;
use crate::models::schedule::{Schedule, TimeSlot, decode_schedule, encode_schedule};
use crate::models::{Course, CourseRow, NewCourseRequest};

/// Persistence of course records. The only write path is `save`.
#[derive(Clone)]
pub struct CourseStore {
    db: SqlitePool,
}

impl CourseStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn save(&self, req: NewCourseRequest) -> Result<Course, AppError> {
        let schedule: Schedule = req
            .schedule
            .iter()
            .map(|(date, slot)| (*date, TimeSlot::new(slot.start, slot.end)))
            .collect();
        let req = NewCourseRequest { schedule, ..req };
        // checked at the minute resolution that gets stored
        req.validate()?;

        let blob = encode_schedule(&req.schedule).map_err(|e| {
            error!("failed to encode schedule: {}", e);
            AppError::InternalServerError
        })?;

        let id = Uuid::new_v4().to_string();
        repository::insert_course(&self.db, &id, &req, &blob).await?;
        info!("saved course {} ({} days)", id, req.schedule.len());

        Ok(Course {
            id,
            name: req.name,
            venue: req.venue,
            start_date: Some(req.start_date),
            end_date: Some(req.end_date),
            schedule: req.schedule,
            legacy_date: None,
            legacy_start: None,
            legacy_end: None,
        })
    }

    /// Every stored course. A record that fails to decode is returned with an empty schedule.
    pub async fn load_all(&self) -> Result<Vec<Course>, AppError> {
        let rows = repository::fetch_course_rows(&self.db).await?;
        Ok(rows.into_iter().map(course_from_row).collect())
    }
}

fn course_from_row(row: CourseRow) -> Course {
    let schedule = match row.schedule.as_deref().map(str::trim) {
        None | Some("") => Schedule::new(),
        Some(blob) => decode_schedule(blob).unwrap_or_else(|e| {
            let err = AppError::CorruptRecord {
                id: row.id.clone(),
                reason: e.to_string(),
            };
            warn!("{}", err);
            Schedule::new()
        }),
    };

    Course {
        start_date: read_date(&row.id, "start_date", row.start_date.as_deref()),
        end_date: read_date(&row.id, "end_date", row.end_date.as_deref()),
        id: row.id,
        name: row.name.unwrap_or_default(),
        venue: row.venue.unwrap_or_default(),
        schedule,
        legacy_date: row.legacy_date,
        legacy_start: row.legacy_start,
        legacy_end: row.legacy_end,
    }
}

fn read_date(id: &str, column: &str, raw: Option<&str>) -> Option<chrono::NaiveDate> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    let parsed = parse_date(raw);
    if parsed.is_none() {
        let err = AppError::CorruptRecord {
            id: id.to_string(),
            reason: format!("{} '{}' is not a YYYY-MM-DD date", column, raw),
        };
        warn!("{}", err);
    }
    parsed
}
