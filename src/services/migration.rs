use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::db::repository;
use crate::error::AppError;
use crate::models::CourseRow;
use crate::models::schedule::{Schedule, TimeSlot, decode_schedule, encode_schedule, parse_time};

/// Why a record was left alone. Not an error; reported for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationSkipped {
    #[error("schedule already populated")]
    AlreadyMigrated,

    #[error("schedule present but unreadable, left untouched")]
    UnreadableSchedule,

    #[error("no schedule and no legacy fields")]
    NoLegacyFields,

    #[error("legacy fields unusable: {0}")]
    InvalidLegacy(String),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub migrated: usize,
    pub already_migrated: usize,
    pub unmigratable: usize,
}

/// Upgrades single-date records to a one-day schedule. Safe to run any number of times.
pub async fn migrate_schema(db: &SqlitePool) -> Result<MigrationReport, AppError> {
    let rows = repository::fetch_course_rows(db).await?;
    let mut report = MigrationReport::default();

    for row in rows {
        match plan_migration(&row) {
            Ok((date, schedule)) => {
                let blob = encode_schedule(&schedule).map_err(|e| AppError::CorruptRecord {
                    id: row.id.clone(),
                    reason: e.to_string(),
                })?;
                repository::set_migrated_schedule(db, &row.id, &blob, date).await?;
                debug!("migrated course {} to a schedule on {}", row.id, date);
                report.migrated += 1;
            }
            Err(skip @ (MigrationSkipped::AlreadyMigrated | MigrationSkipped::UnreadableSchedule)) => {
                debug!("skipping course {}: {}", row.id, skip);
                report.already_migrated += 1;
            }
            Err(skip) => {
                warn!("cannot migrate course {}: {}", row.id, skip);
                report.unmigratable += 1;
            }
        }
    }

    info!(
        "schema migration finished - migrated: {}, already migrated: {}, unmigratable: {}",
        report.migrated, report.already_migrated, report.unmigratable
    );
    Ok(report)
}

/// Decides what migration would do with one row, without touching the store.
pub fn plan_migration(row: &CourseRow) -> Result<(NaiveDate, Schedule), MigrationSkipped> {
    if let Some(blob) = row.schedule.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        match decode_schedule(blob) {
            Ok(existing) if !existing.is_empty() => return Err(MigrationSkipped::AlreadyMigrated),
            Ok(_) => {}
            Err(_) => return Err(MigrationSkipped::UnreadableSchedule),
        }
    }

    let (Some(date), Some(start), Some(end)) = (
        non_blank(&row.legacy_date),
        non_blank(&row.legacy_start),
        non_blank(&row.legacy_end),
    ) else {
        return Err(MigrationSkipped::NoLegacyFields);
    };

    let date = parse_legacy_date(date)
        .ok_or_else(|| MigrationSkipped::InvalidLegacy(format!("date '{}'", date)))?;
    let start = parse_time(start)
        .ok_or_else(|| MigrationSkipped::InvalidLegacy(format!("start time '{}'", start)))?;
    let end = parse_time(end)
        .ok_or_else(|| MigrationSkipped::InvalidLegacy(format!("end time '{}'", end)))?;
    if start >= end {
        return Err(MigrationSkipped::InvalidLegacy(format!(
            "start {} is not before end {}",
            start, end
        )));
    }

    let mut schedule = Schedule::new();
    schedule.insert(date, TimeSlot::new(start, end));
    Ok((date, schedule))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_legacy_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_row(date: &str, start: &str, end: &str) -> CourseRow {
        CourseRow {
            id: "c1".to_string(),
            name: Some("Kursus Lama".to_string()),
            venue: None,
            start_date: None,
            end_date: None,
            schedule: None,
            legacy_date: Some(date.to_string()),
            legacy_start: Some(start.to_string()),
            legacy_end: Some(end.to_string()),
        }
    }

    #[test]
    fn test_plan_builds_one_day_schedule() {
        let (date, schedule) = plan_migration(&legacy_row("2025-11-03", "09:00:00", "13:00")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 11, 3).unwrap());
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[&date].display_range(), "09:00 - 13:00");
    }

    #[test]
    fn test_plan_accepts_other_legacy_date_shapes() {
        let expected = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
        for raw in ["03/11/2025", "2025-11-03 00:00:00", " 2025-11-03 "] {
            let (date, _) = plan_migration(&legacy_row(raw, "09:00", "10:00")).unwrap();
            assert_eq!(date, expected, "input {:?}", raw);
        }
    }

    #[test]
    fn test_plan_skips_populated_schedule() {
        let mut row = legacy_row("2025-11-03", "09:00", "13:00");
        row.schedule = Some(r#"{"2025-11-04":{"start":"08:00","end":"09:00"}}"#.to_string());
        assert_eq!(plan_migration(&row), Err(MigrationSkipped::AlreadyMigrated));

        row.schedule = Some("{broken".to_string());
        assert_eq!(plan_migration(&row), Err(MigrationSkipped::UnreadableSchedule));
    }

    #[test]
    fn test_plan_treats_empty_object_as_unpopulated() {
        let mut row = legacy_row("2025-11-03", "09:00", "13:00");
        row.schedule = Some("{}".to_string());
        assert!(plan_migration(&row).is_ok());
    }

    #[test]
    fn test_plan_reports_unmigratable_rows() {
        let mut row = legacy_row("2025-11-03", "09:00", "13:00");
        row.legacy_end = None;
        assert_eq!(plan_migration(&row), Err(MigrationSkipped::NoLegacyFields));

        let row = legacy_row("sometime", "09:00", "13:00");
        assert!(matches!(plan_migration(&row), Err(MigrationSkipped::InvalidLegacy(_))));

        let row = legacy_row("2025-11-03", "14:00", "13:00");
        assert!(matches!(plan_migration(&row), Err(MigrationSkipped::InvalidLegacy(_))));
    }
}
