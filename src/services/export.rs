use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::AppError;
use crate::models::Course;
use crate::models::course::DATE_FORMAT;

pub const EXPORT_HEADERS: [&str; 5] = ["Name", "Venue", "Start Date", "End Date", "Time"];

/// One course flattened to a single table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub name: String,
    pub venue: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub time: String,
}

/// Multi-day courses report only their first day's time window.
pub fn flatten(courses: &[Course]) -> Vec<ExportRow> {
    courses
        .iter()
        .map(|course| ExportRow {
            name: course.name.clone(),
            venue: course.venue.clone(),
            start_date: course.start_date,
            end_date: course.end_date,
            time: course
                .first_day()
                .map(|(_, slot)| slot.display_range())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}

pub fn write_csv<W: Write>(rows: &[ExportRow], out: W) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(EXPORT_HEADERS)?;

    for row in rows {
        let start = format_date(row.start_date);
        let end = format_date(row.end_date);
        writer.write_record([
            row.name.as_str(),
            row.venue.as_str(),
            start.as_str(),
            end.as_str(),
            row.time.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn export_csv(courses: &[Course]) -> Result<Vec<u8>, AppError> {
    let mut buffer = Vec::new();
    write_csv(&flatten(courses), &mut buffer)?;
    Ok(buffer)
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}
