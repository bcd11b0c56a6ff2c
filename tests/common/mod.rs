#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime};
use coursebook::models::{NewCourseRequest, Schedule, TimeSlot};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Cheapest cost bcrypt accepts.
pub const TEST_COST: u32 = 4;

pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test db");

    coursebook::db::prepare(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("bad test date")
}

pub fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").expect("bad test time")
}

pub fn course_request(
    name: &str,
    start: &str,
    end: &str,
    days: &[(&str, &str, &str)],
) -> NewCourseRequest {
    let schedule: Schedule = days
        .iter()
        .map(|(d, s, e)| (date(d), TimeSlot::new(time(s), time(e))))
        .collect();

    NewCourseRequest {
        name: name.to_string(),
        venue: "Dewan Latihan".to_string(),
        start_date: date(start),
        end_date: date(end),
        schedule,
    }
}

pub async fn insert_raw_course(
    db: &SqlitePool,
    id: &str,
    schedule: Option<&str>,
    legacy: Option<(&str, &str, &str)>,
) {
    let (legacy_date, legacy_start, legacy_end) = match legacy {
        Some((d, s, e)) => (Some(d), Some(s), Some(e)),
        None => (None, None, None),
    };

    sqlx::query(
        r#"
        INSERT INTO courses (id, name, venue, schedule, legacy_date, legacy_start, legacy_end)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(format!("Kursus {}", id))
    .bind("Bilik Mesyuarat")
    .bind(schedule)
    .bind(legacy_date)
    .bind(legacy_start)
    .bind(legacy_end)
    .execute(db)
    .await
    .expect("Failed to insert raw course");
}
