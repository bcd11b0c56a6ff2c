use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::models::course::DATE_FORMAT;
use crate::models::{CourseRow, NewCourseRequest};

pub async fn fetch_course_rows(db: &SqlitePool) -> Result<Vec<CourseRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseRow>(
        r#"
        SELECT
            id, name, venue, start_date, end_date, schedule,
            legacy_date, legacy_start, legacy_end
        FROM courses
        ORDER BY rowid
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn insert_course(
    db: &SqlitePool,
    id: &str,
    req: &NewCourseRequest,
    schedule_blob: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO courses
            (id, name, venue, start_date, end_date, schedule)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.venue)
    .bind(req.start_date.format(DATE_FORMAT).to_string())
    .bind(req.end_date.format(DATE_FORMAT).to_string())
    .bind(schedule_blob)
    .execute(db)
    .await?;

    Ok(())
}

/// Writes a synthesized schedule and widens the course range to cover the legacy date.
pub async fn set_migrated_schedule(
    db: &SqlitePool,
    id: &str,
    schedule_blob: &str,
    legacy_date: NaiveDate,
) -> Result<bool, sqlx::Error> {
    let date = legacy_date.format(DATE_FORMAT).to_string();
    let result = sqlx::query(
        r#"
        UPDATE courses
        SET schedule = ?1,
            start_date = MIN(COALESCE(NULLIF(TRIM(start_date), ''), ?2), ?2),
            end_date = MAX(COALESCE(NULLIF(TRIM(end_date), ''), ?2), ?2)
        WHERE id = ?3
        "#,
    )
    .bind(schedule_blob)
    .bind(date)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn count_credentials(db: &SqlitePool) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM credentials")
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn insert_credential(
    db: &SqlitePool,
    username: &str,
    password_hash: &[u8],
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO credentials (username, password_hash) VALUES (?1, ?2)")
        .bind(username)
        .bind(password_hash)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn find_password_hash(
    db: &SqlitePool,
    username: &str,
) -> Result<Option<Vec<u8>>, sqlx::Error> {
    let row: Option<(Vec<u8>,)> =
        sqlx::query_as("SELECT password_hash FROM credentials WHERE username = ?1")
            .bind(username)
            .fetch_optional(db)
            .await?;
    Ok(row.map(|(hash,)| hash))
}
