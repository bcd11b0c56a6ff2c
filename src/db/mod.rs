pub mod repository;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use crate::error::AppError;

/// Columns added after the first release; older files get them via `ALTER TABLE`.
const COURSE_COLUMNS: [&str; 8] = [
    "name",
    "venue",
    "start_date",
    "end_date",
    "schedule",
    "legacy_date",
    "legacy_start",
    "legacy_end",
];

/// Opens the single store handle shared by the whole process.
pub async fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Creates missing tables and upgrades the column set of older `courses` tables.
pub async fn prepare(db: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations").run(db).await?;
    ensure_course_columns(db).await?;
    Ok(())
}

async fn ensure_course_columns(db: &SqlitePool) -> Result<(), sqlx::Error> {
    for column in COURSE_COLUMNS {
        if table_has_column(db, "courses", column).await? {
            continue;
        }
        info!("adding missing column courses.{}", column);
        let sql = format!("ALTER TABLE courses ADD COLUMN {} TEXT", column);
        sqlx::query(&sql).execute(db).await?;
    }
    Ok(())
}

async fn table_has_column(db: &SqlitePool, table: &str, column: &str) -> Result<bool, sqlx::Error> {
    let sql = format!("SELECT name FROM pragma_table_info('{}')", table);
    let columns: Vec<(String,)> = sqlx::query_as(&sql).fetch_all(db).await?;
    Ok(columns.iter().any(|(name,)| name == column))
}
