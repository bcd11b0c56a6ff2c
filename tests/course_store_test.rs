mod common;

use coursebook::error::{AppError, ValidationError};
use coursebook::services::CourseStore;

use common::{course_request, date, insert_raw_course, setup_test_db};

#[tokio::test]
async fn test_save_then_load_returns_same_schedule() {
    let pool = setup_test_db().await;
    let store = CourseStore::new(pool);

    let req = course_request(
        "Kursus Integriti",
        "2026-04-06",
        "2026-04-08",
        &[
            ("2026-04-06", "09:00", "17:00"),
            ("2026-04-07", "08:30", "12:30"),
            ("2026-04-08", "14:00", "16:15"),
        ],
    );
    let saved = store.save(req.clone()).await.expect("Failed to save course");
    assert_eq!(saved.schedule, req.schedule);

    let courses = store.load_all().await.expect("Failed to load courses");
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0], saved);
    assert_eq!(courses[0].schedule, req.schedule);
    assert_eq!(courses[0].start_date, Some(date("2026-04-06")));
    assert_eq!(courses[0].end_date, Some(date("2026-04-08")));
}

#[tokio::test]
async fn test_each_save_gets_a_fresh_id() {
    let pool = setup_test_db().await;
    let store = CourseStore::new(pool);
    let req = course_request("A", "2026-04-06", "2026-04-06", &[("2026-04-06", "09:00", "10:00")]);

    let first = store.save(req.clone()).await.unwrap();
    let second = store.save(req).await.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(store.load_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_out_of_range_day_is_rejected_and_not_stored() {
    let pool = setup_test_db().await;
    let store = CourseStore::new(pool);

    let req = course_request(
        "Kursus Luar Julat",
        "2026-04-06",
        "2026-04-07",
        &[
            ("2026-04-06", "09:00", "17:00"),
            ("2026-04-09", "09:00", "17:00"),
        ],
    );
    let err = store.save(req).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::DateOutOfRange { .. })
    ));

    assert!(store.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_and_inverted_schedules_are_rejected() {
    let pool = setup_test_db().await;
    let store = CourseStore::new(pool);

    let empty = course_request("Kosong", "2026-04-06", "2026-04-07", &[]);
    assert!(matches!(
        store.save(empty).await,
        Err(AppError::Validation(ValidationError::EmptySchedule))
    ));

    let inverted = course_request("Terbalik", "2026-04-06", "2026-04-06", &[("2026-04-06", "17:00", "09:00")]);
    assert!(matches!(
        store.save(inverted).await,
        Err(AppError::Validation(ValidationError::InvertedTimeSlot { .. }))
    ));

    let backwards = course_request("Tarikh", "2026-04-07", "2026-04-06", &[("2026-04-06", "09:00", "10:00")]);
    assert!(matches!(
        store.save(backwards).await,
        Err(AppError::Validation(ValidationError::InvertedDateRange { .. }))
    ));

    assert!(store.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_corrupt_schedule_does_not_break_listing() {
    let pool = setup_test_db().await;
    let store = CourseStore::new(pool.clone());

    insert_raw_course(&pool, "broken", Some("{not json"), None).await;
    let good = store
        .save(course_request("Sah", "2026-04-06", "2026-04-06", &[("2026-04-06", "09:00", "10:00")]))
        .await
        .unwrap();

    let courses = store.load_all().await.expect("listing must not fail");
    assert_eq!(courses.len(), 2);

    let broken = courses.iter().find(|c| c.id == "broken").unwrap();
    assert!(broken.schedule.is_empty());

    let valid = courses.iter().find(|c| c.id == good.id).unwrap();
    assert_eq!(valid.schedule.len(), 1);
}

#[tokio::test]
async fn test_older_blob_field_names_are_read() {
    let pool = setup_test_db().await;
    let store = CourseStore::new(pool.clone());

    insert_raw_course(
        &pool,
        "older",
        Some(r#"{"2025-12-01":{"mula":"09:00","tamat":"11:00"}}"#),
        None,
    )
    .await;

    let courses = store.load_all().await.unwrap();
    let slot = courses[0].schedule[&date("2025-12-01")];
    assert_eq!(slot.display_range(), "09:00 - 11:00");
}

#[tokio::test]
async fn test_slot_that_collapses_to_one_minute_is_rejected() {
    let pool = setup_test_db().await;
    let store = CourseStore::new(pool);

    let mut req = course_request("Saat", "2026-04-06", "2026-04-06", &[]);
    req.schedule.insert(
        date("2026-04-06"),
        coursebook::models::TimeSlot {
            start: chrono::NaiveTime::from_hms_opt(9, 0, 10).unwrap(),
            end: chrono::NaiveTime::from_hms_opt(9, 0, 50).unwrap(),
        },
    );

    let err = store.save(req).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::InvertedTimeSlot { .. })
    ));
    assert!(store.load_all().await.unwrap().is_empty());
}
