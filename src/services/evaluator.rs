use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::Serialize;

use crate::models::{Course, TimeSlot};

/// A day starting within this many minutes counts as imminent.
pub const LOOKAHEAD_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayPhase {
    UpcomingSoon,
    Active,
    UpcomingLater,
    Past,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayStatus {
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub phase: DayPhase,
}

/// One day-entry together with the course it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseDay {
    pub course_id: String,
    pub name: String,
    pub venue: String,
    pub status: DayStatus,
}

/// Day-entries of every course split by what needs attention right now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attention {
    pub active: Vec<CourseDay>,
    pub imminent: Vec<CourseDay>,
    pub idle: Vec<CourseDay>,
}

impl Attention {
    pub fn has_active_course(&self, course_id: &str) -> bool {
        self.active.iter().any(|d| d.course_id == course_id)
    }
}

pub fn lookahead() -> TimeDelta {
    TimeDelta::minutes(LOOKAHEAD_MINUTES)
}

/// Active wins at `now == start`; soon requires `now < start <= now + lookahead`.
pub fn classify(start: NaiveDateTime, end: NaiveDateTime, now: NaiveDateTime) -> DayPhase {
    if start <= now && now <= end {
        DayPhase::Active
    } else if now > end {
        DayPhase::Past
    } else if now < start && start <= now + lookahead() {
        DayPhase::UpcomingSoon
    } else {
        DayPhase::UpcomingLater
    }
}

pub fn evaluate(course: &Course, now: NaiveDateTime) -> Vec<DayStatus> {
    course
        .schedule
        .iter()
        .map(|(date, slot)| {
            let starts_at = date.and_time(slot.start);
            let ends_at = date.and_time(slot.end);
            DayStatus {
                date: *date,
                slot: *slot,
                starts_at,
                ends_at,
                phase: classify(starts_at, ends_at, now),
            }
        })
        .collect()
}

fn course_days<'a>(
    courses: &'a [Course],
    now: NaiveDateTime,
) -> impl Iterator<Item = CourseDay> + 'a {
    courses.iter().flat_map(move |course| {
        evaluate(course, now).into_iter().map(move |status| CourseDay {
            course_id: course.id.clone(),
            name: course.name.clone(),
            venue: course.venue.clone(),
            status,
        })
    })
}

pub fn partition(courses: &[Course], now: NaiveDateTime) -> Attention {
    let mut attention = Attention::default();
    for day in course_days(courses, now) {
        match day.status.phase {
            DayPhase::Active => attention.active.push(day),
            DayPhase::UpcomingSoon => attention.imminent.push(day),
            DayPhase::UpcomingLater | DayPhase::Past => attention.idle.push(day),
        }
    }
    attention
}

/// Running and not-yet-started days, earliest start first.
pub fn live_board(courses: &[Course], now: NaiveDateTime) -> Vec<CourseDay> {
    let mut board: Vec<CourseDay> = course_days(courses, now)
        .filter(|day| day.status.phase != DayPhase::Past)
        .collect();
    board.sort_by(|a, b| {
        a.status
            .starts_at
            .cmp(&b.status.starts_at)
            .then_with(|| a.name.cmp(&b.name))
    });
    board
}
