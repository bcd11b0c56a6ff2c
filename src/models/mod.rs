pub mod course;
pub mod schedule;

pub use course::{Course, CourseRow, NewCourseRequest};
pub use schedule::{Schedule, ScheduleDraft, TimeSlot};
