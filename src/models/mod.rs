pub mod course;

pub use course::{
    Course, CourseChanges, CreateCourseRequest, ListCoursesParams, UpdateCourseRequest, DATE_FORMAT,
};
