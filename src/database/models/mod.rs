pub mod course;
pub mod lesson;
pub mod module;
pub mod progress;
