pub mod analytics;
pub mod assignments;
pub mod core;
pub mod exams;
pub mod students;
