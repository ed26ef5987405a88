pub mod academic_years;
pub mod auth;
pub mod classes;
pub mod dashboard;
pub mod enrollments;
pub mod students;
pub mod subjects;
pub mod teachers;
pub mod users;
