//! sea-orm entities for the marketplace database.

pub mod completed_lessons;
pub mod courses;
pub mod enrollments;
pub mod lessons;
pub mod user_roles;
pub mod users;
