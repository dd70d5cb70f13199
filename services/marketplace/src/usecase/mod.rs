pub mod auth;
pub mod course;
pub mod enrollment;
pub mod instructor;
pub mod lesson;
pub mod media;
pub mod progress;
