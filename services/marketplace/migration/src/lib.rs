pub use sea_orm_migration::prelude::*;

mod m20261015_000001_create_users;
mod m20261015_000002_create_courses;
mod m20261015_000003_create_lessons;
mod m20261015_000004_create_enrollments;
mod m20261015_000005_create_completed_lessons;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261015_000001_create_users::Migration),
            Box::new(m20261015_000002_create_courses::Migration),
            Box::new(m20261015_000003_create_lessons::Migration),
            Box::new(m20261015_000004_create_enrollments::Migration),
            Box::new(m20261015_000005_create_completed_lessons::Migration),
        ]
    }
}
