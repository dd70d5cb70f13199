use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CompletedLessons::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CompletedLessons::UserId).uuid().not_null())
                    .col(ColumnDef::new(CompletedLessons::CourseId).uuid().not_null())
                    .col(ColumnDef::new(CompletedLessons::LessonId).uuid().not_null())
                    .col(
                        ColumnDef::new(CompletedLessons::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(CompletedLessons::UserId)
                            .col(CompletedLessons::CourseId)
                            .col(CompletedLessons::LessonId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CompletedLessons::Table, CompletedLessons::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CompletedLessons::Table, CompletedLessons::LessonId)
                            .to(Lessons::Table, Lessons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CompletedLessons::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CompletedLessons {
    Table,
    UserId,
    CourseId,
    LessonId,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Lessons {
    Table,
    Id,
}
