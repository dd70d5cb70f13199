use edemy_domain::id::{CourseId, LessonId, UserId};

use crate::domain::repository::{CourseRepository, ProgressRepository};
use crate::error::MarketplaceError;

pub struct MarkCompletedUseCase<C: CourseRepository, P: ProgressRepository> {
    pub courses: C,
    pub progress: P,
}

impl<C: CourseRepository, P: ProgressRepository> MarkCompletedUseCase<C, P> {
    pub async fn execute(
        &self,
        user_id: UserId,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<(), MarketplaceError> {
        let course = self
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or(MarketplaceError::CourseNotFound)?;
        if !course.has_lesson(lesson_id) {
            return Err(MarketplaceError::LessonNotFound);
        }
        self.progress
            .mark_completed(user_id, course_id, lesson_id)
            .await
    }
}

pub struct MarkIncompletedUseCase<P: ProgressRepository> {
    pub progress: P,
}

impl<P: ProgressRepository> MarkIncompletedUseCase<P> {
    pub async fn execute(
        &self,
        user_id: UserId,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<(), MarketplaceError> {
        self.progress
            .mark_incompleted(user_id, course_id, lesson_id)
            .await
    }
}

pub struct ListCompletedUseCase<P: ProgressRepository> {
    pub progress: P,
}

impl<P: ProgressRepository> ListCompletedUseCase<P> {
    /// Empty when nothing has been completed yet.
    pub async fn execute(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Vec<LessonId>, MarketplaceError> {
        self.progress.list_completed(user_id, course_id).await
    }
}
