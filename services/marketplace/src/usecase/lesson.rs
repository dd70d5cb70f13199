use edemy_domain::id::{LessonId, UserId};

use crate::domain::repository::CourseRepository;
use crate::domain::types::{Course, LessonUpdate, NewLesson, StoredObject};
use crate::error::MarketplaceError;
use crate::usecase::course::{load_owned_course, validate_title};

/// The instructor named in the path must be the caller.
fn require_self(caller: UserId, instructor_id: UserId) -> Result<(), MarketplaceError> {
    if caller != instructor_id {
        return Err(MarketplaceError::NotOwner);
    }
    Ok(())
}

pub struct AddLessonInput {
    pub title: String,
    pub content: String,
    pub video: Option<StoredObject>,
    pub free_preview: bool,
}

pub struct AddLessonUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> AddLessonUseCase<C> {
    pub async fn execute(
        &self,
        caller: UserId,
        slug: &str,
        instructor_id: UserId,
        input: AddLessonInput,
    ) -> Result<Course, MarketplaceError> {
        require_self(caller, instructor_id)?;
        let course = load_owned_course(&self.courses, slug, caller).await?;
        let (title, lesson_slug) = validate_title(&input.title)?;

        self.courses
            .add_lesson(&NewLesson {
                id: LessonId::new(),
                course_id: course.id,
                title,
                slug: lesson_slug,
                content: input.content,
                video: input.video,
                free_preview: input.free_preview,
            })
            .await
    }
}

pub struct UpdateLessonInput {
    pub id: LessonId,
    pub title: String,
    pub content: String,
    pub video: Option<StoredObject>,
    pub free_preview: bool,
}

pub struct UpdateLessonUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> UpdateLessonUseCase<C> {
    /// Replace every mutable field of the lesson and re-derive its slug.
    pub async fn execute(
        &self,
        caller: UserId,
        slug: &str,
        instructor_id: UserId,
        input: UpdateLessonInput,
    ) -> Result<Course, MarketplaceError> {
        require_self(caller, instructor_id)?;
        let course = load_owned_course(&self.courses, slug, caller).await?;
        let (title, lesson_slug) = validate_title(&input.title)?;

        let update = LessonUpdate {
            title,
            slug: lesson_slug,
            content: input.content,
            video: input.video,
            free_preview: input.free_preview,
        };
        if !self
            .courses
            .update_lesson(course.id, input.id, &update)
            .await?
        {
            return Err(MarketplaceError::LessonNotFound);
        }
        self.courses
            .find_by_id(course.id)
            .await?
            .ok_or(MarketplaceError::CourseNotFound)
    }
}

pub struct RemoveLessonUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> RemoveLessonUseCase<C> {
    pub async fn execute(
        &self,
        caller: UserId,
        slug: &str,
        lesson_id: LessonId,
    ) -> Result<Course, MarketplaceError> {
        let course = load_owned_course(&self.courses, slug, caller).await?;
        if !self.courses.remove_lesson(course.id, lesson_id).await? {
            return Err(MarketplaceError::LessonNotFound);
        }
        self.courses
            .find_by_id(course.id)
            .await?
            .ok_or(MarketplaceError::CourseNotFound)
    }
}
