use edemy_domain::id::{CourseId, UserId};
use edemy_domain::pagination::PageRequest;
use edemy_domain::price::Price;
use edemy_domain::slug::slugify;
use edemy_domain::user::Role;

use crate::domain::repository::{
    CourseRepository, EnrollmentRepository, ObjectStore, UserRepository,
};
use crate::domain::types::{
    Course, CoursePatch, NewCourse, StoredObject, TITLE_MAX_LEN, TITLE_MIN_LEN,
};
use crate::error::MarketplaceError;

// ── Validation ───────────────────────────────────────────────────────────────

/// Trimmed title within bounds, together with its non-empty slug.
pub(crate) fn validate_title(title: &str) -> Result<(String, String), MarketplaceError> {
    let title = title.trim();
    let len = title.chars().count();
    if !(TITLE_MIN_LEN..=TITLE_MAX_LEN).contains(&len) {
        return Err(MarketplaceError::Validation(format!(
            "Title must be between {TITLE_MIN_LEN} and {TITLE_MAX_LEN} characters"
        )));
    }
    let slug = slugify(title);
    if slug.is_empty() {
        return Err(MarketplaceError::Validation(
            "Title must contain letters or digits".to_owned(),
        ));
    }
    Ok((title.to_owned(), slug))
}

/// First segments of static `/api/course/...` routes. A course with one of
/// these slugs could not be addressed by `/api/course/{slug}`.
pub const RESERVED_COURSE_SLUGS: &[&str] = &[
    "lesson",
    "publish",
    "remove-image",
    "remove-imagedb",
    "unpublish",
    "upload-image",
    "video-remove",
    "video-upload",
];

fn validate_course_slug(slug: &str) -> Result<(), MarketplaceError> {
    if RESERVED_COURSE_SLUGS.contains(&slug) {
        return Err(MarketplaceError::Validation(format!(
            "Title \"{slug}\" is reserved, choose another title"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<String, MarketplaceError> {
    let description = description.trim();
    if description.is_empty() {
        return Err(MarketplaceError::Validation(
            "Description is required".to_owned(),
        ));
    }
    Ok(description.to_owned())
}

fn validate_price(price: f64) -> Result<Price, MarketplaceError> {
    Price::from_dollars(price).map_err(|e| MarketplaceError::Validation(e.to_string()))
}

fn normalize_category(category: Option<String>) -> Option<String> {
    category
        .map(|c| c.trim().to_owned())
        .filter(|c| !c.is_empty())
}

/// Load a course by slug and require `user_id` to own it.
pub(crate) async fn load_owned_course<C: CourseRepository>(
    courses: &C,
    slug: &str,
    user_id: UserId,
) -> Result<Course, MarketplaceError> {
    let course = courses
        .find_by_slug(slug)
        .await?
        .ok_or(MarketplaceError::CourseNotFound)?;
    if !course.is_owned_by(user_id) {
        return Err(MarketplaceError::NotOwner);
    }
    Ok(course)
}

pub(crate) async fn require_instructor<U: UserRepository>(
    users: &U,
    user_id: UserId,
) -> Result<(), MarketplaceError> {
    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or(MarketplaceError::UserNotFound)?;
    if !user.has_role(Role::Instructor) {
        return Err(MarketplaceError::NotInstructor);
    }
    Ok(())
}

// ── Create ───────────────────────────────────────────────────────────────────

pub struct CreateCourseInput {
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    pub image: Option<StoredObject>,
    pub category: Option<String>,
    pub paid: Option<bool>,
}

pub struct CreateCourseUseCase<U: UserRepository, C: CourseRepository> {
    pub users: U,
    pub courses: C,
}

impl<U: UserRepository, C: CourseRepository> CreateCourseUseCase<U, C> {
    pub async fn execute(
        &self,
        instructor_id: UserId,
        input: CreateCourseInput,
    ) -> Result<Course, MarketplaceError> {
        require_instructor(&self.users, instructor_id).await?;

        let (title, slug) = validate_title(&input.title)?;
        validate_course_slug(&slug)?;
        let description = validate_description(&input.description)?;
        let price = input.price.map(validate_price).transpose()?.unwrap_or_default();

        if self.courses.find_by_slug(&slug).await?.is_some() {
            return Err(MarketplaceError::SlugTaken);
        }

        let course = self
            .courses
            .create(&NewCourse {
                id: CourseId::new(),
                slug,
                title,
                description,
                price,
                image: input.image,
                category: normalize_category(input.category),
                paid: input.paid.unwrap_or(true),
                instructor_id,
            })
            .await?;
        tracing::info!(user_id = %instructor_id, course_id = %course.id, "course created");
        Ok(course)
    }
}

// ── Update ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateCourseInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image: Option<StoredObject>,
    pub category: Option<String>,
    pub paid: Option<bool>,
}

pub struct UpdateCourseUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> UpdateCourseUseCase<C> {
    /// Patch a course. The slug is fixed at creation and does not follow the title.
    pub async fn execute(
        &self,
        user_id: UserId,
        slug: &str,
        input: UpdateCourseInput,
    ) -> Result<Course, MarketplaceError> {
        let course = load_owned_course(&self.courses, slug, user_id).await?;

        let patch = CoursePatch {
            title: input
                .title
                .as_deref()
                .map(validate_title)
                .transpose()?
                .map(|(title, _)| title),
            description: input
                .description
                .as_deref()
                .map(validate_description)
                .transpose()?,
            price: input.price.map(validate_price).transpose()?,
            image: input.image,
            category: normalize_category(input.category),
            paid: input.paid,
        };
        self.courses.update(course.id, &patch).await
    }
}

// ── Publish ──────────────────────────────────────────────────────────────────

pub struct PublishCourseUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> PublishCourseUseCase<C> {
    pub async fn execute(
        &self,
        user_id: UserId,
        course_id: CourseId,
        published: bool,
    ) -> Result<Course, MarketplaceError> {
        let course = self
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or(MarketplaceError::CourseNotFound)?;
        if !course.is_owned_by(user_id) {
            return Err(MarketplaceError::NotOwner);
        }
        let course = self.courses.set_published(course_id, published).await?;
        tracing::info!(
            user_id = %user_id,
            course_id = %course_id,
            published,
            "course publish state changed"
        );
        Ok(course)
    }
}

// ── Course image on the document ─────────────────────────────────────────────

pub struct RemoveCourseImageUseCase<C: CourseRepository, S: ObjectStore> {
    pub courses: C,
    pub storage: S,
}

impl<C: CourseRepository, S: ObjectStore> RemoveCourseImageUseCase<C, S> {
    /// Delete the stored image, then clear it from the course. Nothing is
    /// written locally if the delete fails.
    pub async fn execute(&self, user_id: UserId, slug: &str) -> Result<Course, MarketplaceError> {
        let course = load_owned_course(&self.courses, slug, user_id).await?;
        let Some(key) = course.image.as_ref().map(|image| image.key.clone()) else {
            return Ok(course);
        };
        self.storage.delete(&key).await?;
        self.courses.set_image(course.id, None).await
    }
}

// ── Reads ────────────────────────────────────────────────────────────────────

pub struct ReadCourseUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> ReadCourseUseCase<C> {
    /// Public view: non-preview lessons carry no content or video.
    pub async fn execute(&self, slug: &str) -> Result<Course, MarketplaceError> {
        self.courses
            .find_by_slug(slug)
            .await?
            .map(Course::redacted)
            .ok_or(MarketplaceError::CourseNotFound)
    }
}

pub struct ReadFullCourseUseCase<C: CourseRepository, E: EnrollmentRepository> {
    pub courses: C,
    pub enrollments: E,
}

impl<C: CourseRepository, E: EnrollmentRepository> ReadFullCourseUseCase<C, E> {
    /// Full view for enrolled users and the owning instructor.
    pub async fn execute(&self, user_id: UserId, slug: &str) -> Result<Course, MarketplaceError> {
        let course = self
            .courses
            .find_by_slug(slug)
            .await?
            .ok_or(MarketplaceError::CourseNotFound)?;
        if course.is_owned_by(user_id) || self.enrollments.is_enrolled(user_id, course.id).await? {
            return Ok(course);
        }
        Err(MarketplaceError::NotEnrolled)
    }
}

pub struct ListCoursesUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> ListCoursesUseCase<C> {
    pub async fn execute(&self, page: PageRequest) -> Result<Vec<Course>, MarketplaceError> {
        let courses = self.courses.list_published(page.clamped()).await?;
        Ok(courses.into_iter().map(Course::redacted).collect())
    }
}

pub struct InstructorCoursesUseCase<U: UserRepository, C: CourseRepository> {
    pub users: U,
    pub courses: C,
}

impl<U: UserRepository, C: CourseRepository> InstructorCoursesUseCase<U, C> {
    pub async fn execute(&self, user_id: UserId) -> Result<Vec<Course>, MarketplaceError> {
        require_instructor(&self.users, user_id).await?;
        self.courses.list_by_instructor(user_id).await
    }
}
