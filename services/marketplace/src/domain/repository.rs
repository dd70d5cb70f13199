#![allow(async_fn_in_trait)]

use bytes::Bytes;

use edemy_domain::id::{CourseId, LessonId, UserId};
use edemy_domain::pagination::PageRequest;

use crate::domain::types::{
    CheckoutRequest, CheckoutSession, Course, CoursePatch, Credentials, EmailMessage,
    LessonUpdate, NewCourse, NewLesson, NewUser, PaymentAccount, StoredObject, User,
};
use crate::error::MarketplaceError;

// ── Persistence ──────────────────────────────────────────────────────────────

/// Accounts, roles, and the per-user payment fields.
pub trait UserRepository: Send + Sync {
    /// Insert a user with the `Subscriber` role. `EmailTaken` on duplicate email.
    async fn create(&self, user: &NewUser) -> Result<User, MarketplaceError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, MarketplaceError>;

    async fn find_credentials(&self, email: &str)
    -> Result<Option<Credentials>, MarketplaceError>;

    /// Store a reset code. Returns `false` if no user has this email.
    async fn set_reset_code(&self, email: &str, code: &str) -> Result<bool, MarketplaceError>;

    /// Replace the password hash and clear the code, only where both email
    /// and code match. Returns whether a row was updated.
    async fn reset_password(
        &self,
        email: &str,
        code: &str,
        password_hash: &str,
    ) -> Result<bool, MarketplaceError>;

    async fn set_stripe_account(
        &self,
        id: UserId,
        account_id: &str,
    ) -> Result<(), MarketplaceError>;

    /// Add the `Instructor` role (no-op if present) and store the account snapshot.
    async fn promote_instructor(
        &self,
        id: UserId,
        seller: serde_json::Value,
    ) -> Result<User, MarketplaceError>;
}

/// Courses and their lessons.
pub trait CourseRepository: Send + Sync {
    /// `SlugTaken` on duplicate slug.
    async fn create(&self, course: &NewCourse) -> Result<Course, MarketplaceError>;

    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, MarketplaceError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Course>, MarketplaceError>;

    /// Published courses, newest first.
    async fn list_published(&self, page: PageRequest) -> Result<Vec<Course>, MarketplaceError>;

    /// All courses of one instructor, newest first.
    async fn list_by_instructor(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<Course>, MarketplaceError>;

    /// Courses the user is enrolled in, most recent enrollment first.
    async fn list_enrolled(&self, user_id: UserId) -> Result<Vec<Course>, MarketplaceError>;

    async fn update(&self, id: CourseId, patch: &CoursePatch) -> Result<Course, MarketplaceError>;

    async fn set_image(
        &self,
        id: CourseId,
        image: Option<StoredObject>,
    ) -> Result<Course, MarketplaceError>;

    async fn set_published(&self, id: CourseId, published: bool)
    -> Result<Course, MarketplaceError>;

    async fn add_lesson(&self, lesson: &NewLesson) -> Result<Course, MarketplaceError>;

    /// Returns `false` if the lesson does not exist in this course.
    async fn update_lesson(
        &self,
        course_id: CourseId,
        lesson_id: LessonId,
        update: &LessonUpdate,
    ) -> Result<bool, MarketplaceError>;

    /// Returns `false` if the lesson does not exist in this course.
    async fn remove_lesson(
        &self,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<bool, MarketplaceError>;
}

/// Enrollment set and the in-flight payment session.
pub trait EnrollmentRepository: Send + Sync {
    async fn is_enrolled(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<bool, MarketplaceError>;

    /// Idempotent set-union.
    async fn enroll(&self, user_id: UserId, course_id: CourseId) -> Result<(), MarketplaceError>;

    async fn pending_session(&self, user_id: UserId) -> Result<Option<String>, MarketplaceError>;

    async fn set_pending_session(
        &self,
        user_id: UserId,
        session_id: &str,
    ) -> Result<(), MarketplaceError>;

    /// Atomically clear the pending session (only if it is still `session_id`)
    /// and enroll. Returns `false` if the session had already been cleared.
    async fn confirm_payment(
        &self,
        user_id: UserId,
        course_id: CourseId,
        session_id: &str,
    ) -> Result<bool, MarketplaceError>;
}

/// Completed-lesson sets per (user, course).
pub trait ProgressRepository: Send + Sync {
    /// Idempotent set-union.
    async fn mark_completed(
        &self,
        user_id: UserId,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<(), MarketplaceError>;

    /// Absent lessons are ignored.
    async fn mark_incompleted(
        &self,
        user_id: UserId,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<(), MarketplaceError>;

    async fn list_completed(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Vec<LessonId>, MarketplaceError>;
}

// ── External services ────────────────────────────────────────────────────────

/// Payment processor with connected accounts and hosted checkout.
pub trait PaymentGateway: Send + Sync {
    async fn create_account(&self, email: &str) -> Result<String, MarketplaceError>;

    /// Onboarding link for an account; returns the link URL.
    async fn create_account_link(&self, account_id: &str) -> Result<String, MarketplaceError>;

    async fn retrieve_account(&self, account_id: &str)
    -> Result<PaymentAccount, MarketplaceError>;

    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, MarketplaceError>;

    async fn retrieve_checkout(&self, session_id: &str)
    -> Result<CheckoutSession, MarketplaceError>;
}

pub trait ObjectStore: Send + Sync {
    /// Bucket that `put` writes to and `delete` accepts.
    fn bucket(&self) -> &str;

    async fn put(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, MarketplaceError>;

    async fn delete(&self, key: &str) -> Result<(), MarketplaceError>;
}

pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MarketplaceError>;
}
