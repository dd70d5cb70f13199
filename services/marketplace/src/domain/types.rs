use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use edemy_core::serde::to_rfc3339_ms;
use edemy_domain::id::{CourseId, LessonId, UserId};
use edemy_domain::price::Price;
use edemy_domain::user::Role;

// ── Identity ─────────────────────────────────────────────────────────────────

/// Public view of an account. Credentials never leave the user repository
/// through this type.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub picture: String,
    pub roles: Vec<Role>,
    pub stripe_account_id: Option<String>,
    pub stripe_seller: Option<serde_json::Value>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// A user together with the stored password hash, for login only.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Default avatar for new accounts.
pub const DEFAULT_PICTURE: &str = "/avatar.png";

/// Length of the one-time password reset code.
pub const RESET_CODE_LEN: usize = 6;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

// ── Media ────────────────────────────────────────────────────────────────────

/// Descriptor of an object held in object storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub url: String,
}

/// Reference to an object to delete. `url` is accepted but not needed.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

// ── Catalog ──────────────────────────────────────────────────────────────────

/// Public fields of a course's instructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instructor {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    pub slug: String,
    /// `None` once redacted for a non-enrolled reader.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub video: Option<StoredObject>,
    pub free_preview: bool,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub id: CourseId,
    pub slug: String,
    pub title: String,
    pub description: String,
    #[serde(serialize_with = "price_as_dollars")]
    pub price: Price,
    pub image: Option<StoredObject>,
    pub category: Option<String>,
    pub published: bool,
    pub paid: bool,
    pub instructor: Instructor,
    /// In insertion order.
    pub lessons: Vec<Lesson>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.instructor.id == user_id
    }

    pub fn has_lesson(&self, lesson_id: LessonId) -> bool {
        self.lessons.iter().any(|l| l.id == lesson_id)
    }

    /// Strip content and video from every lesson that is not a free preview.
    pub fn redacted(mut self) -> Self {
        for lesson in self.lessons.iter_mut().filter(|l| !l.free_preview) {
            lesson.content = None;
            lesson.video = None;
        }
        self
    }
}

fn price_as_dollars<S: Serializer>(price: &Price, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(price.as_dollars())
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub id: CourseId,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub image: Option<StoredObject>,
    pub category: Option<String>,
    pub paid: bool,
    pub instructor_id: UserId,
}

/// Fields to overwrite on a course; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct CoursePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub image: Option<StoredObject>,
    pub category: Option<String>,
    pub paid: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewLesson {
    pub id: LessonId,
    pub course_id: CourseId,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub video: Option<StoredObject>,
    pub free_preview: bool,
}

/// Replacement values for a lesson's mutable fields.
#[derive(Debug, Clone)]
pub struct LessonUpdate {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub video: Option<StoredObject>,
    pub free_preview: bool,
}

/// Course/lesson title bounds, in characters after trimming.
pub const TITLE_MIN_LEN: usize = 3;
pub const TITLE_MAX_LEN: usize = 320;

// ── Payments ─────────────────────────────────────────────────────────────────

/// Connected payment account as reported by the processor.
#[derive(Debug, Clone)]
pub struct PaymentAccount {
    pub id: String,
    pub charges_enabled: bool,
    /// Full account object, stored verbatim as the seller snapshot.
    pub raw: serde_json::Value,
}

/// Checkout for one course. The fee stays with the platform; the rest is
/// transferred to `destination_account`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub course_id: CourseId,
    pub course_title: String,
    pub amount_cents: i64,
    pub fee_cents: i64,
    pub destination_account: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    NoPaymentRequired,
    #[serde(other)]
    Unpaid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub payment_status: PaymentStatus,
    /// Course recorded in the session metadata at creation.
    pub course_id: Option<CourseId>,
}

// ── Email ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}
