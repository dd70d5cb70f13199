//! Enrollment workflow.
//!
//! Per (user, course) the state is `NotEnrolled` or `Enrolled`; a paid
//! course passes through `PaymentPending` while the user's stored checkout
//! session id is set.
//!
//! ```text
//! NotEnrolled --free_enrollment (free course)--> Enrolled
//! NotEnrolled --paid_enrollment (paid course)--> PaymentPending
//! PaymentPending --stripe_success (status=paid)--> Enrolled
//! PaymentPending --stripe_success (otherwise)--> PaymentPending
//! ```

use edemy_domain::id::{CourseId, UserId};

use crate::domain::repository::{
    CourseRepository, EnrollmentRepository, PaymentGateway, UserRepository,
};
use crate::domain::types::{CheckoutRequest, Course, PaymentStatus};
use crate::error::MarketplaceError;

async fn load_course<C: CourseRepository>(
    courses: &C,
    course_id: CourseId,
) -> Result<Course, MarketplaceError> {
    courses
        .find_by_id(course_id)
        .await?
        .ok_or(MarketplaceError::CourseNotFound)
}

// ── Check ────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct CheckEnrollmentOutput {
    pub ok: bool,
    pub course: Course,
}

pub struct CheckEnrollmentUseCase<C: CourseRepository, E: EnrollmentRepository> {
    pub courses: C,
    pub enrollments: E,
}

impl<C: CourseRepository, E: EnrollmentRepository> CheckEnrollmentUseCase<C, E> {
    pub async fn execute(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<CheckEnrollmentOutput, MarketplaceError> {
        let course = load_course(&self.courses, course_id).await?;
        let ok = self.enrollments.is_enrolled(user_id, course_id).await?;
        let course = if ok || course.is_owned_by(user_id) {
            course
        } else {
            course.redacted()
        };
        Ok(CheckEnrollmentOutput { ok, course })
    }
}

// ── Free ─────────────────────────────────────────────────────────────────────

pub struct FreeEnrollmentUseCase<C: CourseRepository, E: EnrollmentRepository> {
    pub courses: C,
    pub enrollments: E,
}

impl<C: CourseRepository, E: EnrollmentRepository> FreeEnrollmentUseCase<C, E> {
    /// Enroll in a free course. Repeating the call leaves a single enrollment.
    pub async fn execute(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Course, MarketplaceError> {
        let course = load_course(&self.courses, course_id).await?;
        if course.paid {
            return Err(MarketplaceError::InvalidOperation(
                "course requires payment",
            ));
        }
        self.enrollments.enroll(user_id, course_id).await?;
        tracing::info!(user_id = %user_id, course_id = %course_id, "free enrollment");
        Ok(course)
    }
}

// ── Paid ─────────────────────────────────────────────────────────────────────

pub struct PaidEnrollmentUseCase<U, C, E, P>
where
    U: UserRepository,
    C: CourseRepository,
    E: EnrollmentRepository,
    P: PaymentGateway,
{
    pub users: U,
    pub courses: C,
    pub enrollments: E,
    pub payments: P,
}

impl<U, C, E, P> PaidEnrollmentUseCase<U, C, E, P>
where
    U: UserRepository,
    C: CourseRepository,
    E: EnrollmentRepository,
    P: PaymentGateway,
{
    /// Open a checkout session for a paid course and remember it on the
    /// user. Returns the session id for the client-side redirect.
    pub async fn execute(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<String, MarketplaceError> {
        let course = load_course(&self.courses, course_id).await?;
        if !course.paid {
            return Err(MarketplaceError::InvalidOperation("course is free"));
        }
        if self.enrollments.is_enrolled(user_id, course_id).await? {
            return Err(MarketplaceError::InvalidOperation("already enrolled"));
        }

        let destination_account = self
            .users
            .find_by_id(course.instructor.id)
            .await?
            .and_then(|instructor| instructor.stripe_account_id)
            .ok_or(MarketplaceError::InvalidOperation(
                "instructor cannot accept payments",
            ))?;

        let request = CheckoutRequest {
            course_id,
            course_title: course.title.clone(),
            amount_cents: course.price.cents(),
            fee_cents: course.price.platform_fee(),
            destination_account,
        };
        let session = self.payments.create_checkout(&request).await?;

        // The processor session exists from here on; a failed write orphans it.
        if let Err(e) = self
            .enrollments
            .set_pending_session(user_id, &session.id)
            .await
        {
            tracing::error!(
                user_id = %user_id,
                course_id = %course_id,
                session_id = %session.id,
                error = %e,
                "checkout session created but not recorded"
            );
            return Err(e);
        }

        tracing::info!(
            user_id = %user_id,
            course_id = %course_id,
            session_id = %session.id,
            "checkout session created"
        );
        Ok(session.id)
    }
}

// ── Confirmation ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct StripeSuccessOutput {
    /// Whether the user is enrolled after this call.
    pub success: bool,
    pub course: Course,
}

pub struct StripeSuccessUseCase<C, E, P>
where
    C: CourseRepository,
    E: EnrollmentRepository,
    P: PaymentGateway,
{
    pub courses: C,
    pub enrollments: E,
    pub payments: P,
}

impl<C, E, P> StripeSuccessUseCase<C, E, P>
where
    C: CourseRepository,
    E: EnrollmentRepository,
    P: PaymentGateway,
{
    /// Reconcile the pending checkout session. Safe to poll: an unpaid
    /// session leaves state unchanged, and a repeat call after enrollment
    /// reports success without touching the processor.
    pub async fn execute(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<StripeSuccessOutput, MarketplaceError> {
        let course = load_course(&self.courses, course_id).await?;

        let Some(session_id) = self.enrollments.pending_session(user_id).await? else {
            if self.enrollments.is_enrolled(user_id, course_id).await? {
                return Ok(StripeSuccessOutput {
                    success: true,
                    course,
                });
            }
            return Err(MarketplaceError::NoPendingPayment);
        };

        let session = self.payments.retrieve_checkout(&session_id).await?;
        if session.course_id.is_some_and(|id| id != course_id) {
            return Err(MarketplaceError::InvalidOperation(
                "payment session belongs to another course",
            ));
        }

        if session.payment_status != PaymentStatus::Paid {
            let enrolled = self.enrollments.is_enrolled(user_id, course_id).await?;
            return Ok(StripeSuccessOutput {
                success: enrolled,
                course,
            });
        }

        let confirmed = self
            .enrollments
            .confirm_payment(user_id, course_id, &session_id)
            .await?;
        if !confirmed {
            // Another request replaced or cleared the pending session first.
            let enrolled = self.enrollments.is_enrolled(user_id, course_id).await?;
            return Ok(StripeSuccessOutput {
                success: enrolled,
                course,
            });
        }
        tracing::info!(
            user_id = %user_id,
            course_id = %course_id,
            session_id = %session_id,
            "payment confirmed"
        );
        Ok(StripeSuccessOutput {
            success: true,
            course,
        })
    }
}

// ── Enrolled courses ─────────────────────────────────────────────────────────

pub struct UserCoursesUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> UserCoursesUseCase<C> {
    pub async fn execute(&self, user_id: UserId) -> Result<Vec<Course>, MarketplaceError> {
        self.courses.list_enrolled(user_id).await
    }
}
