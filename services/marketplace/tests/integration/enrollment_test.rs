use edemy_domain::id::{CourseId, UserId};

use edemy_marketplace::domain::repository::EnrollmentRepository;
use edemy_marketplace::domain::types::PaymentStatus;
use edemy_marketplace::error::MarketplaceError;
use edemy_marketplace::usecase::enrollment::{
    CheckEnrollmentUseCase, FreeEnrollmentUseCase, PaidEnrollmentUseCase, StripeSuccessUseCase,
    UserCoursesUseCase,
};

use crate::helpers::{
    InMemoryStore, MockPayments, seed_course, seed_instructor, seed_lesson, seed_user,
};

fn paid_usecase(
    store: &InMemoryStore,
    payments: &MockPayments,
) -> PaidEnrollmentUseCase<InMemoryStore, InMemoryStore, InMemoryStore, MockPayments> {
    PaidEnrollmentUseCase {
        users: store.clone(),
        courses: store.clone(),
        enrollments: store.clone(),
        payments: payments.clone(),
    }
}

fn success_usecase(
    store: &InMemoryStore,
    payments: &MockPayments,
) -> StripeSuccessUseCase<InMemoryStore, InMemoryStore, MockPayments> {
    StripeSuccessUseCase {
        courses: store.clone(),
        enrollments: store.clone(),
        payments: payments.clone(),
    }
}

// ── Check ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_enrollment_and_redact_for_outsiders() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let student = seed_user(&store, "Ana", "ana@x.com").await;
    let course = seed_course(&store, instructor.id, "Intro to Rust", 0, false).await;
    seed_lesson(&store, course.id, "Ownership", false).await;
    let usecase = CheckEnrollmentUseCase {
        courses: store.clone(),
        enrollments: store.clone(),
    };

    let out = usecase.execute(student.id, course.id).await.unwrap();
    assert!(!out.ok);
    assert!(out.course.lessons[0].content.is_none());

    store.enroll(student.id, course.id).await.unwrap();
    let out = usecase.execute(student.id, course.id).await.unwrap();
    assert!(out.ok);
    assert!(out.course.lessons[0].content.is_some());
}

// ── Free ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_enroll_in_free_course_once() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let student = seed_user(&store, "Ana", "ana@x.com").await;
    let course = seed_course(&store, instructor.id, "Intro to Rust", 0, false).await;
    let usecase = FreeEnrollmentUseCase {
        courses: store.clone(),
        enrollments: store.clone(),
    };

    usecase.execute(student.id, course.id).await.unwrap();
    usecase.execute(student.id, course.id).await.unwrap();

    assert_eq!(store.enrollment_count(student.id, course.id), 1);
    let courses = UserCoursesUseCase {
        courses: store.clone(),
    }
    .execute(student.id)
    .await
    .unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].id, course.id);
}

#[tokio::test]
async fn should_reject_free_enrollment_in_paid_course() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let student = seed_user(&store, "Ana", "ana@x.com").await;
    let course = seed_course(&store, instructor.id, "Intro to Rust", 999, true).await;

    let err = FreeEnrollmentUseCase {
        courses: store.clone(),
        enrollments: store.clone(),
    }
    .execute(student.id, course.id)
    .await
    .unwrap_err();

    assert!(matches!(err, MarketplaceError::InvalidOperation(_)));
    assert_eq!(store.enrollment_count(student.id, course.id), 0);
}

#[tokio::test]
async fn should_fail_enrollment_for_unknown_course() {
    let store = InMemoryStore::new();
    let student = seed_user(&store, "Ana", "ana@x.com").await;

    let err = FreeEnrollmentUseCase {
        courses: store.clone(),
        enrollments: store,
    }
    .execute(student.id, CourseId::new())
    .await
    .unwrap_err();
    assert!(matches!(err, MarketplaceError::CourseNotFound));
}

// ── Paid ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_open_checkout_with_platform_fee() {
    let store = InMemoryStore::new();
    let payments = MockPayments::new();
    let instructor = seed_instructor(&store).await;
    let student = seed_user(&store, "Ana", "ana@x.com").await;
    let course = seed_course(&store, instructor.id, "Intro to Rust", 10_000, true).await;

    let session_id = paid_usecase(&store, &payments)
        .execute(student.id, course.id)
        .await
        .unwrap();

    assert_eq!(session_id, "cs_test_1");
    assert_eq!(store.stored_session(student.id).as_deref(), Some("cs_test_1"));
    assert_eq!(store.enrollment_count(student.id, course.id), 0);

    let state = payments.state.lock().unwrap();
    let request = &state.checkouts[0];
    assert_eq!(request.amount_cents, 10_000);
    assert_eq!(request.fee_cents, 3_000);
    assert_eq!(request.destination_account, "acct_instructor");
    assert_eq!(request.course_title, "Intro to Rust");
}

#[tokio::test]
async fn should_reject_paid_enrollment_for_free_or_owned_course() {
    let store = InMemoryStore::new();
    let payments = MockPayments::new();
    let instructor = seed_instructor(&store).await;
    let student = seed_user(&store, "Ana", "ana@x.com").await;
    let free = seed_course(&store, instructor.id, "Free Course", 0, false).await;
    let paid = seed_course(&store, instructor.id, "Paid Course", 999, true).await;
    store.enroll(student.id, paid.id).await.unwrap();
    let usecase = paid_usecase(&store, &payments);

    let err = usecase.execute(student.id, free.id).await.unwrap_err();
    assert_eq!(err.to_string(), "course is free");

    let err = usecase.execute(student.id, paid.id).await.unwrap_err();
    assert_eq!(err.to_string(), "already enrolled");
    assert!(payments.state.lock().unwrap().checkouts.is_empty());
}

#[tokio::test]
async fn should_reject_paid_enrollment_when_instructor_has_no_account() {
    let store = InMemoryStore::new();
    let payments = MockPayments::new();
    let author = seed_user(&store, "Lee", "lee@x.com").await;
    let student = seed_user(&store, "Ana", "ana@x.com").await;
    let course = seed_course(&store, author.id, "Intro to Rust", 999, true).await;

    let err = paid_usecase(&store, &payments)
        .execute(student.id, course.id)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "instructor cannot accept payments");
}

#[tokio::test]
async fn should_not_record_session_when_checkout_fails() {
    let store = InMemoryStore::new();
    let payments = MockPayments::new();
    payments.state.lock().unwrap().fail_checkout = true;
    let instructor = seed_instructor(&store).await;
    let student = seed_user(&store, "Ana", "ana@x.com").await;
    let course = seed_course(&store, instructor.id, "Intro to Rust", 999, true).await;

    let err = paid_usecase(&store, &payments)
        .execute(student.id, course.id)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::Upstream(_)));
    assert!(store.stored_session(student.id).is_none());
}

// ── Confirmation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_keep_pending_while_session_unpaid() {
    let store = InMemoryStore::new();
    let payments = MockPayments::new();
    let instructor = seed_instructor(&store).await;
    let student = seed_user(&store, "Ana", "ana@x.com").await;
    let course = seed_course(&store, instructor.id, "Intro to Rust", 999, true).await;
    paid_usecase(&store, &payments)
        .execute(student.id, course.id)
        .await
        .unwrap();

    let out = success_usecase(&store, &payments)
        .execute(student.id, course.id)
        .await
        .unwrap();

    assert!(!out.success);
    assert_eq!(store.enrollment_count(student.id, course.id), 0);
    assert_eq!(store.stored_session(student.id).as_deref(), Some("cs_test_1"));
}

#[tokio::test]
async fn should_enroll_once_after_paid_session() {
    let store = InMemoryStore::new();
    let payments = MockPayments::new();
    let instructor = seed_instructor(&store).await;
    let student = seed_user(&store, "Ana", "ana@x.com").await;
    let course = seed_course(&store, instructor.id, "Intro to Rust", 999, true).await;
    paid_usecase(&store, &payments)
        .execute(student.id, course.id)
        .await
        .unwrap();
    payments.set_status(PaymentStatus::Paid);
    let usecase = success_usecase(&store, &payments);

    let first = usecase.execute(student.id, course.id).await.unwrap();
    let second = usecase.execute(student.id, course.id).await.unwrap();

    assert!(first.success);
    assert!(second.success);
    assert_eq!(store.enrollment_count(student.id, course.id), 1);
    assert!(store.stored_session(student.id).is_none());
    assert_eq!(payments.state.lock().unwrap().retrievals, 1);
}

#[tokio::test]
async fn should_fail_confirmation_without_pending_session() {
    let store = InMemoryStore::new();
    let payments = MockPayments::new();
    let instructor = seed_instructor(&store).await;
    let student = seed_user(&store, "Ana", "ana@x.com").await;
    let course = seed_course(&store, instructor.id, "Intro to Rust", 999, true).await;

    let err = success_usecase(&store, &payments)
        .execute(student.id, course.id)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::NoPendingPayment));
}

#[tokio::test]
async fn should_reject_session_recorded_for_another_course() {
    let store = InMemoryStore::new();
    let payments = MockPayments::new();
    let instructor = seed_instructor(&store).await;
    let student = seed_user(&store, "Ana", "ana@x.com").await;
    let first = seed_course(&store, instructor.id, "Intro to Rust", 999, true).await;
    let second = seed_course(&store, instructor.id, "Async Rust", 999, true).await;
    paid_usecase(&store, &payments)
        .execute(student.id, first.id)
        .await
        .unwrap();
    payments.set_status(PaymentStatus::Paid);

    let err = success_usecase(&store, &payments)
        .execute(student.id, second.id)
        .await
        .unwrap_err();

    assert!(matches!(err, MarketplaceError::InvalidOperation(_)));
    assert_eq!(store.enrollment_count(student.id, second.id), 0);
    assert!(store.stored_session(student.id).is_some());
}

/// Replaces the pending session right after it is read, as a concurrent
/// checkout for another course would.
#[derive(Clone)]
struct SessionSwappedAfterRead {
    store: InMemoryStore,
    replacement: &'static str,
}

impl EnrollmentRepository for SessionSwappedAfterRead {
    async fn is_enrolled(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<bool, MarketplaceError> {
        EnrollmentRepository::is_enrolled(&self.store, user_id, course_id).await
    }

    async fn enroll(&self, user_id: UserId, course_id: CourseId) -> Result<(), MarketplaceError> {
        EnrollmentRepository::enroll(&self.store, user_id, course_id).await
    }

    async fn pending_session(&self, user_id: UserId) -> Result<Option<String>, MarketplaceError> {
        let current = EnrollmentRepository::pending_session(&self.store, user_id).await?;
        EnrollmentRepository::set_pending_session(&self.store, user_id, self.replacement).await?;
        Ok(current)
    }

    async fn set_pending_session(
        &self,
        user_id: UserId,
        session_id: &str,
    ) -> Result<(), MarketplaceError> {
        EnrollmentRepository::set_pending_session(&self.store, user_id, session_id).await
    }

    async fn confirm_payment(
        &self,
        user_id: UserId,
        course_id: CourseId,
        session_id: &str,
    ) -> Result<bool, MarketplaceError> {
        EnrollmentRepository::confirm_payment(&self.store, user_id, course_id, session_id).await
    }
}

#[tokio::test]
async fn should_not_report_success_when_session_was_replaced_before_confirmation() {
    let store = InMemoryStore::new();
    let payments = MockPayments::new();
    let instructor = seed_instructor(&store).await;
    let student = seed_user(&store, "Ana", "ana@x.com").await;
    let course = seed_course(&store, instructor.id, "Intro to Rust", 999, true).await;
    paid_usecase(&store, &payments)
        .execute(student.id, course.id)
        .await
        .unwrap();
    payments.set_status(PaymentStatus::Paid);
    let usecase = StripeSuccessUseCase {
        courses: store.clone(),
        enrollments: SessionSwappedAfterRead {
            store: store.clone(),
            replacement: "cs_other_course",
        },
        payments: payments.clone(),
    };

    let out = usecase.execute(student.id, course.id).await.unwrap();

    assert!(!out.success);
    assert_eq!(store.enrollment_count(student.id, course.id), 0);
    assert_eq!(
        store.stored_session(student.id).as_deref(),
        Some("cs_other_course")
    );
}
