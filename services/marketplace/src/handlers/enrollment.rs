use axum::extract::State;
use serde::Serialize;

use edemy_auth_types::session::Session;
use edemy_domain::id::CourseId;

use crate::domain::types::Course;
use crate::error::MarketplaceError;
use crate::extract::{Json, Path};
use crate::state::AppState;
use crate::usecase::enrollment::{
    CheckEnrollmentUseCase, FreeEnrollmentUseCase, PaidEnrollmentUseCase, StripeSuccessUseCase,
    UserCoursesUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CheckEnrollmentResponse {
    pub ok: bool,
    pub course: Course,
}

#[derive(Serialize)]
pub struct FreeEnrollmentResponse {
    pub message: &'static str,
    pub course: Course,
}

#[derive(Serialize)]
pub struct StripeSuccessResponse {
    pub success: bool,
    pub course: Course,
}

// ── GET /api/check-enrollment/{course_id} ────────────────────────────────────

pub async fn check_enrollment(
    session: Session,
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<CheckEnrollmentResponse>, MarketplaceError> {
    let usecase = CheckEnrollmentUseCase {
        courses: state.course_repo(),
        enrollments: state.enrollment_repo(),
    };
    let out = usecase.execute(session.user_id, course_id).await?;
    Ok(Json(CheckEnrollmentResponse {
        ok: out.ok,
        course: out.course,
    }))
}

// ── POST /api/free-enrollment/{course_id} ────────────────────────────────────

pub async fn free_enrollment(
    session: Session,
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<FreeEnrollmentResponse>, MarketplaceError> {
    let usecase = FreeEnrollmentUseCase {
        courses: state.course_repo(),
        enrollments: state.enrollment_repo(),
    };
    let course = usecase.execute(session.user_id, course_id).await?;
    Ok(Json(FreeEnrollmentResponse {
        message: "Congratulations! You have successfully enrolled",
        course,
    }))
}

// ── POST /api/paid-enrollment/{course_id} ────────────────────────────────────

/// Returns the checkout session id as a JSON string.
pub async fn paid_enrollment(
    session: Session,
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<String>, MarketplaceError> {
    let usecase = PaidEnrollmentUseCase {
        users: state.user_repo(),
        courses: state.course_repo(),
        enrollments: state.enrollment_repo(),
        payments: state.payments.clone(),
    };
    Ok(Json(usecase.execute(session.user_id, course_id).await?))
}

// ── GET /api/stripe-success/{course_id} ──────────────────────────────────────

pub async fn stripe_success(
    session: Session,
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<StripeSuccessResponse>, MarketplaceError> {
    let usecase = StripeSuccessUseCase {
        courses: state.course_repo(),
        enrollments: state.enrollment_repo(),
        payments: state.payments.clone(),
    };
    let out = usecase.execute(session.user_id, course_id).await?;
    Ok(Json(StripeSuccessResponse {
        success: out.success,
        course: out.course,
    }))
}

// ── GET /api/user-courses ────────────────────────────────────────────────────

pub async fn user_courses(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<Vec<Course>>, MarketplaceError> {
    let usecase = UserCoursesUseCase {
        courses: state.course_repo(),
    };
    Ok(Json(usecase.execute(session.user_id).await?))
}
