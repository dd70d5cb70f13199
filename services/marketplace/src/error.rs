use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Marketplace service error variants.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceError {
    #[error("{0}")]
    Validation(String),
    #[error("Email is already registered")]
    EmailTaken,
    #[error("a course with this title already exists")]
    SlugTaken,
    #[error("user not found")]
    UserNotFound,
    #[error("course not found")]
    CourseNotFound,
    #[error("lesson not found")]
    LessonNotFound,
    #[error("wrong email or password")]
    InvalidCredentials,
    #[error("invalid reset code")]
    InvalidResetCode,
    #[error("sign in required")]
    Unauthenticated,
    #[error("unauthorized")]
    ChargesNotEnabled,
    #[error("instructor role required")]
    NotInstructor,
    #[error("not the owner of this resource")]
    NotOwner,
    #[error("not enrolled in this course")]
    NotEnrolled,
    #[error("no pending payment for this course")]
    NoPendingPayment,
    #[error("{0}")]
    InvalidOperation(&'static str),
    #[error("upstream service error")]
    Upstream(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl MarketplaceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::SlugTaken => "SLUG_TAKEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::CourseNotFound => "COURSE_NOT_FOUND",
            Self::LessonNotFound => "LESSON_NOT_FOUND",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidResetCode => "INVALID_RESET_CODE",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::ChargesNotEnabled => "CHARGES_NOT_ENABLED",
            Self::NotInstructor => "NOT_INSTRUCTOR",
            Self::NotOwner => "NOT_OWNER",
            Self::NotEnrolled => "NOT_ENROLLED",
            Self::NoPendingPayment => "NO_PENDING_PAYMENT",
            Self::InvalidOperation(_) => "INVALID_OPERATION",
            Self::Upstream(_) => "UPSTREAM",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::EmailTaken
            | Self::SlugTaken
            | Self::UserNotFound
            | Self::CourseNotFound
            | Self::LessonNotFound
            | Self::InvalidCredentials
            | Self::InvalidResetCode
            | Self::NoPendingPayment
            | Self::InvalidOperation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated | Self::ChargesNotEnabled => StatusCode::UNAUTHORIZED,
            Self::NotInstructor | Self::NotOwner | Self::NotEnrolled => StatusCode::FORBIDDEN,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wrap a failed call to an external service.
    pub fn upstream(err: impl Into<anyhow::Error>, context: &'static str) -> Self {
        Self::Upstream(err.into().context(context))
    }
}

impl From<JsonRejection> for MarketplaceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for MarketplaceError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for MarketplaceError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for MarketplaceError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for MarketplaceError {
    fn into_response(self) -> Response {
        // TraceLayer records every status; only server-side and upstream
        // failures carry a cause chain worth logging.
        match &self {
            Self::Internal(e) => tracing::error!(error = ?e, kind = "INTERNAL", "internal error"),
            Self::Upstream(e) => tracing::error!(error = ?e, kind = "UPSTREAM", "upstream error"),
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (self.status(), axum::Json(body)).into_response()
    }
}
