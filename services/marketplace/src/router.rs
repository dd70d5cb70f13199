use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use edemy_auth_types::csrf::require_csrf;
use edemy_core::error::not_found;
use edemy_core::health::healthz;
use edemy_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    auth::{csrf_token, current_user, forgot_password, login, logout, register, reset_password},
    course::{
        create_course, instructor_courses, list_courses, publish_course, read_course,
        read_full_course, remove_course_image, unpublish_course, update_course,
    },
    enrollment::{check_enrollment, free_enrollment, paid_enrollment, stripe_success, user_courses},
    health::readyz,
    instructor::{current_instructor, get_account_status, make_instructor},
    lesson::{add_lesson, remove_lesson, update_lesson},
    media::{remove_image, remove_video, upload_image, upload_video},
    progress::{list_completed, mark_completed, mark_incompleted},
};
use crate::state::AppState;

/// Request body limit for JSON routes (base64 images included).
pub const BODY_LIMIT: usize = 5 * 1024 * 1024;
/// Request body limit for the multipart video upload.
pub const VIDEO_BODY_LIMIT: usize = 512 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Identity
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", get(logout).post(logout))
        .route("/api/current-user", get(current_user))
        .route("/api/csrf-token", get(csrf_token))
        .route("/api/forgot-password", post(forgot_password))
        .route("/api/reset-password", post(reset_password))
        // Media
        .route("/api/course/upload-image", post(upload_image))
        .route("/api/course/remove-image", post(remove_image))
        .route(
            "/api/course/video-upload/{instructor_id}",
            post(upload_video).layer(DefaultBodyLimit::max(VIDEO_BODY_LIMIT)),
        )
        .route("/api/course/video-remove/{instructor_id}", post(remove_video))
        // Catalog
        .route("/api/course", post(create_course))
        .route("/api/course/{slug}", get(read_course).put(update_course))
        .route("/api/course/remove-imagedb/{slug}", put(remove_course_image))
        .route("/api/course/publish/{course_id}", put(publish_course))
        .route("/api/course/unpublish/{course_id}", put(unpublish_course))
        .route(
            "/api/course/lesson/{slug}/{instructor_id}",
            post(add_lesson).put(update_lesson),
        )
        .route("/api/course/{slug}/{lesson_id}", put(remove_lesson))
        .route("/api/courses", get(list_courses))
        .route("/api/user/course/{slug}", get(read_full_course))
        .route("/api/instructor-courses", get(instructor_courses))
        // Enrollment
        .route("/api/check-enrollment/{course_id}", get(check_enrollment))
        .route("/api/free-enrollment/{course_id}", post(free_enrollment))
        .route("/api/paid-enrollment/{course_id}", post(paid_enrollment))
        .route("/api/stripe-success/{course_id}", get(stripe_success))
        .route("/api/user-courses", get(user_courses))
        // Progress
        .route("/api/mark-completed", post(mark_completed))
        .route("/api/mark-incompleted", post(mark_incompleted))
        .route("/api/list-completed", post(list_completed))
        // Instructor
        .route("/api/make-instructor", post(make_instructor))
        .route("/api/get-account-status", post(get_account_status))
        .route("/api/current-instructor", get(current_instructor))
        .fallback(not_found)
        .layer(from_fn(require_csrf))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
