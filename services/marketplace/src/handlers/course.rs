use axum::extract::State;
use serde::Deserialize;

use edemy_auth_types::session::Session;
use edemy_domain::id::CourseId;
use edemy_domain::pagination::PageRequest;

use crate::domain::types::{Course, StoredObject};
use crate::error::MarketplaceError;
use crate::extract::{Json, Path, Query};
use crate::state::AppState;
use crate::usecase::course::{
    CreateCourseInput, CreateCourseUseCase, InstructorCoursesUseCase, ListCoursesUseCase,
    PublishCourseUseCase, ReadCourseUseCase, ReadFullCourseUseCase, RemoveCourseImageUseCase,
    UpdateCourseInput, UpdateCourseUseCase,
};

// ── POST /api/course ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateCourseRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Option<f64>,
    pub image: Option<StoredObject>,
    pub category: Option<String>,
    pub paid: Option<bool>,
}

pub async fn create_course(
    session: Session,
    State(state): State<AppState>,
    Json(body): Json<CreateCourseRequest>,
) -> Result<Json<Course>, MarketplaceError> {
    let usecase = CreateCourseUseCase {
        users: state.user_repo(),
        courses: state.course_repo(),
    };
    let course = usecase
        .execute(
            session.user_id,
            CreateCourseInput {
                title: body.title,
                description: body.description,
                price: body.price,
                image: body.image,
                category: body.category,
                paid: body.paid,
            },
        )
        .await?;
    Ok(Json(course))
}

// ── PUT /api/course/{slug} ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image: Option<StoredObject>,
    pub category: Option<String>,
    pub paid: Option<bool>,
}

pub async fn update_course(
    session: Session,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, MarketplaceError> {
    let usecase = UpdateCourseUseCase {
        courses: state.course_repo(),
    };
    let course = usecase
        .execute(
            session.user_id,
            &slug,
            UpdateCourseInput {
                title: body.title,
                description: body.description,
                price: body.price,
                image: body.image,
                category: body.category,
                paid: body.paid,
            },
        )
        .await?;
    Ok(Json(course))
}

// ── GET /api/course/{slug} ───────────────────────────────────────────────────

pub async fn read_course(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Course>, MarketplaceError> {
    let usecase = ReadCourseUseCase {
        courses: state.course_repo(),
    };
    Ok(Json(usecase.execute(&slug).await?))
}

// ── GET /api/user/course/{slug} ──────────────────────────────────────────────

pub async fn read_full_course(
    session: Session,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Course>, MarketplaceError> {
    let usecase = ReadFullCourseUseCase {
        courses: state.course_repo(),
        enrollments: state.enrollment_repo(),
    };
    Ok(Json(usecase.execute(session.user_id, &slug).await?))
}

// ── GET /api/courses ─────────────────────────────────────────────────────────

pub async fn list_courses(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<Course>>, MarketplaceError> {
    let usecase = ListCoursesUseCase {
        courses: state.course_repo(),
    };
    Ok(Json(usecase.execute(page).await?))
}

// ── GET /api/instructor-courses ──────────────────────────────────────────────

pub async fn instructor_courses(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<Vec<Course>>, MarketplaceError> {
    let usecase = InstructorCoursesUseCase {
        users: state.user_repo(),
        courses: state.course_repo(),
    };
    Ok(Json(usecase.execute(session.user_id).await?))
}

// ── PUT /api/course/publish/{course_id}, /api/course/unpublish/{course_id} ───

async fn set_published(
    session: Session,
    state: AppState,
    course_id: CourseId,
    published: bool,
) -> Result<Json<Course>, MarketplaceError> {
    let usecase = PublishCourseUseCase {
        courses: state.course_repo(),
    };
    let course = usecase
        .execute(session.user_id, course_id, published)
        .await?;
    Ok(Json(course))
}

pub async fn publish_course(
    session: Session,
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<Course>, MarketplaceError> {
    set_published(session, state, course_id, true).await
}

pub async fn unpublish_course(
    session: Session,
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<Course>, MarketplaceError> {
    set_published(session, state, course_id, false).await
}

// ── PUT /api/course/remove-imagedb/{slug} ────────────────────────────────────

pub async fn remove_course_image(
    session: Session,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Course>, MarketplaceError> {
    let usecase = RemoveCourseImageUseCase {
        courses: state.course_repo(),
        storage: state.storage.clone(),
    };
    Ok(Json(usecase.execute(session.user_id, &slug).await?))
}
