use axum::extract::State;
use serde::Deserialize;

use edemy_auth_types::session::Session;
use edemy_domain::id::{LessonId, UserId};

use crate::domain::types::{Course, StoredObject};
use crate::error::MarketplaceError;
use crate::extract::{Json, Path};
use crate::state::AppState;
use crate::usecase::lesson::{
    AddLessonInput, AddLessonUseCase, RemoveLessonUseCase, UpdateLessonInput, UpdateLessonUseCase,
};

// ── POST /api/course/lesson/{slug}/{instructor_id} ───────────────────────────

#[derive(Deserialize)]
pub struct AddLessonRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub video: Option<StoredObject>,
    #[serde(default)]
    pub free_preview: bool,
}

pub async fn add_lesson(
    session: Session,
    State(state): State<AppState>,
    Path((slug, instructor_id)): Path<(String, UserId)>,
    Json(body): Json<AddLessonRequest>,
) -> Result<Json<Course>, MarketplaceError> {
    let usecase = AddLessonUseCase {
        courses: state.course_repo(),
    };
    let course = usecase
        .execute(
            session.user_id,
            &slug,
            instructor_id,
            AddLessonInput {
                title: body.title,
                content: body.content,
                video: body.video,
                free_preview: body.free_preview,
            },
        )
        .await?;
    Ok(Json(course))
}

// ── PUT /api/course/lesson/{slug}/{instructor_id} ────────────────────────────

#[derive(Deserialize)]
pub struct UpdateLessonRequest {
    pub id: LessonId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub video: Option<StoredObject>,
    #[serde(default)]
    pub free_preview: bool,
}

pub async fn update_lesson(
    session: Session,
    State(state): State<AppState>,
    Path((slug, instructor_id)): Path<(String, UserId)>,
    Json(body): Json<UpdateLessonRequest>,
) -> Result<Json<Course>, MarketplaceError> {
    let usecase = UpdateLessonUseCase {
        courses: state.course_repo(),
    };
    let course = usecase
        .execute(
            session.user_id,
            &slug,
            instructor_id,
            UpdateLessonInput {
                id: body.id,
                title: body.title,
                content: body.content,
                video: body.video,
                free_preview: body.free_preview,
            },
        )
        .await?;
    Ok(Json(course))
}

// ── PUT /api/course/{slug}/{lesson_id} ───────────────────────────────────────

pub async fn remove_lesson(
    session: Session,
    State(state): State<AppState>,
    Path((slug, lesson_id)): Path<(String, LessonId)>,
) -> Result<Json<Course>, MarketplaceError> {
    let usecase = RemoveLessonUseCase {
        courses: state.course_repo(),
    };
    Ok(Json(usecase.execute(session.user_id, &slug, lesson_id).await?))
}
