use axum::extract::State;
use serde::Deserialize;

use edemy_auth_types::session::Session;
use edemy_domain::id::{CourseId, LessonId};

use crate::error::MarketplaceError;
use crate::extract::Json;
use crate::handlers::OkResponse;
use crate::state::AppState;
use crate::usecase::progress::{
    ListCompletedUseCase, MarkCompletedUseCase, MarkIncompletedUseCase,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgressRequest {
    pub course_id: CourseId,
    pub lesson_id: LessonId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgressRequest {
    pub course_id: CourseId,
}

// ── POST /api/mark-completed ─────────────────────────────────────────────────

pub async fn mark_completed(
    session: Session,
    State(state): State<AppState>,
    Json(body): Json<LessonProgressRequest>,
) -> Result<Json<OkResponse>, MarketplaceError> {
    let usecase = MarkCompletedUseCase {
        courses: state.course_repo(),
        progress: state.progress_repo(),
    };
    usecase
        .execute(session.user_id, body.course_id, body.lesson_id)
        .await?;
    Ok(OkResponse::json())
}

// ── POST /api/mark-incompleted ───────────────────────────────────────────────

pub async fn mark_incompleted(
    session: Session,
    State(state): State<AppState>,
    Json(body): Json<LessonProgressRequest>,
) -> Result<Json<OkResponse>, MarketplaceError> {
    let usecase = MarkIncompletedUseCase {
        progress: state.progress_repo(),
    };
    usecase
        .execute(session.user_id, body.course_id, body.lesson_id)
        .await?;
    Ok(OkResponse::json())
}

// ── POST /api/list-completed ─────────────────────────────────────────────────

pub async fn list_completed(
    session: Session,
    State(state): State<AppState>,
    Json(body): Json<CourseProgressRequest>,
) -> Result<Json<Vec<LessonId>>, MarketplaceError> {
    let usecase = ListCompletedUseCase {
        progress: state.progress_repo(),
    };
    Ok(Json(usecase.execute(session.user_id, body.course_id).await?))
}
