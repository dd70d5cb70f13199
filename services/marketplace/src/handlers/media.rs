use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use serde::Deserialize;

use edemy_auth_types::session::Session;
use edemy_domain::id::UserId;

use crate::domain::types::{ObjectRef, StoredObject};
use crate::error::MarketplaceError;
use crate::extract::{Json, Path};
use crate::handlers::OkResponse;
use crate::state::AppState;
use crate::usecase::media::{
    RemoveImageUseCase, RemoveVideoUseCase, UploadImageUseCase, UploadVideoUseCase, VideoUpload,
    require_self,
};

/// Multipart field carrying the video file.
const VIDEO_FIELD: &str = "video";

// ── POST /api/course/upload-image ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UploadImageRequest {
    /// `data:image/<ext>;base64,<payload>`
    #[serde(default)]
    pub image: String,
}

pub async fn upload_image(
    _session: Session,
    State(state): State<AppState>,
    Json(body): Json<UploadImageRequest>,
) -> Result<Json<StoredObject>, MarketplaceError> {
    let usecase = UploadImageUseCase {
        storage: state.storage.clone(),
    };
    Ok(Json(usecase.execute(&body.image).await?))
}

// ── POST /api/course/remove-image ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RemoveImageRequest {
    pub image: ObjectRef,
}

pub async fn remove_image(
    _session: Session,
    State(state): State<AppState>,
    Json(body): Json<RemoveImageRequest>,
) -> Result<Json<OkResponse>, MarketplaceError> {
    let usecase = RemoveImageUseCase {
        storage: state.storage.clone(),
    };
    usecase.execute(&body.image).await?;
    Ok(OkResponse::json())
}

// ── POST /api/course/video-upload/{instructor_id} ────────────────────────────

async fn read_video_field(mut multipart: Multipart) -> Result<VideoUpload, MarketplaceError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| MarketplaceError::Validation(e.body_text()))?
    {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| MarketplaceError::Validation(e.body_text()))?;
        return Ok(VideoUpload { file_name, bytes });
    }
    Err(MarketplaceError::Validation("No video".to_owned()))
}

pub async fn upload_video(
    session: Session,
    State(state): State<AppState>,
    Path(instructor_id): Path<UserId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<StoredObject>, MarketplaceError> {
    // Reject before buffering the body.
    require_self(session.user_id, instructor_id)?;
    let video = read_video_field(multipart?).await?;
    let usecase = UploadVideoUseCase {
        storage: state.storage.clone(),
    };
    Ok(Json(
        usecase.execute(session.user_id, instructor_id, video).await?,
    ))
}

// ── POST /api/course/video-remove/{instructor_id} ────────────────────────────

pub async fn remove_video(
    session: Session,
    State(state): State<AppState>,
    Path(instructor_id): Path<UserId>,
    Json(body): Json<ObjectRef>,
) -> Result<Json<OkResponse>, MarketplaceError> {
    let usecase = RemoveVideoUseCase {
        storage: state.storage.clone(),
    };
    usecase
        .execute(session.user_id, instructor_id, &body)
        .await?;
    Ok(OkResponse::json())
}
