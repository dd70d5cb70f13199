use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use uuid::Uuid;

use edemy_domain::id::UserId;

use crate::domain::repository::ObjectStore;
use crate::domain::types::{ObjectRef, StoredObject};
use crate::error::MarketplaceError;

/// Decoded `data:image/<ext>;base64,<payload>` URL.
#[derive(Debug, PartialEq, Eq)]
pub struct ImageData {
    pub ext: String,
    pub bytes: Vec<u8>,
}

pub fn parse_image_data_url(data_url: &str) -> Result<ImageData, MarketplaceError> {
    let invalid = || MarketplaceError::Validation("image must be a base64 data URL".to_owned());

    let rest = data_url.trim().strip_prefix("data:image/").ok_or_else(invalid)?;
    let (ext, payload) = rest.split_once(";base64,").ok_or_else(invalid)?;
    let ext = ext.to_ascii_lowercase();
    if ext.is_empty() || !ext.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'+') {
        return Err(invalid());
    }
    let ext = match ext.as_str() {
        "jpg" => "jpeg".to_owned(),
        "svg+xml" => "svg".to_owned(),
        _ => ext,
    };
    let bytes = STANDARD.decode(payload.trim()).map_err(|_| invalid())?;
    if bytes.is_empty() {
        return Err(invalid());
    }
    Ok(ImageData { ext, bytes })
}

fn object_key(ext: &str) -> String {
    format!("{}.{ext}", Uuid::new_v4())
}

/// Uploads and removals under an instructor path are self-service only.
pub fn require_self(caller: UserId, instructor_id: UserId) -> Result<(), MarketplaceError> {
    if caller != instructor_id {
        return Err(MarketplaceError::NotOwner);
    }
    Ok(())
}

fn require_bucket<S: ObjectStore>(storage: &S, object: &ObjectRef) -> Result<(), MarketplaceError> {
    if object.bucket != storage.bucket() {
        return Err(MarketplaceError::Validation("unknown bucket".to_owned()));
    }
    Ok(())
}

// ── Images ───────────────────────────────────────────────────────────────────

pub struct UploadImageUseCase<S: ObjectStore> {
    pub storage: S,
}

impl<S: ObjectStore> UploadImageUseCase<S> {
    pub async fn execute(&self, data_url: &str) -> Result<StoredObject, MarketplaceError> {
        let image = parse_image_data_url(data_url)?;
        let content_type = format!("image/{}", image.ext);
        self.storage
            .put(&object_key(&image.ext), Bytes::from(image.bytes), &content_type)
            .await
    }
}

pub struct RemoveImageUseCase<S: ObjectStore> {
    pub storage: S,
}

impl<S: ObjectStore> RemoveImageUseCase<S> {
    pub async fn execute(&self, image: &ObjectRef) -> Result<(), MarketplaceError> {
        require_bucket(&self.storage, image)?;
        self.storage.delete(&image.key).await
    }
}

// ── Videos ───────────────────────────────────────────────────────────────────

pub struct VideoUpload {
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

/// Extension taken from the uploaded file name, `mp4` when absent or unusable.
fn video_ext(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 8 && ext.bytes().all(|b| b.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| "mp4".to_owned())
}

pub struct UploadVideoUseCase<S: ObjectStore> {
    pub storage: S,
}

impl<S: ObjectStore> UploadVideoUseCase<S> {
    pub async fn execute(
        &self,
        caller: UserId,
        instructor_id: UserId,
        video: VideoUpload,
    ) -> Result<StoredObject, MarketplaceError> {
        require_self(caller, instructor_id)?;
        if video.bytes.is_empty() {
            return Err(MarketplaceError::Validation("No video".to_owned()));
        }
        let ext = video_ext(video.file_name.as_deref());
        let content_type = format!("video/{ext}");
        self.storage
            .put(&object_key(&ext), video.bytes, &content_type)
            .await
    }
}

pub struct RemoveVideoUseCase<S: ObjectStore> {
    pub storage: S,
}

impl<S: ObjectStore> RemoveVideoUseCase<S> {
    pub async fn execute(
        &self,
        caller: UserId,
        instructor_id: UserId,
        video: &ObjectRef,
    ) -> Result<(), MarketplaceError> {
        require_self(caller, instructor_id)?;
        require_bucket(&self.storage, video)?;
        self.storage.delete(&video.key).await
    }
}
