pub mod auth;
pub mod course;
pub mod enrollment;
pub mod health;
pub mod instructor;
pub mod lesson;
pub mod media;
pub mod progress;

use serde::Serialize;

use crate::extract::Json;

/// `{"ok": true}` acknowledgement body.
#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn json() -> Json<Self> {
        Json(Self { ok: true })
    }
}
