//! Response body helpers.

use axum::body::{Body, to_bytes};
use axum::response::Response;

/// Read a response body as JSON. Panics on non-JSON bodies.
pub async fn json_body(resp: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Read a response body as UTF-8 text.
pub async fn text_body(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
