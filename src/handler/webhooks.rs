// handler/webhooks.rs
use std::sync::Arc;

use axum::{
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};

use crate::{error::HttpError, service::payment_processor::SIGNATURE_HEADER, AppState};

pub fn webhook_handler() -> Router {
    Router::new().route("/payment-events", post(payment_events))
}

/// Inbound processor events. The body is taken raw so the signature is
/// verified over exactly the bytes the processor signed, before any JSON
/// parsing happens.
pub async fn payment_events(
    Extension(app_state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<impl IntoResponse, HttpError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            HttpError::new(
                "Missing or invalid processor signature".to_string(),
                StatusCode::BAD_REQUEST,
            )
        })?;

    app_state
        .webhook_service
        .handle_event(&body, signature)
        .await?;

    Ok(Json(serde_json::json!({"status": "success"})))
}
