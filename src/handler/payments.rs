// handler/payments.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::paymentdtos::*,
    error::HttpError,
    utils::currency::dollars_to_cents,
    AppState,
};

pub fn payments_handler() -> Router {
    Router::new()
        .route("/", post(create_escrow_payment))
        .route("/:payment_id", get(get_escrow_payment))
        .route("/:payment_id/release", post(release_escrow_payment))
        .route("/:payment_id/refund", post(refund_escrow_payment))
}

pub async fn create_escrow_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateEscrowPaymentDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let amount_cents = dollars_to_cents(body.amount);

    let created = app_state
        .escrow_service
        .create_escrow_payment(body.job_id, amount_cents)
        .await?;

    let response = CreatedEscrowPaymentDto {
        payment: created.payment.into(),
        client_secret: created.client_secret,
    };

    Ok(Json(ApiResponse::success(
        "Escrow payment created successfully",
        response,
    )))
}

pub async fn get_escrow_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let payment = app_state
        .escrow_service
        .get_escrow_payment(payment_id)
        .await?;

    let response: EscrowPaymentResponseDto = payment.into();
    Ok(Json(ApiResponse::success(
        "Escrow payment retrieved successfully",
        response,
    )))
}

pub async fn release_escrow_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(payment_id): Path<Uuid>,
    Json(body): Json<ReleasePaymentDto>,
) -> Result<impl IntoResponse, HttpError> {
    let payment = app_state
        .escrow_service
        .release_escrow_payment(payment_id, body.requested_by)
        .await?;

    let response: EscrowPaymentResponseDto = payment.into();
    Ok(Json(ApiResponse::success(
        "Escrow payment released successfully",
        response,
    )))
}

pub async fn refund_escrow_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(payment_id): Path<Uuid>,
    Json(body): Json<RefundPaymentDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let payment = app_state
        .escrow_service
        .refund_escrow_payment(payment_id, body.requested_by, body.reason.as_deref())
        .await?;

    let response: EscrowPaymentResponseDto = payment.into();
    Ok(Json(ApiResponse::success(
        "Escrow payment refunded successfully",
        response,
    )))
}
