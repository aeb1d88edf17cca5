// handler/connect.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{dtos::connectdtos::*, dtos::paymentdtos::ApiResponse, error::HttpError, AppState};

pub fn connect_handler() -> Router {
    Router::new()
        .route("/", post(provision_account))
        .route("/:user_id", get(get_account_status))
}

pub async fn provision_account(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<ProvisionAccountDto>,
) -> Result<impl IntoResponse, HttpError> {
    let provisioned = app_state
        .connect_service
        .provision_account(body.user_id)
        .await?;

    let response: ProvisionedAccountDto = provisioned.into();
    Ok(Json(ApiResponse::success(
        "Payout account provisioned successfully",
        response,
    )))
}

pub async fn get_account_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let account = app_state
        .connect_service
        .get_account_status(user_id)
        .await?;

    let response: ConnectAccountResponseDto = account.into();
    Ok(Json(ApiResponse::success(
        "Payout account retrieved successfully",
        response,
    )))
}
