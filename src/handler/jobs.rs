// handler/jobs.rs
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
    db::jobdb::JobExt,
    dtos::jobdtos::*,
    dtos::paymentdtos::ApiResponse,
    error::HttpError,
    AppState,
};

pub fn jobs_handler() -> Router {
    Router::new()
        .route("/", post(create_job))
        .route("/:job_id", get(get_job))
        .route("/:job_id/assign", post(assign_helper))
}

pub async fn create_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .db_client
        .create_job(body.tradie_id, body.title, body.description, body.location_suburb)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let response: JobResponseDto = job.into();
    Ok(Json(ApiResponse::success("Job created successfully", response)))
}

pub async fn get_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .db_client
        .get_job(job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Job not found"))?;

    let response: JobResponseDto = job.into();
    Ok(Json(ApiResponse::success("Job retrieved successfully", response)))
}

pub async fn assign_helper(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<AssignHelperDto>,
) -> Result<impl IntoResponse, HttpError> {
    let assigned = app_state
        .db_client
        .assign_helper(job_id, body.helper_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    match assigned {
        Some(job) => {
            let response: JobResponseDto = job.into();
            Ok(Json(ApiResponse::success(
                "Helper assigned successfully",
                response,
            )))
        }
        None => {
            let exists = app_state
                .db_client
                .get_job(job_id)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?
                .is_some();

            if exists {
                Err(HttpError::bad_request("Job is not open for assignment"))
            } else {
                Err(HttpError::not_found("Job not found"))
            }
        }
    }
}
