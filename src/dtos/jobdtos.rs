// dtos/jobdtos.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::jobmodel::{Job, JobStatus};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateJobDto {
    pub tradie_id: Uuid,

    #[validate(length(min = 1, max = 120, message = "Title must be between 1 and 120 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub location_suburb: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssignHelperDto {
    pub helper_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobResponseDto {
    pub id: Uuid,
    pub tradie_id: Uuid,
    pub assigned_helper_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub status: JobStatus,
    pub location_suburb: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Job> for JobResponseDto {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            tradie_id: job.tradie_id,
            assigned_helper_id: job.assigned_helper_id,
            title: job.title,
            description: job.description,
            status: job.status,
            location_suburb: job.location_suburb,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}
