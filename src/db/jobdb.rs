// db/jobdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::jobmodel::{Job, JobStatus};

#[async_trait]
pub trait JobExt {
    async fn create_job(
        &self,
        tradie_id: Uuid,
        title: String,
        description: String,
        location_suburb: Option<String>,
    ) -> Result<Job, Error>;

    async fn get_job(&self, job_id: Uuid) -> Result<Option<Job>, Error>;

    async fn assign_helper(&self, job_id: Uuid, helper_id: Uuid) -> Result<Option<Job>, Error>;

    /// Compare-and-set on the job status column. Returns `None` when the
    /// job is missing or its current status does not match `from`.
    async fn transition_job_status(
        &self,
        job_id: Uuid,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<Option<Job>, Error>;
}

#[async_trait]
impl JobExt for DBClient {
    async fn create_job(
        &self,
        tradie_id: Uuid,
        title: String,
        description: String,
        location_suburb: Option<String>,
    ) -> Result<Job, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (tradie_id, title, description, location_suburb, status)
            VALUES ($1, $2, $3, $4, 'open'::job_status)
            RETURNING
                id,
                tradie_id,
                assigned_helper_id,
                title,
                description,
                status,
                location_suburb,
                created_at,
                updated_at
            "#,
        )
        .bind(tradie_id)
        .bind(title)
        .bind(description)
        .bind(location_suburb)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT
                id,
                tradie_id,
                assigned_helper_id,
                title,
                description,
                status,
                location_suburb,
                created_at,
                updated_at
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn assign_helper(&self, job_id: Uuid, helper_id: Uuid) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET assigned_helper_id = $2,
                status = 'assigned'::job_status,
                updated_at = NOW()
            WHERE id = $1 AND status = 'open'::job_status
            RETURNING
                id,
                tradie_id,
                assigned_helper_id,
                title,
                description,
                status,
                location_suburb,
                created_at,
                updated_at
            "#,
        )
        .bind(job_id)
        .bind(helper_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn transition_job_status(
        &self,
        job_id: Uuid,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET status = $3,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING
                id,
                tradie_id,
                assigned_helper_id,
                title,
                description,
                status,
                location_suburb,
                created_at,
                updated_at
            "#,
        )
        .bind(job_id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await
    }
}
