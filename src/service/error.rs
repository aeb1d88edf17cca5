use thiserror::Error;
use uuid::Uuid;
use crate::{
    error::HttpError,
    models::paymentmodel::PaymentStatus,
    service::payment_processor::ProcessorError,
};
use axum::http::StatusCode;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Job {0} not found")]
    JobNotFound(Uuid),

    #[error("Payment {0} not found")]
    PaymentNotFound(Uuid),

    #[error("Connect account not found for user {0}")]
    AccountNotFound(Uuid),

    #[error("No payout-enabled account for the helper assigned to job {0}")]
    NoPayoutAccount(Uuid),

    #[error("Job {0} already has an active escrow payment")]
    JobAlreadyFunded(Uuid),

    #[error("Payment {0} is not held in escrow")]
    NotInEscrow(Uuid),

    #[error("Payment cannot move from {from:?} to {to:?}")]
    InvalidPaymentTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error("User {0} is not authorized to act on payment {1}")]
    UnauthorizedPaymentAction(Uuid, Uuid),

    #[error("Webhook signature verification failed")]
    InvalidWebhookSignature,

    #[error("Payment processor error: {0}")]
    Processor(#[from] ProcessorError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match &error {
            ServiceError::JobNotFound(_)
            | ServiceError::PaymentNotFound(_)
            | ServiceError::AccountNotFound(_) => HttpError::not_found(error.to_string()),

            ServiceError::NoPayoutAccount(_)
            | ServiceError::JobAlreadyFunded(_)
            | ServiceError::NotInEscrow(_)
            | ServiceError::InvalidPaymentTransition { .. }
            | ServiceError::Validation(_) => HttpError::bad_request(error.to_string()),

            ServiceError::UnauthorizedPaymentAction(_, _)
            | ServiceError::InvalidWebhookSignature => HttpError::unauthorized(error.to_string()),

            ServiceError::Processor(processor_error) => {
                if processor_error.is_retryable() {
                    HttpError::bad_gateway("Payment processor is unavailable, please try again")
                } else {
                    HttpError::bad_request(error.to_string())
                }
            }

            _ => HttpError::server_error(error.to_string()),
        }
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::JobNotFound(_)
            | ServiceError::PaymentNotFound(_)
            | ServiceError::AccountNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::NoPayoutAccount(_)
            | ServiceError::JobAlreadyFunded(_)
            | ServiceError::NotInEscrow(_)
            | ServiceError::InvalidPaymentTransition { .. }
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::UnauthorizedPaymentAction(_, _)
            | ServiceError::InvalidWebhookSignature => StatusCode::UNAUTHORIZED,

            ServiceError::Processor(processor_error) => {
                if processor_error.is_retryable() {
                    StatusCode::BAD_GATEWAY
                } else {
                    StatusCode::BAD_REQUEST
                }
            }

            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
