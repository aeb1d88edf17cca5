// dtos/paymentdtos.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::paymentmodel::{EscrowPayment, PaymentStatus};
use crate::utils::currency::cents_to_dollars;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateEscrowPaymentDto {
    pub job_id: Uuid,

    #[validate(range(min = 1.0, max = 1000000.0, message = "Amount must be between $1 and $1,000,000"))]
    pub amount: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReleasePaymentDto {
    pub requested_by: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RefundPaymentDto {
    pub requested_by: Uuid,

    #[validate(length(max = 200, message = "Reason must be at most 200 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EscrowPaymentResponseDto {
    pub id: Uuid,
    pub job_id: Uuid,
    pub tradie_id: Uuid,
    pub helper_id: Uuid,
    pub amount: f64, // in dollars
    pub platform_fee_amount: f64,
    pub currency: String,
    pub external_payment_ref: String,
    pub status: PaymentStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
}

impl From<EscrowPayment> for EscrowPaymentResponseDto {
    fn from(payment: EscrowPayment) -> Self {
        Self {
            id: payment.id,
            job_id: payment.job_id,
            tradie_id: payment.tradie_id,
            helper_id: payment.helper_id,
            amount: cents_to_dollars(payment.amount),
            platform_fee_amount: cents_to_dollars(payment.platform_fee_amount),
            currency: payment.currency,
            external_payment_ref: payment.external_payment_ref,
            status: payment.status,
            created_at: payment.created_at,
            paid_at: payment.paid_at,
            completed_at: payment.completed_at,
            refunded_at: payment.refunded_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedEscrowPaymentDto {
    pub payment: EscrowPaymentResponseDto,
    /// Token the funding party's client needs to complete authorization
    /// with the payment processor.
    pub client_secret: String,
}
