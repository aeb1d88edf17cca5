// models/paymentmodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Escrow payment lifecycle. `Completed`, `Failed` and `Refunded` are
/// terminal; the allowed edges live in `service::state_bridge`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "escrow_payment_status", rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Held,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Completed | PaymentStatus::Failed | PaymentStatus::Refunded
        )
    }

    /// Active means the payment still blocks the job from being funded again.
    pub fn is_active(&self) -> bool {
        matches!(self, PaymentStatus::Pending | PaymentStatus::Held)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EscrowPayment {
    pub id: Uuid,
    pub job_id: Uuid,
    pub tradie_id: Uuid,
    pub helper_id: Uuid,
    pub amount: i64, // in cents
    pub platform_fee_amount: i64,
    pub currency: String,
    pub external_payment_ref: String, // processor payment intent id, immutable
    pub status: PaymentStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConnectAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub external_account_id: String,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    pub details_submitted: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub fn generate_payment_reference() -> String {
    format!(
        "THP_{}",
        uuid::Uuid::new_v4().to_string().replace("-", "").to_uppercase()[..16].to_string()
    )
}
