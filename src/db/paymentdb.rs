// db/paymentdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::paymentmodel::{EscrowPayment, PaymentStatus};

const PAYMENT_COLUMNS: &str = r#"
    id,
    job_id,
    tradie_id,
    helper_id,
    amount,
    platform_fee_amount,
    currency,
    external_payment_ref,
    status,
    created_at,
    paid_at,
    completed_at,
    refunded_at,
    updated_at
"#;

#[async_trait]
pub trait EscrowPaymentExt {
    #[allow(clippy::too_many_arguments)]
    async fn create_escrow_payment(
        &self,
        job_id: Uuid,
        tradie_id: Uuid,
        helper_id: Uuid,
        amount: i64,
        platform_fee_amount: i64,
        currency: String,
        external_payment_ref: String,
    ) -> Result<EscrowPayment, Error>;

    async fn get_escrow_payment(&self, payment_id: Uuid) -> Result<Option<EscrowPayment>, Error>;

    async fn get_payment_by_external_ref(
        &self,
        external_payment_ref: &str,
    ) -> Result<Option<EscrowPayment>, Error>;

    /// The payment, if any, still blocking `job_id` from being funded again
    /// (status pending or held).
    async fn get_active_payment_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Option<EscrowPayment>, Error>;

    /// Single-statement compare-and-set on the payment status. Returns
    /// `None` when the row is missing or its status is no longer `from`,
    /// which is how concurrent webhook deliveries lose the race without
    /// clobbering each other. Lifecycle timestamps are stamped by the
    /// transition itself.
    async fn transition_payment_status(
        &self,
        payment_id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<Option<EscrowPayment>, Error>;
}

#[async_trait]
impl EscrowPaymentExt for DBClient {
    async fn create_escrow_payment(
        &self,
        job_id: Uuid,
        tradie_id: Uuid,
        helper_id: Uuid,
        amount: i64,
        platform_fee_amount: i64,
        currency: String,
        external_payment_ref: String,
    ) -> Result<EscrowPayment, Error> {
        sqlx::query_as::<_, EscrowPayment>(&format!(
            r#"
            INSERT INTO escrow_payments
                (job_id, tradie_id, helper_id, amount, platform_fee_amount,
                 currency, external_payment_ref, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending'::escrow_payment_status)
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(tradie_id)
        .bind(helper_id)
        .bind(amount)
        .bind(platform_fee_amount)
        .bind(currency)
        .bind(external_payment_ref)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_escrow_payment(&self, payment_id: Uuid) -> Result<Option<EscrowPayment>, Error> {
        sqlx::query_as::<_, EscrowPayment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM escrow_payments
            WHERE id = $1
            "#
        ))
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_payment_by_external_ref(
        &self,
        external_payment_ref: &str,
    ) -> Result<Option<EscrowPayment>, Error> {
        sqlx::query_as::<_, EscrowPayment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM escrow_payments
            WHERE external_payment_ref = $1
            "#
        ))
        .bind(external_payment_ref)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_active_payment_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Option<EscrowPayment>, Error> {
        sqlx::query_as::<_, EscrowPayment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM escrow_payments
            WHERE job_id = $1
              AND status IN ('pending'::escrow_payment_status, 'held'::escrow_payment_status)
            "#
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn transition_payment_status(
        &self,
        payment_id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<Option<EscrowPayment>, Error> {
        sqlx::query_as::<_, EscrowPayment>(&format!(
            r#"
            UPDATE escrow_payments
            SET status = $3,
                paid_at = CASE WHEN $3 = 'held'::escrow_payment_status
                               THEN NOW() ELSE paid_at END,
                completed_at = CASE WHEN $3 = 'completed'::escrow_payment_status
                                    THEN NOW() ELSE completed_at END,
                refunded_at = CASE WHEN $3 = 'refunded'::escrow_payment_status
                                   THEN NOW() ELSE refunded_at END,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment_id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await
    }
}
