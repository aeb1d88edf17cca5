// service/escrow_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{connectdb::ConnectAccountExt, jobdb::JobExt, paymentdb::EscrowPaymentExt},
    models::paymentmodel::{generate_payment_reference, EscrowPayment, PaymentStatus},
    service::{
        error::ServiceError,
        payment_processor::{HeldPaymentRequest, PaymentProcessor},
        state_bridge,
    },
    utils::currency::platform_fee_cents,
};

/// A freshly created escrow payment plus the client secret the funding
/// party's client needs to complete authorization with the processor.
#[derive(Debug, Clone)]
pub struct CreatedEscrowPayment {
    pub payment: EscrowPayment,
    pub client_secret: String,
}

/// Owns the escrow payment lifecycle: creates held payments against jobs
/// and later releases (captures) or refunds them. The pending -> held edge
/// is never driven here; processor confirmation arrives asynchronously
/// through the webhook reconciler.
pub struct EscrowService<S> {
    store: Arc<S>,
    processor: Arc<dyn PaymentProcessor>,
    platform_fee_bps: i64,
    currency: String,
}

impl<S> EscrowService<S>
where
    S: EscrowPaymentExt + JobExt + ConnectAccountExt + Send + Sync,
{
    pub fn new(
        store: Arc<S>,
        processor: Arc<dyn PaymentProcessor>,
        platform_fee_bps: i64,
        currency: String,
    ) -> Self {
        Self {
            store,
            processor,
            platform_fee_bps,
            currency,
        }
    }

    pub async fn create_escrow_payment(
        &self,
        job_id: Uuid,
        amount: i64,
    ) -> Result<CreatedEscrowPayment, ServiceError> {
        if amount <= 0 {
            return Err(ServiceError::Validation(
                "Amount must be positive".to_string(),
            ));
        }

        let job = self
            .store
            .get_job(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        let helper_id = job
            .assigned_helper_id
            .ok_or(ServiceError::NoPayoutAccount(job_id))?;

        let helper_account = self
            .store
            .get_connect_account(helper_id)
            .await?
            .filter(|account| account.payouts_enabled)
            .ok_or(ServiceError::NoPayoutAccount(job_id))?;

        if let Some(active) = self.store.get_active_payment_for_job(job_id).await? {
            tracing::info!(
                "rejected duplicate funding of job {}: payment {} is {:?}",
                job_id,
                active.id,
                active.status
            );
            return Err(ServiceError::JobAlreadyFunded(job_id));
        }

        // Fee is fixed at creation time and never recomputed.
        let platform_fee_amount = platform_fee_cents(amount, self.platform_fee_bps);
        let payment_reference = generate_payment_reference();

        let held = self
            .processor
            .create_held_payment(&HeldPaymentRequest {
                amount,
                platform_fee_amount,
                currency: self.currency.clone(),
                destination_account_id: helper_account.external_account_id.clone(),
                job_id,
                payment_reference,
            })
            .await?;

        let payment = match self
            .store
            .create_escrow_payment(
                job_id,
                job.tradie_id,
                helper_id,
                amount,
                platform_fee_amount,
                self.currency.clone(),
                held.reference.clone(),
            )
            .await
        {
            Ok(payment) => payment,
            Err(err) => {
                // Money-side state now exists with no local record. The
                // reconciler tolerates webhook lookups that match nothing,
                // so this orphan is repaired out of band.
                tracing::error!(
                    "held payment {} was created at the processor but the local record for job {} could not be written: {}",
                    held.reference,
                    job_id,
                    err
                );
                return Err(err.into());
            }
        };

        Ok(CreatedEscrowPayment {
            payment,
            client_secret: held.client_secret,
        })
    }

    /// Release held funds to the receiving party. The only transition that
    /// moves money out of escrow; unreachable unless the payment is `held`.
    pub async fn release_escrow_payment(
        &self,
        payment_id: Uuid,
        requested_by: Uuid,
    ) -> Result<EscrowPayment, ServiceError> {
        let payment = self
            .store
            .get_escrow_payment(payment_id)
            .await?
            .ok_or(ServiceError::PaymentNotFound(payment_id))?;

        if payment.tradie_id != requested_by {
            return Err(ServiceError::UnauthorizedPaymentAction(
                requested_by,
                payment_id,
            ));
        }

        if payment.status != PaymentStatus::Held {
            return Err(ServiceError::NotInEscrow(payment_id));
        }

        self.processor
            .capture_held_payment(&payment.external_payment_ref)
            .await?;

        match self
            .store
            .transition_payment_status(payment.id, PaymentStatus::Held, PaymentStatus::Completed)
            .await?
        {
            Some(updated) => Ok(updated),
            None => {
                tracing::error!(
                    "payment {} was captured at the processor but is no longer held locally; \
                     state drift must be repaired by reconciliation",
                    payment.id
                );
                Err(ServiceError::NotInEscrow(payment.id))
            }
        }
    }

    pub async fn refund_escrow_payment(
        &self,
        payment_id: Uuid,
        requested_by: Uuid,
        reason: Option<&str>,
    ) -> Result<EscrowPayment, ServiceError> {
        let payment = self
            .store
            .get_escrow_payment(payment_id)
            .await?
            .ok_or(ServiceError::PaymentNotFound(payment_id))?;

        if payment.tradie_id != requested_by {
            return Err(ServiceError::UnauthorizedPaymentAction(
                requested_by,
                payment_id,
            ));
        }

        if !state_bridge::is_valid_payment_transition(payment.status, PaymentStatus::Refunded) {
            return Err(ServiceError::InvalidPaymentTransition {
                from: payment.status,
                to: PaymentStatus::Refunded,
            });
        }

        self.processor
            .refund_payment(&payment.external_payment_ref, reason)
            .await?;

        match self
            .store
            .transition_payment_status(payment.id, payment.status, PaymentStatus::Refunded)
            .await?
        {
            Some(updated) => Ok(updated),
            None => {
                tracing::error!(
                    "payment {} was refunded at the processor but its status moved concurrently; \
                     state drift must be repaired by reconciliation",
                    payment.id
                );
                Err(ServiceError::InvalidPaymentTransition {
                    from: payment.status,
                    to: PaymentStatus::Refunded,
                })
            }
        }
    }

    pub async fn get_escrow_payment(&self, payment_id: Uuid) -> Result<EscrowPayment, ServiceError> {
        self.store
            .get_escrow_payment(payment_id)
            .await?
            .ok_or(ServiceError::PaymentNotFound(payment_id))
    }
}
