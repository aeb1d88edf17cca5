// service/webhook_service.rs
use std::sync::Arc;

use serde_json::Value;

use crate::{
    db::{connectdb::ConnectAccountExt, jobdb::JobExt, paymentdb::EscrowPaymentExt},
    models::paymentmodel::PaymentStatus,
    service::{
        error::ServiceError,
        payment_processor::{verify_webhook_signature, ProcessorEvent},
        state_bridge,
    },
};

/// Applies asynchronous processor events to local payment/job/account state
/// exactly once in effect. Deliveries are at-least-once, possibly out of
/// order and concurrent, so every mutation goes through a compare-and-set
/// and every anomaly that must not be retried is acknowledged instead of
/// rejected.
pub struct WebhookService<S> {
    store: Arc<S>,
    webhook_secret: String,
}

impl<S> WebhookService<S>
where
    S: EscrowPaymentExt + JobExt + ConnectAccountExt + Send + Sync,
{
    pub fn new(store: Arc<S>, webhook_secret: String) -> Self {
        Self {
            store,
            webhook_secret,
        }
    }

    /// Verify and apply one webhook delivery. `Ok(())` means the sender
    /// must not retry; errors are returned only for signature failures and
    /// store failures that are worth a retry.
    pub async fn handle_event(
        &self,
        raw_body: &str,
        signature_header: &str,
    ) -> Result<(), ServiceError> {
        // Nothing is parsed before the signature checks out.
        if !verify_webhook_signature(raw_body, signature_header, &self.webhook_secret) {
            tracing::warn!("rejected webhook delivery with invalid signature");
            return Err(ServiceError::InvalidWebhookSignature);
        }

        let body: Value = match serde_json::from_str(raw_body) {
            Ok(body) => body,
            Err(err) => {
                // Authentic but unparseable; retrying cannot help.
                tracing::warn!("acknowledged unparseable webhook payload: {}", err);
                return Ok(());
            }
        };

        match ProcessorEvent::decode(&body) {
            ProcessorEvent::PaymentSucceeded { reference } => {
                self.apply_payment_succeeded(&reference).await
            }
            ProcessorEvent::PaymentFailed { reference } => {
                self.apply_payment_failed(&reference).await
            }
            ProcessorEvent::AccountUpdated {
                account_id,
                user_id,
                charges_enabled,
                payouts_enabled,
                details_submitted,
            } => {
                self.apply_account_updated(
                    &account_id,
                    user_id,
                    charges_enabled,
                    payouts_enabled,
                    details_submitted,
                )
                .await
            }
            ProcessorEvent::Unknown { event_type } => {
                tracing::info!("Unhandled processor webhook event: {}", event_type);
                Ok(())
            }
        }
    }

    async fn apply_payment_succeeded(&self, reference: &str) -> Result<(), ServiceError> {
        let payment = match self.store.get_payment_by_external_ref(reference).await? {
            Some(payment) => payment,
            None => {
                // Legitimately possible: test events, or a create that
                // crashed before its local write. Rejecting would make the
                // processor retry forever.
                tracing::warn!(
                    "payment_succeeded for unknown reference {}; acknowledged without action",
                    reference
                );
                return Ok(());
            }
        };

        if !state_bridge::is_valid_payment_transition(payment.status, PaymentStatus::Held) {
            tracing::info!(
                "duplicate payment_succeeded for {}: payment {} already {:?}",
                reference,
                payment.id,
                payment.status
            );
            return Ok(());
        }

        let held = match self
            .store
            .transition_payment_status(payment.id, PaymentStatus::Pending, PaymentStatus::Held)
            .await?
        {
            Some(held) => held,
            None => {
                tracing::info!(
                    "payment {} was transitioned by a concurrent delivery",
                    payment.id
                );
                return Ok(());
            }
        };

        // The job update is deliberately not atomic with the payment
        // update. If it fails the event is still acknowledged; a held
        // payment whose job is not paid is detectable by re-querying.
        match self.store.get_job(held.job_id).await {
            Ok(Some(job)) => {
                if let Some(next) = state_bridge::job_status_on_payment_held(job.status) {
                    match self.store.transition_job_status(job.id, job.status, next).await {
                        Ok(Some(_)) => {}
                        Ok(None) => {
                            tracing::warn!(
                                "job {} changed concurrently; skipped transition to paid",
                                job.id
                            );
                        }
                        Err(err) => {
                            tracing::error!(
                                "payment {} is held but job {} could not be marked paid: {}",
                                held.id,
                                job.id,
                                err
                            );
                        }
                    }
                }
            }
            Ok(None) => {
                tracing::error!("payment {} references missing job {}", held.id, held.job_id);
            }
            Err(err) => {
                tracing::error!(
                    "payment {} is held but its job {} could not be loaded: {}",
                    held.id,
                    held.job_id,
                    err
                );
            }
        }

        Ok(())
    }

    async fn apply_payment_failed(&self, reference: &str) -> Result<(), ServiceError> {
        let payment = match self.store.get_payment_by_external_ref(reference).await? {
            Some(payment) => payment,
            None => {
                tracing::warn!(
                    "payment_failed for unknown reference {}; acknowledged without action",
                    reference
                );
                return Ok(());
            }
        };

        if !state_bridge::is_valid_payment_transition(payment.status, PaymentStatus::Failed) {
            tracing::info!(
                "payment_failed for {}: payment {} already {:?}",
                reference,
                payment.id,
                payment.status
            );
            return Ok(());
        }

        if self
            .store
            .transition_payment_status(payment.id, PaymentStatus::Pending, PaymentStatus::Failed)
            .await?
            .is_none()
        {
            tracing::info!(
                "payment {} was transitioned by a concurrent delivery",
                payment.id
            );
        }

        Ok(())
    }

    async fn apply_account_updated(
        &self,
        account_id: &str,
        user_id: Option<uuid::Uuid>,
        charges_enabled: bool,
        payouts_enabled: bool,
        details_submitted: bool,
    ) -> Result<(), ServiceError> {
        let user_id = match user_id {
            Some(user_id) => user_id,
            None => {
                tracing::warn!(
                    "account.updated for {} carries no user id metadata; acknowledged",
                    account_id
                );
                return Ok(());
            }
        };

        match self
            .store
            .update_connect_account_flags(
                user_id,
                charges_enabled,
                payouts_enabled,
                details_submitted,
            )
            .await?
        {
            Some(_) => {}
            None => {
                // Provisioning may still be in flight for this user.
                tracing::info!(
                    "account.updated for {} arrived before local provisioning; acknowledged",
                    account_id
                );
            }
        }

        Ok(())
    }
}
