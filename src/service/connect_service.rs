// service/connect_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::connectdb::ConnectAccountExt,
    models::paymentmodel::ConnectAccount,
    service::{error::ServiceError, payment_processor::PaymentProcessor},
};

const PAYOUT_ACCOUNT_COUNTRY: &str = "AU";

#[derive(Debug, Clone)]
pub struct ProvisionedAccount {
    pub external_account_id: String,
    pub onboarding_url: String,
}

/// Provisions and tracks payout-capable processor accounts for receiving
/// parties. An account is created once per user and kept in sync afterwards
/// by account.updated webhooks.
pub struct ConnectAccountService<S> {
    store: Arc<S>,
    processor: Arc<dyn PaymentProcessor>,
    app_url: String,
}

impl<S> ConnectAccountService<S>
where
    S: ConnectAccountExt + Send + Sync,
{
    pub fn new(store: Arc<S>, processor: Arc<dyn PaymentProcessor>, app_url: String) -> Self {
        Self {
            store,
            processor,
            app_url,
        }
    }

    /// Create a processor payout account for the user and persist the
    /// mapping. The local record is written before the onboarding URL is
    /// returned, so the only unrecoverable gap is a crash between the
    /// processor-side creation and the local write; that gap is logged
    /// loudly below. Calling this again for an already-provisioned user
    /// short-circuits idempotently with a fresh onboarding link for the
    /// existing account.
    pub async fn provision_account(
        &self,
        user_id: Uuid,
    ) -> Result<ProvisionedAccount, ServiceError> {
        if let Some(existing) = self.store.get_connect_account(user_id).await? {
            let onboarding_url = self.create_onboarding_link(&existing.external_account_id).await?;
            return Ok(ProvisionedAccount {
                external_account_id: existing.external_account_id,
                onboarding_url,
            });
        }

        let external_account_id = self
            .processor
            .create_payout_account(PAYOUT_ACCOUNT_COUNTRY, user_id)
            .await?;

        if let Err(err) = self
            .store
            .create_connect_account(user_id, external_account_id.clone())
            .await
        {
            tracing::error!(
                "payout account {} was created at the processor but the local record for user {} could not be written: {}",
                external_account_id,
                user_id,
                err
            );
            return Err(err.into());
        }

        let onboarding_url = self.create_onboarding_link(&external_account_id).await?;

        Ok(ProvisionedAccount {
            external_account_id,
            onboarding_url,
        })
    }

    pub async fn get_account_status(&self, user_id: Uuid) -> Result<ConnectAccount, ServiceError> {
        self.store
            .get_connect_account(user_id)
            .await?
            .ok_or(ServiceError::AccountNotFound(user_id))
    }

    async fn create_onboarding_link(&self, account_id: &str) -> Result<String, ServiceError> {
        let return_url = format!("{}/connect/return", self.app_url);
        let refresh_url = format!("{}/connect/refresh", self.app_url);

        let url = self
            .processor
            .create_onboarding_link(account_id, &return_url, &refresh_url)
            .await?;

        Ok(url)
    }
}
