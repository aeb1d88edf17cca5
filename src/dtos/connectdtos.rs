// dtos/connectdtos.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::paymentmodel::ConnectAccount;
use crate::service::connect_service::ProvisionedAccount;

#[derive(Debug, Serialize, Deserialize)]
pub struct ProvisionAccountDto {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProvisionedAccountDto {
    pub external_account_id: String,
    pub onboarding_url: String,
}

impl From<ProvisionedAccount> for ProvisionedAccountDto {
    fn from(provisioned: ProvisionedAccount) -> Self {
        Self {
            external_account_id: provisioned.external_account_id,
            onboarding_url: provisioned.onboarding_url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectAccountResponseDto {
    pub user_id: Uuid,
    pub external_account_id: String,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    pub details_submitted: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<ConnectAccount> for ConnectAccountResponseDto {
    fn from(account: ConnectAccount) -> Self {
        Self {
            user_id: account.user_id,
            external_account_id: account.external_account_id,
            charges_enabled: account.charges_enabled,
            payouts_enabled: account.payouts_enabled,
            details_submitted: account.details_submitted,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}
