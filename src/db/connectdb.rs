// db/connectdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::paymentmodel::ConnectAccount;

#[async_trait]
pub trait ConnectAccountExt {
    async fn create_connect_account(
        &self,
        user_id: Uuid,
        external_account_id: String,
    ) -> Result<ConnectAccount, Error>;

    async fn get_connect_account(&self, user_id: Uuid) -> Result<Option<ConnectAccount>, Error>;

    /// Mirror the capability flags reported by an account_updated webhook.
    /// Returns `None` when no local account exists yet (provisioning race).
    async fn update_connect_account_flags(
        &self,
        user_id: Uuid,
        charges_enabled: bool,
        payouts_enabled: bool,
        details_submitted: bool,
    ) -> Result<Option<ConnectAccount>, Error>;
}

#[async_trait]
impl ConnectAccountExt for DBClient {
    async fn create_connect_account(
        &self,
        user_id: Uuid,
        external_account_id: String,
    ) -> Result<ConnectAccount, Error> {
        sqlx::query_as::<_, ConnectAccount>(
            r#"
            INSERT INTO connect_accounts (user_id, external_account_id)
            VALUES ($1, $2)
            RETURNING
                id,
                user_id,
                external_account_id,
                charges_enabled,
                payouts_enabled,
                details_submitted,
                created_at,
                updated_at
            "#,
        )
        .bind(user_id)
        .bind(external_account_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_connect_account(&self, user_id: Uuid) -> Result<Option<ConnectAccount>, Error> {
        sqlx::query_as::<_, ConnectAccount>(
            r#"
            SELECT
                id,
                user_id,
                external_account_id,
                charges_enabled,
                payouts_enabled,
                details_submitted,
                created_at,
                updated_at
            FROM connect_accounts
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_connect_account_flags(
        &self,
        user_id: Uuid,
        charges_enabled: bool,
        payouts_enabled: bool,
        details_submitted: bool,
    ) -> Result<Option<ConnectAccount>, Error> {
        sqlx::query_as::<_, ConnectAccount>(
            r#"
            UPDATE connect_accounts
            SET charges_enabled = $2,
                payouts_enabled = $3,
                details_submitted = $4,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING
                id,
                user_id,
                external_account_id,
                charges_enabled,
                payouts_enabled,
                details_submitted,
                created_at,
                updated_at
            "#,
        )
        .bind(user_id)
        .bind(charges_enabled)
        .bind(payouts_enabled)
        .bind(details_submitted)
        .fetch_optional(&self.pool)
        .await
    }
}
