// service/payment_processor.rs
use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;

/// Header carrying the webhook signature: `t=<unix>,v1=<hex hmac>`.
pub const SIGNATURE_HEADER: &str = "processor-signature";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("request to payment processor failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("payment processor rejected the request: {message}")]
    Api { message: String, retryable: bool },

    #[error("unexpected payment processor response: {0}")]
    Malformed(String),
}

impl ProcessorError {
    /// Retryable errors left the processor-side state unknown or untouched;
    /// the caller may safely re-issue the request. Fatal errors were
    /// rejected outright.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProcessorError::Transport(_) => true,
            ProcessorError::Api { retryable, .. } => *retryable,
            ProcessorError::Malformed(_) => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeldPaymentRequest {
    pub amount: i64, // in cents
    pub platform_fee_amount: i64,
    pub currency: String,
    pub destination_account_id: String,
    pub job_id: Uuid,
    pub payment_reference: String,
}

#[derive(Debug, Clone)]
pub struct HeldPayment {
    pub reference: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct ProcessorRefund {
    pub refund_id: String,
}

/// Boundary to the payment processor. Injected everywhere as
/// `Arc<dyn PaymentProcessor>` so tests can substitute a scripted fake and
/// multiple credentials can coexist.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create a manual-capture payment intent naming the receiving party's
    /// account as transfer destination. Funds are authorized but not moved
    /// until capture.
    async fn create_held_payment(
        &self,
        request: &HeldPaymentRequest,
    ) -> Result<HeldPayment, ProcessorError>;

    /// Capture a previously held payment, releasing funds to the
    /// destination account.
    async fn capture_held_payment(&self, reference: &str) -> Result<(), ProcessorError>;

    async fn refund_payment(
        &self,
        reference: &str,
        reason: Option<&str>,
    ) -> Result<ProcessorRefund, ProcessorError>;

    /// Create a payout-capable account for a receiving party. Returns the
    /// processor's account id.
    async fn create_payout_account(
        &self,
        country: &str,
        user_id: Uuid,
    ) -> Result<String, ProcessorError>;

    async fn create_onboarding_link(
        &self,
        account_id: &str,
        return_url: &str,
        refresh_url: &str,
    ) -> Result<String, ProcessorError>;
}

/// Stripe-flavored implementation speaking the processor's REST API.
pub struct StripeProcessor {
    client: reqwest::Client,
    api_url: String,
    secret_key: String,
}

impl StripeProcessor {
    pub fn new(config: &Config) -> Result<Self, ProcessorError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_url: config.processor_api_url.trim_end_matches('/').to_string(),
            secret_key: config.processor_secret_key.clone(),
        })
    }

    async fn post_form(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Value, ProcessorError> {
        let response = self
            .client
            .post(format!("{}{}", self.api_url, path))
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .form(params)
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;

        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("request failed")
                .to_string();
            return Err(ProcessorError::Api {
                message,
                retryable: status.is_server_error()
                    || status == reqwest::StatusCode::TOO_MANY_REQUESTS,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl PaymentProcessor for StripeProcessor {
    async fn create_held_payment(
        &self,
        request: &HeldPaymentRequest,
    ) -> Result<HeldPayment, ProcessorError> {
        let params = [
            ("amount", request.amount.to_string()),
            ("currency", request.currency.clone()),
            ("capture_method", "manual".to_string()),
            (
                "application_fee_amount",
                request.platform_fee_amount.to_string(),
            ),
            (
                "transfer_data[destination]",
                request.destination_account_id.clone(),
            ),
            ("metadata[job_id]", request.job_id.to_string()),
            (
                "metadata[payment_reference]",
                request.payment_reference.clone(),
            ),
        ];

        let body = self.post_form("/v1/payment_intents", &params).await?;

        let reference = body["id"]
            .as_str()
            .ok_or_else(|| ProcessorError::Malformed("payment intent has no id".to_string()))?
            .to_string();
        let client_secret = body["client_secret"]
            .as_str()
            .ok_or_else(|| {
                ProcessorError::Malformed("payment intent has no client_secret".to_string())
            })?
            .to_string();

        Ok(HeldPayment {
            reference,
            client_secret,
        })
    }

    async fn capture_held_payment(&self, reference: &str) -> Result<(), ProcessorError> {
        self.post_form(&format!("/v1/payment_intents/{}/capture", reference), &[])
            .await?;
        Ok(())
    }

    async fn refund_payment(
        &self,
        reference: &str,
        reason: Option<&str>,
    ) -> Result<ProcessorRefund, ProcessorError> {
        let mut params = vec![("payment_intent", reference.to_string())];
        if let Some(reason) = reason {
            params.push(("metadata[reason]", reason.to_string()));
        }

        let body = self.post_form("/v1/refunds", &params).await?;

        let refund_id = body["id"]
            .as_str()
            .ok_or_else(|| ProcessorError::Malformed("refund has no id".to_string()))?
            .to_string();

        Ok(ProcessorRefund { refund_id })
    }

    async fn create_payout_account(
        &self,
        country: &str,
        user_id: Uuid,
    ) -> Result<String, ProcessorError> {
        let params = [
            ("type", "express".to_string()),
            ("country", country.to_uppercase()),
            ("capabilities[transfers][requested]", "true".to_string()),
            ("metadata[user_id]", user_id.to_string()),
        ];

        let body = self.post_form("/v1/accounts", &params).await?;

        let account_id = body["id"]
            .as_str()
            .ok_or_else(|| ProcessorError::Malformed("account has no id".to_string()))?
            .to_string();

        Ok(account_id)
    }

    async fn create_onboarding_link(
        &self,
        account_id: &str,
        return_url: &str,
        refresh_url: &str,
    ) -> Result<String, ProcessorError> {
        let params = [
            ("account", account_id.to_string()),
            ("return_url", return_url.to_string()),
            ("refresh_url", refresh_url.to_string()),
            ("type", "account_onboarding".to_string()),
        ];

        let body = self.post_form("/v1/account_links", &params).await?;

        let url = body["url"]
            .as_str()
            .ok_or_else(|| ProcessorError::Malformed("account link has no url".to_string()))?
            .to_string();

        Ok(url)
    }
}

/// Verify the webhook signature header against the raw body. The header is
/// `t=<unix>,v1=<hex>` where v1 is HMAC-SHA256 over `"{t}.{body}"`. Must be
/// called before the body is parsed as JSON.
pub fn verify_webhook_signature(raw_body: &str, signature_header: &str, secret: &str) -> bool {
    let mut timestamp = None;
    let mut provided_signature = None;

    for part in signature_header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => provided_signature = Some(value),
            _ => {}
        }
    }

    let (timestamp, provided_signature) = match (timestamp, provided_signature) {
        (Some(t), Some(v1)) => (t, v1),
        _ => return false,
    };

    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(format!("{}.{}", timestamp, raw_body).as_bytes());

    let expected_signature_hex = hex::encode(mac.finalize().into_bytes());

    // Compare signatures in constant time to prevent timing attacks
    ConstantTimeEq::ct_eq(
        provided_signature.as_bytes(),
        expected_signature_hex.as_bytes(),
    )
    .into()
}

/// Processor events decoded once at the boundary. New event types the
/// processor grows must never break the reconciler, so everything not
/// recognized collapses into `Unknown`.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessorEvent {
    PaymentSucceeded {
        reference: String,
    },
    PaymentFailed {
        reference: String,
    },
    AccountUpdated {
        account_id: String,
        user_id: Option<Uuid>,
        charges_enabled: bool,
        payouts_enabled: bool,
        details_submitted: bool,
    },
    Unknown {
        event_type: String,
    },
}

impl ProcessorEvent {
    pub fn decode(body: &Value) -> ProcessorEvent {
        let event_type = body["type"].as_str().unwrap_or("").to_string();
        let object = &body["data"]["object"];

        match event_type.as_str() {
            "payment_intent.succeeded" => match object["id"].as_str() {
                Some(id) => ProcessorEvent::PaymentSucceeded {
                    reference: id.to_string(),
                },
                None => ProcessorEvent::Unknown { event_type },
            },
            "payment_intent.payment_failed" => match object["id"].as_str() {
                Some(id) => ProcessorEvent::PaymentFailed {
                    reference: id.to_string(),
                },
                None => ProcessorEvent::Unknown { event_type },
            },
            "account.updated" => match object["id"].as_str() {
                Some(id) => ProcessorEvent::AccountUpdated {
                    account_id: id.to_string(),
                    user_id: object["metadata"]["user_id"]
                        .as_str()
                        .and_then(|raw| Uuid::parse_str(raw).ok()),
                    charges_enabled: object["charges_enabled"].as_bool().unwrap_or(false),
                    payouts_enabled: object["payouts_enabled"].as_bool().unwrap_or(false),
                    details_submitted: object["details_submitted"].as_bool().unwrap_or(false),
                },
                None => ProcessorEvent::Unknown { event_type },
            },
            _ => ProcessorEvent::Unknown { event_type },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(body: &str, secret: &str, timestamp: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, body).as_bytes());
        format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn accepts_valid_signature() {
        let body = r#"{"type":"payment_intent.succeeded"}"#;
        let header = sign(body, "whsec_test", "1712000000");
        assert!(verify_webhook_signature(body, &header, "whsec_test"));
    }

    #[test]
    fn rejects_tampered_body() {
        let body = r#"{"type":"payment_intent.succeeded"}"#;
        let header = sign(body, "whsec_test", "1712000000");
        let tampered = r#"{"type":"payment_intent.payment_failed"}"#;
        assert!(!verify_webhook_signature(tampered, &header, "whsec_test"));
    }

    #[test]
    fn rejects_wrong_secret() {
        let body = r#"{"type":"payment_intent.succeeded"}"#;
        let header = sign(body, "whsec_other", "1712000000");
        assert!(!verify_webhook_signature(body, &header, "whsec_test"));
    }

    #[test]
    fn rejects_malformed_header() {
        assert!(!verify_webhook_signature("{}", "not-a-signature", "whsec_test"));
        assert!(!verify_webhook_signature("{}", "t=123", "whsec_test"));
        assert!(!verify_webhook_signature("{}", "", "whsec_test"));
    }

    #[test]
    fn decodes_payment_succeeded() {
        let body = serde_json::json!({
            "type": "payment_intent.succeeded",
            "data": { "object": { "id": "pi_123" } }
        });
        assert_eq!(
            ProcessorEvent::decode(&body),
            ProcessorEvent::PaymentSucceeded {
                reference: "pi_123".to_string()
            }
        );
    }

    #[test]
    fn decodes_account_updated_with_metadata() {
        let user_id = Uuid::new_v4();
        let body = serde_json::json!({
            "type": "account.updated",
            "data": { "object": {
                "id": "acct_9",
                "charges_enabled": true,
                "payouts_enabled": true,
                "details_submitted": false,
                "metadata": { "user_id": user_id.to_string() }
            }}
        });
        match ProcessorEvent::decode(&body) {
            ProcessorEvent::AccountUpdated {
                account_id,
                user_id: decoded_user,
                charges_enabled,
                payouts_enabled,
                details_submitted,
            } => {
                assert_eq!(account_id, "acct_9");
                assert_eq!(decoded_user, Some(user_id));
                assert!(charges_enabled);
                assert!(payouts_enabled);
                assert!(!details_submitted);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn unrecognized_event_types_decode_to_unknown() {
        let body = serde_json::json!({
            "type": "invoice.finalized",
            "data": { "object": { "id": "in_1" } }
        });
        assert_eq!(
            ProcessorEvent::decode(&body),
            ProcessorEvent::Unknown {
                event_type: "invoice.finalized".to_string()
            }
        );
    }
}
