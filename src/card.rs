use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CardGatewayError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("gateway returned malformed payload: {0}")]
    Malformed(String),
}

/// Result of creating and confirming a payment intent. `status` is the
/// gateway's own vocabulary ("succeeded", "requires_action", ...); mapping
/// onto our payment lifecycle happens in the payment service.
#[derive(Debug, Clone)]
pub struct IntentOutcome {
    pub intent_id: String,
    pub status: String,
    pub raw: String,
}

#[derive(Debug, Clone)]
pub struct RefundOutcome {
    pub refund_id: String,
    pub status: String,
    pub raw: String,
}

#[async_trait]
pub trait CardGateway: Send + Sync {
    async fn create_and_confirm_intent(
        &self,
        amount: Decimal,
        currency: &str,
        payment_method_id: &str,
        order_id: i64,
    ) -> Result<IntentOutcome, CardGatewayError>;

    async fn create_refund(
        &self,
        intent_id: &str,
        amount: Decimal,
    ) -> Result<RefundOutcome, CardGatewayError>;
}

/// HTTP client for a Stripe-style card processor.
pub struct HttpCardGateway {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpCardGateway {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IntentBody {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct RefundBody {
    id: String,
    status: String,
}

fn to_minor_units(amount: Decimal) -> Result<i64, CardGatewayError> {
    (amount * Decimal::from(100))
        .round()
        .to_i64()
        .ok_or_else(|| CardGatewayError::Malformed(format!("amount out of range: {amount}")))
}

#[async_trait]
impl CardGateway for HttpCardGateway {
    async fn create_and_confirm_intent(
        &self,
        amount: Decimal,
        currency: &str,
        payment_method_id: &str,
        order_id: i64,
    ) -> Result<IntentOutcome, CardGatewayError> {
        let minor = to_minor_units(amount)?;
        let url = format!("{}/payment_intents", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .form(&[
                ("amount", minor.to_string()),
                ("currency", currency.to_string()),
                ("payment_method", payment_method_id.to_string()),
                ("confirm", "true".to_string()),
                ("metadata[order_id]", order_id.to_string()),
            ])
            .send()
            .await?;

        let raw = response.text().await?;
        let body: IntentBody = serde_json::from_str(&raw)
            .map_err(|err| CardGatewayError::Malformed(err.to_string()))?;

        Ok(IntentOutcome {
            intent_id: body.id,
            status: body.status,
            raw,
        })
    }

    async fn create_refund(
        &self,
        intent_id: &str,
        amount: Decimal,
    ) -> Result<RefundOutcome, CardGatewayError> {
        let minor = to_minor_units(amount)?;
        let url = format!("{}/refunds", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .form(&[
                ("payment_intent", intent_id.to_string()),
                ("amount", minor.to_string()),
            ])
            .send()
            .await?;

        let raw = response.text().await?;
        let body: RefundBody = serde_json::from_str(&raw)
            .map_err(|err| CardGatewayError::Malformed(err.to_string()))?;

        Ok(RefundOutcome {
            refund_id: body.id,
            status: body.status,
            raw,
        })
    }
}
