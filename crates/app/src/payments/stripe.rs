//! Stripe-compatible payment intents client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;

use crate::payments::{NewPaymentIntent, PaymentGateway, PaymentGatewayError, PaymentIntent};

/// Configuration for connecting to the Stripe API.
#[derive(Clone)]
pub struct StripeConfig {
    /// API base URL, e.g. `"https://api.stripe.com"`.
    pub api_base: String,

    /// Secret API key sent as a bearer token.
    pub secret_key: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_base", &self.api_base)
            .field("secret_key", &"**redacted**")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HTTP client for Stripe payment intents.
#[derive(Debug, Clone)]
pub struct StripeGateway {
    config: StripeConfig,
    http: Client,
}

impl StripeGateway {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StripeConfig) -> Result<Self, PaymentGatewayError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { config, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base.trim_end_matches('/'))
    }
}

/// Flatten an intent request into Stripe's form-encoded parameters.
fn intent_params(intent: &NewPaymentIntent) -> Vec<(String, String)> {
    let mut params = vec![
        ("amount".to_string(), intent.amount.to_string()),
        ("currency".to_string(), intent.currency.to_lowercase()),
        (
            "automatic_payment_methods[enabled]".to_string(),
            "true".to_string(),
        ),
    ];

    params.extend(
        intent
            .metadata
            .iter()
            .map(|(key, value)| (format!("metadata[{key}]"), value.clone())),
    );

    params
}

async fn parse_intent(response: Response) -> Result<PaymentIntent, PaymentGatewayError> {
    let status = response.status();

    if status.is_client_error() {
        let text = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorResponse>(&text)
            .ok()
            .and_then(|body| body.error.message)
            .unwrap_or(text);

        return Err(PaymentGatewayError::Rejected(message));
    }

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();

        return Err(PaymentGatewayError::UnexpectedResponse(format!(
            "request failed with status {status}: {text}"
        )));
    }

    Ok(response.json().await?)
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        intent: NewPaymentIntent,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        let response = self
            .http
            .post(self.url("/v1/payment_intents"))
            .bearer_auth(&self.config.secret_key)
            .form(&intent_params(&intent))
            .send()
            .await?;

        parse_intent(response).await
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, PaymentGatewayError> {
        if intent_id.is_empty() || !intent_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(PaymentGatewayError::Rejected(
                "malformed payment intent id".to_string(),
            ));
        }

        let response = self
            .http
            .get(self.url(&format!("/v1/payment_intents/{intent_id}")))
            .bearer_auth(&self.config.secret_key)
            .send()
            .await?;

        parse_intent(response).await
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}
