//! Payment gateway abstraction.

use std::collections::BTreeMap;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state reported by the gateway for an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    #[serde(other)]
    Unknown,
}

impl IntentStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresAction => "requires_action",
            Self::Processing => "processing",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Succeeded => "succeeded",
            Self::Unknown => "unknown",
        }
    }
}

/// Gateway handle for one payment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,

    #[serde(default)]
    pub client_secret: Option<String>,

    pub status: IntentStatus,

    pub amount: u64,

    pub currency: String,

    #[serde(default)]
    pub receipt_email: Option<String>,

    /// Unix seconds.
    #[serde(default)]
    pub created: i64,

    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Request to open a payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentIntent {
    /// Amount in minor units.
    pub amount: u64,
    pub currency: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum PaymentGatewayError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway refused the request.
    #[error("payment gateway rejected the request: {0}")]
    Rejected(String),

    /// The gateway returned a non-2xx response or unexpected body.
    #[error("unexpected response from payment gateway: {0}")]
    UnexpectedResponse(String),
}

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a new payment intent.
    async fn create_intent(
        &self,
        intent: NewPaymentIntent,
    ) -> Result<PaymentIntent, PaymentGatewayError>;

    /// Fetch the current state of an intent.
    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, PaymentGatewayError>;
}
