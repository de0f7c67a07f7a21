//! Payment Webhook Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use emporium_app::{
    domain::orders::IntentConfirmation,
    payments::{
        PaymentIntent,
        webhook::{SIGNATURE_HEADER, WebhookError, WebhookEvent},
    },
};

use crate::{
    envelope::{ApiResult, Envelope},
    extensions::*,
    observability::{ConfirmationSource, record_payment_confirmation, record_webhook_event},
    state::State,
};

/// Webhook Receipt
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct WebhookReceipt {
    pub received: bool,
}

/// Payment Webhook Handler
///
/// Verifies the gateway signature over the raw body. Verified events are
/// always acknowledged; a payment that cannot be applied is only logged.
#[endpoint(
    tags("payments"),
    summary = "Payment Webhook",
    responses(
        (status_code = StatusCode::OK, description = "Event received"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing or invalid signature"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "payments.webhook", skip(req, depot), err)]
pub(crate) async fn handler(req: &mut Request, depot: &mut Depot) -> ApiResult<WebhookReceipt> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .ok_or_else(|| StatusError::bad_request().brief("Missing webhook signature"))?;

    let payload = req.payload().await.or_400("Invalid webhook body")?;

    let event = state
        .webhook
        .parse(&signature, payload, Timestamp::now())
        .map_err(into_status_error)?;

    match event {
        WebhookEvent::PaymentSucceeded(intent) => {
            record_webhook_event("payment_intent.succeeded");
            confirm(&state, intent).await;
        }
        WebhookEvent::PaymentFailed(intent) => {
            record_webhook_event("payment_intent.payment_failed");
            warn!(
                payment_intent_id = %intent.id,
                status = intent.status.as_str(),
                "payment failed"
            );
        }
        WebhookEvent::Ignored(kind) => {
            record_webhook_event("ignored");
            debug!(kind = %kind, "ignored webhook event");
        }
    }

    Ok(Envelope::ok(WebhookReceipt { received: true }))
}

async fn confirm(state: &State, intent: PaymentIntent) {
    let intent_id = intent.id.clone();

    let result = state.app.orders.confirm_intent(intent).await;

    record_payment_confirmation(
        ConfirmationSource::Webhook,
        match &result {
            Ok(IntentConfirmation::Paid(_)) => "paid",
            Ok(IntentConfirmation::AlreadyPaid(_)) => "already_paid",
            Ok(IntentConfirmation::Cancelled(_)) => "cancelled",
            Ok(IntentConfirmation::UnknownIntent) => "unknown_intent",
            Err(_) => "error",
        },
    );

    match result {
        Ok(IntentConfirmation::Paid(order)) => {
            info!(order_uuid = %order.uuid, payment_intent_id = %intent_id, "order paid via webhook");
        }
        Ok(IntentConfirmation::AlreadyPaid(order)) => {
            info!(order_uuid = %order, payment_intent_id = %intent_id, "order already paid");
        }
        Ok(IntentConfirmation::Cancelled(order)) => {
            warn!(order_uuid = %order, payment_intent_id = %intent_id, "payment received for cancelled order");
        }
        Ok(IntentConfirmation::UnknownIntent) => {
            warn!(payment_intent_id = %intent_id, "no order for payment intent");
        }
        Err(source) => {
            error!(payment_intent_id = %intent_id, "failed to apply webhook payment: {source}");
        }
    }
}

fn into_status_error(error: WebhookError) -> StatusError {
    match error {
        WebhookError::MalformedHeader
        | WebhookError::StaleTimestamp
        | WebhookError::SignatureMismatch => {
            StatusError::bad_request().brief("Webhook signature verification failed")
        }
        WebhookError::InvalidPayload(source) => {
            debug!("rejected webhook payload: {source}");

            StatusError::bad_request().brief("Invalid webhook payload")
        }
        WebhookError::EmptySecret | WebhookError::InvalidSecret => {
            error!("webhook secret cannot key the signature check");

            StatusError::internal_server_error()
        }
    }
}
