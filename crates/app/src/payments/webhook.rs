//! Signed gateway notifications.

use std::fmt;

use hmac::{Hmac, Mac};
use jiff::Timestamp;
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroize;

use crate::payments::PaymentIntent;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the notification signature.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Oldest signature timestamp accepted, in seconds.
pub const DEFAULT_TOLERANCE_SECONDS: i64 = 300;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("signature header is malformed")]
    MalformedHeader,

    #[error("signature timestamp is outside the tolerance window")]
    StaleTimestamp,

    #[error("no signature matched the payload")]
    SignatureMismatch,

    #[error("webhook secret is empty")]
    EmptySecret,

    #[error("webhook secret cannot key the signature")]
    InvalidSecret,

    #[error("event payload is invalid")]
    InvalidPayload(#[source] serde_json::Error),
}

/// Gateway notification relevant to order payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    PaymentSucceeded(PaymentIntent),
    PaymentFailed(PaymentIntent),
    Ignored(String),
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    data: RawEventData,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}

/// Verifies `t=<unix>,v1=<hex>` signatures over `"<t>.<body>"`.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Vec<u8>,
    tolerance_seconds: i64,
}

impl WebhookVerifier {
    /// # Errors
    ///
    /// Returns [`WebhookError::EmptySecret`] for an empty signing secret.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, WebhookError> {
        let secret = secret.into();

        if secret.is_empty() {
            return Err(WebhookError::EmptySecret);
        }

        Ok(Self {
            secret,
            tolerance_seconds: DEFAULT_TOLERANCE_SECONDS,
        })
    }

    #[must_use]
    pub const fn with_tolerance(mut self, tolerance_seconds: i64) -> Self {
        self.tolerance_seconds = tolerance_seconds;
        self
    }

    /// Check the signature header against `payload` at time `now`.
    ///
    /// # Errors
    ///
    /// Returns an error when the header is malformed, stale, or no `v1`
    /// signature matches.
    pub fn verify(&self, header: &str, payload: &[u8], now: Timestamp) -> Result<(), WebhookError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => {
                    timestamp = Some(
                        value
                            .parse::<i64>()
                            .map_err(|_| WebhookError::MalformedHeader)?,
                    );
                }
                Some(("v1", value)) => signatures.push(value),
                Some(_) => {}
                None => return Err(WebhookError::MalformedHeader),
            }
        }

        let timestamp = timestamp.ok_or(WebhookError::MalformedHeader)?;

        if signatures.is_empty() {
            return Err(WebhookError::MalformedHeader);
        }

        if now.as_second().abs_diff(timestamp) > self.tolerance_seconds.unsigned_abs() {
            return Err(WebhookError::StaleTimestamp);
        }

        let matched = signatures
            .into_iter()
            .filter_map(|signature| hex::decode(signature).ok())
            .map(|expected| {
                self.mac(timestamp, payload)
                    .map(|mac| mac.verify_slice(&expected).is_ok())
            })
            .collect::<Result<Vec<bool>, WebhookError>>()?;

        if matched.contains(&true) {
            Ok(())
        } else {
            Err(WebhookError::SignatureMismatch)
        }
    }

    /// Compute the `v1` signature for `payload` at `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret cannot key the HMAC.
    pub fn sign(&self, timestamp: i64, payload: &[u8]) -> Result<String, WebhookError> {
        let mac = self.mac(timestamp, payload)?;

        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Verify and decode a notification.
    ///
    /// # Errors
    ///
    /// Returns an error on a bad signature or an undecodable payload.
    pub fn parse(
        &self,
        header: &str,
        payload: &[u8],
        now: Timestamp,
    ) -> Result<WebhookEvent, WebhookError> {
        self.verify(header, payload, now)?;

        parse_event(payload)
    }

    fn mac(&self, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, WebhookError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| WebhookError::InvalidSecret)?;

        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);

        Ok(mac)
    }
}

impl fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("secret", &"**redacted**")
            .field("tolerance_seconds", &self.tolerance_seconds)
            .finish()
    }
}

impl Drop for WebhookVerifier {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

/// Decode a notification body without checking its signature.
///
/// # Errors
///
/// Returns an error when the body is not a payment-intent event.
pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent, WebhookError> {
    let event: RawEvent = serde_json::from_slice(payload).map_err(WebhookError::InvalidPayload)?;

    let intent = |object| serde_json::from_value::<PaymentIntent>(object);

    match event.kind.as_str() {
        "payment_intent.succeeded" => intent(event.data.object)
            .map(WebhookEvent::PaymentSucceeded)
            .map_err(WebhookError::InvalidPayload),
        "payment_intent.payment_failed" => intent(event.data.object)
            .map(WebhookEvent::PaymentFailed)
            .map_err(WebhookError::InvalidPayload),
        _ => Ok(WebhookEvent::Ignored(event.kind)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &[u8] = br#"{"id":"evt_1","type":"payment_intent.succeeded","data":{"object":{"id":"pi_1","status":"succeeded","amount":1100,"currency":"usd"}}}"#;

    fn now() -> Timestamp {
        Timestamp::from_second(1_700_000_000).expect("valid timestamp")
    }

    fn header(verifier: &WebhookVerifier, timestamp: i64) -> String {
        let signature = verifier.sign(timestamp, PAYLOAD).expect("signing succeeds");

        format!("t={timestamp},v1={signature}")
    }

    #[test]
    fn valid_signature_parses_event() {
        let verifier = WebhookVerifier::new("whsec_test").expect("secret is set");
        let header = header(&verifier, now().as_second());

        let event = verifier.parse(&header, PAYLOAD, now()).expect("event parses");

        assert!(matches!(
            event,
            WebhookEvent::PaymentSucceeded(ref intent) if intent.id == "pi_1"
        ));
    }

    #[test]
    fn any_matching_v1_entry_is_accepted() {
        let verifier = WebhookVerifier::new("whsec_test").expect("secret is set");
        let timestamp = now().as_second();
        let signature = verifier.sign(timestamp, PAYLOAD).expect("signing succeeds");
        let header = format!("t={timestamp},v1={},v0=legacy,v1={signature}", "00".repeat(32));

        assert!(verifier.verify(&header, PAYLOAD, now()).is_ok());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let signer = WebhookVerifier::new("whsec_other").expect("secret is set");
        let verifier = WebhookVerifier::new("whsec_test").expect("secret is set");
        let header = header(&signer, now().as_second());

        assert!(matches!(
            verifier.verify(&header, PAYLOAD, now()),
            Err(WebhookError::SignatureMismatch)
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let verifier = WebhookVerifier::new("whsec_test").expect("secret is set");
        let header = header(&verifier, now().as_second());

        assert!(matches!(
            verifier.verify(&header, b"{}", now()),
            Err(WebhookError::SignatureMismatch)
        ));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let verifier = WebhookVerifier::new("whsec_test").expect("secret is set");
        let header = header(&verifier, now().as_second() - 301);

        assert!(matches!(
            verifier.verify(&header, PAYLOAD, now()),
            Err(WebhookError::StaleTimestamp)
        ));
    }

    #[test]
    fn malformed_headers_are_rejected() {
        let verifier = WebhookVerifier::new("whsec_test").expect("secret is set");

        for header in ["", "t=abc,v1=00", "v1=00", "t=1700000000", "garbage"] {
            assert!(
                matches!(
                    verifier.verify(header, PAYLOAD, now()),
                    Err(WebhookError::MalformedHeader)
                ),
                "header {header:?} should be malformed"
            );
        }
    }

    #[test]
    fn unrelated_events_are_ignored() {
        let event = parse_event(br#"{"type":"charge.refunded","data":{"object":{}}}"#)
            .expect("event parses");

        assert_eq!(event, WebhookEvent::Ignored("charge.refunded".to_string()));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(
            WebhookVerifier::new(Vec::new()),
            Err(WebhookError::EmptySecret)
        ));
        assert!(matches!(WebhookVerifier::new(""), Err(WebhookError::EmptySecret)));
    }

    #[test]
    fn extreme_timestamps_are_stale() {
        let verifier = WebhookVerifier::new("whsec_test").expect("secret is set");

        for timestamp in [i64::MIN, i64::MAX, -1] {
            let header = format!("t={timestamp},v1={}", "00".repeat(32));

            assert!(
                matches!(
                    verifier.verify(&header, PAYLOAD, now()),
                    Err(WebhookError::StaleTimestamp)
                ),
                "t={timestamp} should be stale"
            );
        }
    }

    #[test]
    fn timestamps_inside_the_window_are_checked() {
        let verifier = WebhookVerifier::new("whsec_test").expect("secret is set");

        for offset in [-300, 300] {
            let header = header(&verifier, now().as_second() + offset);

            assert!(
                verifier.verify(&header, PAYLOAD, now()).is_ok(),
                "offset {offset} is within tolerance"
            );
        }
    }
}
