//! Prometheus metrics collection and exposition endpoint.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
    core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

/// How a payment confirmation reached the order.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ConfirmationSource {
    Explicit,
    Webhook,
}

impl ConfirmationSource {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Webhook => "webhook",
        }
    }
}

#[derive(Debug)]
struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    checkouts_total: IntCounterVec,
    payment_confirmations_total: IntCounterVec,
    webhook_events_total: IntCounterVec,
}

static METRICS: OnceLock<Option<Metrics>> = OnceLock::new();

#[derive(Debug)]
pub(super) struct InFlightRequestGuard {
    tracked: bool,
}

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        let Some(metrics) = metrics() else {
            return Self { tracked: false };
        };

        metrics.requests_in_flight.inc();

        Self { tracked: true }
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if self.tracked
            && let Some(metrics) = metrics()
        {
            metrics.requests_in_flight.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let status_code_label = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[method, route, status_class(status_code), &status_code_label])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

/// Count a placed order by payment method.
pub(crate) fn record_checkout(payment_method: &str) {
    if let Some(metrics) = metrics() {
        metrics
            .checkouts_total
            .with_label_values(&[payment_method])
            .inc();
    }
}

/// Count a payment confirmation attempt and how it ended.
pub(crate) fn record_payment_confirmation(source: ConfirmationSource, outcome: &str) {
    if let Some(metrics) = metrics() {
        metrics
            .payment_confirmations_total
            .with_label_values(&[source.as_str(), outcome])
            .inc();
    }
}

/// Count a verified webhook delivery by event type.
pub(crate) fn record_webhook_event(event: &str) {
    if let Some(metrics) = metrics() {
        metrics
            .webhook_events_total
            .with_label_values(&[event])
            .inc();
    }
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    };

    let encoder = TextEncoder::new();
    let mut encoded = Vec::new();

    if let Err(source) = encoder.encode(&metrics.registry.gather(), &mut encoded) {
        error!("failed to encode metrics response: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    match HeaderValue::from_str(encoder.format_type()) {
        Ok(content_type) => {
            res.headers_mut().insert(CONTENT_TYPE, content_type);
        }
        Err(source) => {
            error!("failed to encode metrics content type header: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

            return;
        }
    }

    res.render(String::from_utf8_lossy(&encoded).into_owned());
}

fn metrics() -> Option<&'static Metrics> {
    METRICS.get_or_init(build_metrics).as_ref()
}

fn counter(registry: &Registry, name: &str, help: &str, labels: &[&str]) -> Option<IntCounterVec> {
    let metric = IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| error!("failed to create {name} metric: {source}"))
        .ok()?;

    register(registry, name, metric)
}

fn register<M>(registry: &Registry, name: &str, metric: M) -> Option<M>
where
    M: Collector + Clone + 'static,
{
    registry
        .register(Box::new(metric.clone()))
        .map_err(|source| error!("failed to register {name} metric: {source}"))
        .ok()?;

    Some(metric)
}

fn build_metrics() -> Option<Metrics> {
    let registry = Registry::new();

    let requests_total = counter(
        &registry,
        "emporium_json_http_requests_total",
        "Total HTTP requests partitioned by method, route, status class, and status code.",
        &["method", "route", "status_class", "status_code"],
    )?;

    let request_duration_seconds = HistogramVec::new(
        HistogramOpts::new(
            "emporium_json_http_request_duration_seconds",
            "HTTP request duration in seconds partitioned by method and route.",
        )
        .buckets(vec![
            0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "route"],
    )
    .map_err(|source| error!("failed to create request_duration metric: {source}"))
    .ok()?;

    let request_duration_seconds = register(
        &registry,
        "emporium_json_http_request_duration_seconds",
        request_duration_seconds,
    )?;

    let requests_in_flight = IntGauge::with_opts(Opts::new(
        "emporium_json_http_requests_in_flight",
        "Current number of in-flight HTTP requests.",
    ))
    .map_err(|source| error!("failed to create in-flight gauge metric: {source}"))
    .ok()?;

    let requests_in_flight = register(
        &registry,
        "emporium_json_http_requests_in_flight",
        requests_in_flight,
    )?;

    let checkouts_total = counter(
        &registry,
        "emporium_json_checkouts_total",
        "Orders placed, partitioned by payment method.",
        &["payment_method"],
    )?;

    let payment_confirmations_total = counter(
        &registry,
        "emporium_json_payment_confirmations_total",
        "Payment confirmations partitioned by source and outcome.",
        &["source", "outcome"],
    )?;

    let webhook_events_total = counter(
        &registry,
        "emporium_json_webhook_events_total",
        "Verified payment webhook deliveries partitioned by event type.",
        &["event"],
    )?;

    Some(Metrics {
        registry,
        requests_total,
        request_duration_seconds,
        requests_in_flight,
        checkouts_total,
        payment_confirmations_total,
        webhook_events_total,
    })
}

fn status_class(status_code: u16) -> &'static str {
    match status_code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}
