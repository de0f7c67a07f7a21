//! Request-level logging, request IDs, and parent trace extraction.

mod parent_context;
mod request_ids;
mod spans;

use std::time::Instant;

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::{Instrument as _, Span, error, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use emporium_app::auth::Principal;

use super::{metrics, settings};
use parent_context::ParentContext;
use request_ids::RequestId;

/// Paths polled by infrastructure; they bypass request spans and metrics.
const UNTRACED_PATHS: [&str; 2] = ["/metrics", "/healthcheck"];

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if UNTRACED_PATHS.contains(&req.uri().path()) {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();
    let request_id = RequestId::resolve(req.header::<String>(request_ids::REQUEST_ID_HEADER));

    request_id.write_header(res);
    depot.inject(request_id.clone());

    let method = req.method().to_string();
    let path = req.uri().path().to_owned();
    let route = spans::route_template(&path);
    let span_name = format!("{method} {route}");
    let remote_addr = req.remote_addr().to_string();
    let _in_flight = metrics::InFlightRequestGuard::track();

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        otel.name = %span_name,
        otel.kind = "server",
        request_id = %request_id,
        method = %method,
        path = %path,
        route = %route,
        remote_addr = %remote_addr,
        user_uuid = tracing::field::Empty,
        role = tracing::field::Empty,
        status = tracing::field::Empty,
        duration_ms = tracing::field::Empty
    );

    if settings::otel_parent_propagation_enabled()
        && let Some(ParentContext(parent)) = ParentContext::extract(req.headers())
        && let Err(source) = span.set_parent(parent)
    {
        warn!("failed to set parent context on request span: {source}");
    }

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    if let Ok(principal) = depot.obtain::<Principal>() {
        record_principal(&span, principal);
    }

    let duration = started.elapsed();
    let status = res.status_code.unwrap_or(StatusCode::OK);
    let duration_ms = duration.as_millis();
    let threshold_ms = u128::from(settings::slow_request_threshold_ms());

    metrics::observe_request(&method, &route, status.as_u16(), duration.as_secs_f64());

    span.record("status", status.as_u16());
    span.record("duration_ms", duration_ms);

    span.in_scope(|| {
        info!(status = status.as_u16(), duration_ms, "request.completed");

        if status.is_server_error() {
            error!(status = status.as_u16(), %method, %route, "server error response");
        } else if status.is_client_error() {
            warn!(status = status.as_u16(), %method, %route, "client error response");
        }

        if duration_ms > threshold_ms {
            warn!(%method, %route, duration_ms, threshold_ms, "slow request detected");
        }
    });
}

fn record_principal(span: &Span, principal: &Principal) {
    span.record("user_uuid", tracing::field::display(principal.user_uuid));
    span.record("role", principal.role.as_str());
}

#[cfg(test)]
mod tests {
    use salvo::{
        Router, Service,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use super::*;

    #[handler]
    async fn echo_request_id(depot: &mut Depot) -> String {
        depot
            .obtain::<RequestId>()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    fn service() -> Service {
        Service::new(
            Router::new()
                .hoop(request_logging)
                .push(Router::with_path("orders").get(echo_request_id))
                .push(Router::with_path("healthcheck").get(echo_request_id)),
        )
    }

    #[tokio::test]
    async fn generated_request_id_is_echoed_and_injected() -> TestResult {
        let mut res = TestClient::get("http://example.com/orders")
            .send(&service())
            .await;

        let header = res
            .headers()
            .get(request_ids::REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .ok_or("missing request id header")?;

        let body = res.take_string().await?;

        assert_eq!(body, header);
        assert!(!header.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn client_request_id_is_preserved() -> TestResult {
        let res = TestClient::get("http://example.com/orders")
            .add_header(request_ids::REQUEST_ID_HEADER, "checkout-42", true)
            .send(&service())
            .await;

        let header = res
            .headers()
            .get(request_ids::REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok());

        assert_eq!(header, Some("checkout-42"));

        Ok(())
    }

    #[tokio::test]
    async fn healthcheck_is_not_traced() -> TestResult {
        let mut res = TestClient::get("http://example.com/healthcheck")
            .send(&service())
            .await;

        assert!(res.headers().get(request_ids::REQUEST_ID_HEADER).is_none());
        assert_eq!(res.take_string().await?, "");

        Ok(())
    }
}
