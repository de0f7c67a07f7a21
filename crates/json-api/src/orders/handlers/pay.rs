//! Pay Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    envelope::{ApiResult, Envelope},
    extensions::*,
    observability::{ConfirmationSource, record_payment_confirmation},
    orders::{OrderResponse, into_status_error},
    state::State,
};

/// Pay Order Request
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub(crate) struct PayOrderRequest {
    /// Required for `stripe` orders; checked against the gateway.
    pub payment_intent_id: Option<String>,
}

/// Pay Order Handler
///
/// Card orders are only marked paid once the gateway reports the intent succeeded.
#[endpoint(
    tags("orders"),
    summary = "Pay Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order paid"),
        (status_code = StatusCode::BAD_REQUEST, description = "Payment not successful"),
        (status_code = StatusCode::FORBIDDEN, description = "Order belongs to another user"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order already paid or cancelled"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Payment gateway error"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.pay",
    skip(order, json, depot),
    fields(order_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<PayOrderRequest>,
    depot: &mut Depot,
) -> ApiResult<OrderResponse> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let order = order.into_inner();

    tracing::Span::current().record("order_uuid", tracing::field::display(order));

    let paid = state
        .app
        .orders
        .mark_paid(principal, order.into(), json.into_inner().payment_intent_id)
        .await
        .inspect_err(|_| record_payment_confirmation(ConfirmationSource::Explicit, "rejected"))
        .map_err(into_status_error)?;

    record_payment_confirmation(ConfirmationSource::Explicit, "paid");

    Ok(Envelope::ok(paid.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use emporium_app::domain::orders::{
        MockOrdersService, OrdersServiceError,
        records::{OrderUuid, PaymentMethod},
    };

    use crate::{
        orders::tests::make_order,
        test_helpers::{Mocks, customer, service_as},
    };

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        service_as(
            customer(),
            Mocks { orders, ..Mocks::default() },
            Router::with_path("orders/{order}/pay").put(handler),
        )
    }

    #[tokio::test]
    async fn test_intent_id_is_forwarded() -> TestResult {
        let uuid = OrderUuid::new();
        let mut orders = MockOrdersService::new();

        orders
            .expect_mark_paid()
            .once()
            .withf(move |_, o, intent| *o == uuid && intent.as_deref() == Some("pi_123"))
            .return_once(move |_, _, _| {
                let mut order = make_order(uuid, PaymentMethod::Stripe);

                order.is_paid = true;
                order.paid_at = Some(Timestamp::UNIX_EPOCH);

                Ok(order)
            });

        let mut res = TestClient::put(format!("http://example.com/orders/{uuid}/pay"))
            .json(&json!({ "payment_intent_id": "pi_123" }))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: Envelope<OrderResponse> = res.take_json().await?;
        let order = body.data.ok_or("missing data")?;

        assert!(order.is_paid);
        assert!(order.paid_at.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_cod_order_needs_no_intent() -> TestResult {
        let uuid = OrderUuid::new();
        let mut orders = MockOrdersService::new();

        orders
            .expect_mark_paid()
            .once()
            .withf(|_, _, intent| intent.is_none())
            .return_once(move |_, _, _| Ok(make_order(uuid, PaymentMethod::Cod)));

        let res = TestClient::put(format!("http://example.com/orders/{uuid}/pay"))
            .json(&json!({}))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_failures_map_to_status_codes() -> TestResult {
        let cases: [(fn() -> OrdersServiceError, StatusCode); 4] = [
            (
                || OrdersServiceError::PaymentNotSuccessful("requires_payment_method".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (|| OrdersServiceError::PaymentIntentMismatch, StatusCode::BAD_REQUEST),
            (|| OrdersServiceError::AlreadyPaid, StatusCode::CONFLICT),
            (|| OrdersServiceError::Cancelled, StatusCode::CONFLICT),
        ];

        for (error, expected) in cases {
            let mut orders = MockOrdersService::new();

            orders
                .expect_mark_paid()
                .once()
                .return_once(move |_, _, _| Err(error()));

            let res = TestClient::put(format!("http://example.com/orders/{}/pay", OrderUuid::new()))
                .json(&json!({ "payment_intent_id": "pi_123" }))
                .send(&make_service(orders))
                .await;

            assert_eq!(res.status_code, Some(expected));
        }

        Ok(())
    }
}
