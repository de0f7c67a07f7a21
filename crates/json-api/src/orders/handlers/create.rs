//! Create Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use emporium_app::domain::orders::{data::NewOrder, records::PaymentMethod};

use crate::{
    envelope::{ApiResult, Envelope},
    extensions::*,
    observability::record_checkout,
    orders::{OrderResponse, ShippingAddressBody, into_status_error},
    state::State,
};

/// Create Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateOrderRequest {
    pub shipping_address: ShippingAddressBody,
    /// `stripe` or `cod`
    pub payment_method: String,
}

/// Checkout Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutResponse {
    pub order: OrderResponse,
    /// Present for `stripe` orders; hand it to the card form.
    pub client_secret: Option<String>,
    pub payment_intent_id: Option<String>,
}

/// Create Order Handler
///
/// Checks out the caller's cart. Stock is reserved for every line, or for none.
#[endpoint(
    tags("orders"),
    summary = "Create Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Empty cart, missing address fields or out of stock"),
        (status_code = StatusCode::CONFLICT, description = "Another checkout for this cart is in progress"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Payment setup failed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.create",
    skip(json, depot, res),
    fields(order_uuid = tracing::field::Empty, payment_method = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> ApiResult<CheckoutResponse> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let request = json.into_inner();

    let payment_method = request
        .payment_method
        .parse::<PaymentMethod>()
        .or_400("Invalid payment method")?;

    let span = tracing::Span::current();

    span.record("payment_method", payment_method.as_str());

    let checkout = state
        .app
        .orders
        .create_order(
            principal.user_uuid,
            NewOrder {
                shipping_address: request.shipping_address.into(),
                payment_method,
            },
        )
        .await
        .map_err(into_status_error)?;

    span.record("order_uuid", tracing::field::display(checkout.order.uuid));

    record_checkout(payment_method.as_str());

    let (client_secret, payment_intent_id) = checkout
        .payment
        .map(|setup| (setup.client_secret, setup.payment_intent_id))
        .unzip();

    res.status_code(StatusCode::CREATED);

    Ok(Envelope::ok(CheckoutResponse {
        order: checkout.order.into(),
        client_secret,
        payment_intent_id,
    }))
}
