//! Get Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    envelope::{ApiResult, Envelope},
    extensions::*,
    orders::{OrderResponse, into_status_error},
    state::State,
};

/// Get Order Handler
///
/// Owners can read their own orders; admins can read any.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order found"),
        (status_code = StatusCode::FORBIDDEN, description = "Order belongs to another user"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(order: PathParam<Uuid>, depot: &mut Depot) -> ApiResult<OrderResponse> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let order = state
        .app
        .orders
        .get_order(principal, order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Envelope::ok(order.into()))
}
