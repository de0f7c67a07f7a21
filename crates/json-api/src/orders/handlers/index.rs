//! List My Orders Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    envelope::{ApiResult, Envelope},
    extensions::*,
    orders::{OrderResponse, into_status_error},
    state::State,
};

/// List My Orders Handler
///
/// Newest first.
#[endpoint(
    tags("orders"),
    summary = "List My Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Orders"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid token"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> ApiResult<Vec<OrderResponse>> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let orders = state
        .app
        .orders
        .list_my_orders(principal.user_uuid)
        .await
        .map_err(into_status_error)?;

    Ok(Envelope::ok(orders.into_iter().map(Into::into).collect()))
}
