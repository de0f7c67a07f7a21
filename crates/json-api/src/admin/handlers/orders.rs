//! Admin List Orders Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    envelope::{ApiResult, Envelope},
    extensions::*,
    orders::{self, OrderResponse},
    state::State,
};

/// Admin List Orders Handler
///
/// Every order, newest first.
#[endpoint(
    tags("admin"),
    summary = "List All Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Orders"),
        (status_code = StatusCode::FORBIDDEN, description = "Not an admin"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> ApiResult<Vec<OrderResponse>> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.admin_or_403()?;

    let orders = state
        .app
        .orders
        .list_all_orders(admin)
        .await
        .map_err(orders::into_status_error)?;

    Ok(Envelope::ok(orders.into_iter().map(Into::into).collect()))
}
