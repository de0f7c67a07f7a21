//! Update Order Status Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use emporium_app::domain::orders::records::OrderStatus;

use crate::{
    envelope::{ApiResult, Envelope},
    extensions::*,
    orders::{OrderResponse, into_status_error},
    state::State,
};

/// Update Order Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateOrderStatusRequest {
    /// `pending`, `processing`, `shipped`, `delivered` or `cancelled`
    pub status: String,
}

/// Update Order Status Handler
///
/// Delivering an order stamps it delivered. Cancelling an order returns its stock and reopening
/// a cancelled order reserves it again.
#[endpoint(
    tags("orders"),
    summary = "Update Order Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Status updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid status"),
        (status_code = StatusCode::FORBIDDEN, description = "Not an admin"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<UpdateOrderStatusRequest>,
    depot: &mut Depot,
) -> ApiResult<OrderResponse> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.admin_or_403()?;

    let status = json
        .into_inner()
        .status
        .parse::<OrderStatus>()
        .or_400("Invalid status")?;

    let updated = state
        .app
        .orders
        .set_status(admin, order.into_inner().into(), status)
        .await
        .map_err(into_status_error)?;

    info!(order_uuid = %updated.uuid, status = %updated.order_status, "order status updated");

    Ok(Envelope::ok(updated.into()))
}
