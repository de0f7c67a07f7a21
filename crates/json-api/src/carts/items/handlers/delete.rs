//! Delete Cart Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    carts::{get::CartResponse, into_status_error},
    envelope::{ApiResult, Envelope},
    extensions::*,
    state::State,
};

/// Delete Cart Item Handler
///
/// Removing a product that is not in the cart is not an error.
#[endpoint(
    tags("cart"),
    summary = "Remove Item from Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Item removed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(product: PathParam<Uuid>, depot: &mut Depot) -> ApiResult<CartResponse> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let cart = state
        .app
        .carts
        .remove_item(principal.user_uuid, product.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Envelope::ok(cart.into()))
}
