//! Delete Product Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    envelope::{ApiResult, Envelope, NoData},
    extensions::*,
    products::into_status_error,
    state::State,
};

/// Delete Product Handler
///
/// Soft-deletes the product; it disappears from listings and lookups.
#[endpoint(
    tags("products"),
    summary = "Delete Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Product deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Not an admin"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(product: PathParam<Uuid>, depot: &mut Depot) -> ApiResult<NoData> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.admin_or_403()?;

    state
        .app
        .products
        .delete_product(admin, product.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Envelope::message("Product removed"))
}
