//! Remove Wishlist Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    envelope::{ApiResult, Envelope, NoData},
    extensions::*,
    state::State,
    wishlists::into_status_error,
};

/// Remove Wishlist Item Handler
///
/// Removing a product that is not on the wishlist is not an error.
#[endpoint(
    tags("wishlist"),
    summary = "Remove from Wishlist",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(product: PathParam<Uuid>, depot: &mut Depot) -> ApiResult<NoData> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    state
        .app
        .wishlists
        .remove(principal.user_uuid, product.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Envelope::message("Removed from wishlist"))
}
