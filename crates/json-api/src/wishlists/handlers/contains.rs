//! Wishlist Membership Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    envelope::{ApiResult, Envelope},
    extensions::*,
    state::State,
    wishlists::into_status_error,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct WishlistMembershipResponse {
    pub in_wishlist: bool,
}

/// Wishlist Membership Handler
#[endpoint(
    tags("wishlist"),
    summary = "Check Wishlist",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> ApiResult<WishlistMembershipResponse> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let in_wishlist = state
        .app
        .wishlists
        .contains(principal.user_uuid, product.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Envelope::ok(WishlistMembershipResponse { in_wishlist }))
}
