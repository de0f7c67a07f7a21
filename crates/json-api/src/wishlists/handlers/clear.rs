//! Clear Wishlist Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    envelope::{ApiResult, Envelope, NoData},
    extensions::*,
    state::State,
    wishlists::into_status_error,
};

/// Clear Wishlist Handler
#[endpoint(
    tags("wishlist"),
    summary = "Clear Wishlist",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> ApiResult<NoData> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    state
        .app
        .wishlists
        .clear(principal.user_uuid)
        .await
        .map_err(into_status_error)?;

    Ok(Envelope::message("Wishlist cleared"))
}
