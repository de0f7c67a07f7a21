//! Get Cart Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use emporium_app::domain::carts::records::{CartItemRecord, CartRecord};

use crate::{
    carts::into_status_error,
    envelope::{ApiResult, Envelope},
    extensions::*,
    state::State,
};

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// The unique identifier of the cart
    pub uuid: Uuid,

    /// The items in the cart
    pub items: Vec<CartItemResponse>,

    /// Sum of line totals in pence/cents
    pub total_price: u64,

    /// Sum of line quantities
    pub total_items: u64,

    /// The date and time the cart was last updated
    pub updated_at: String,
}

impl From<CartRecord> for CartResponse {
    fn from(cart: CartRecord) -> Self {
        CartResponse {
            uuid: cart.uuid.into(),
            items: cart.items.into_iter().map(CartItemResponse::from).collect(),
            total_price: cart.total_price,
            total_items: cart.total_items,
            updated_at: cart.updated_at.to_string(),
        }
    }
}

/// Cart Item Response
///
/// Name, image and price are snapshots from when the product was first added.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    /// The unique identifier of the product in the cart item
    pub product_uuid: Uuid,

    pub name: String,

    pub image: String,

    /// Unit price in pence/cents
    pub price: u64,

    pub quantity: u32,
}

impl From<CartItemRecord> for CartItemResponse {
    fn from(item: CartItemRecord) -> Self {
        CartItemResponse {
            product_uuid: item.product_uuid.into(),
            name: item.name,
            image: item.image,
            price: item.price,
            quantity: item.quantity,
        }
    }
}

/// Get Cart Handler
///
/// Returns the caller's cart, creating an empty one on first access.
#[endpoint(
    tags("cart"),
    summary = "Get Cart",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> ApiResult<CartResponse> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let cart = state
        .app
        .carts
        .get_cart(principal.user_uuid)
        .await
        .map_err(into_status_error)?;

    Ok(Envelope::ok(cart.into()))
}
