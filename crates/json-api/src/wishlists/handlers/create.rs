//! Add Wishlist Item Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    envelope::{ApiResult, Envelope, NoData},
    extensions::*,
    state::State,
    wishlists::into_status_error,
};

/// Add Wishlist Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddWishlistItemRequest {
    pub product_uuid: Uuid,
}

/// Add Wishlist Item Handler
///
/// Adding a product twice keeps a single entry.
#[endpoint(
    tags("wishlist"),
    summary = "Add to Wishlist",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Added"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<AddWishlistItemRequest>,
    depot: &mut Depot,
) -> ApiResult<NoData> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    state
        .app
        .wishlists
        .add(principal.user_uuid, json.into_inner().product_uuid.into())
        .await
        .map_err(into_status_error)?;

    Ok(Envelope::message("Added to wishlist"))
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use serde_json::json;
    use testresult::TestResult;

    use emporium_app::domain::{
        products::records::ProductUuid,
        wishlists::{MockWishlistsService, WishlistsServiceError},
    };

    use crate::test_helpers::{Mocks, customer, service_as};

    use super::*;

    fn make_service(wishlists: MockWishlistsService) -> Service {
        service_as(
            customer(),
            Mocks { wishlists, ..Mocks::default() },
            Router::with_path("wishlist/items").post(handler),
        )
    }

    #[tokio::test]
    async fn test_add_to_wishlist() -> TestResult {
        let product = ProductUuid::new();
        let mut wishlists = MockWishlistsService::new();

        wishlists
            .expect_add()
            .once()
            .withf(move |_, p| *p == product)
            .return_once(|_, _| Ok(()));

        let res = TestClient::post("http://example.com/wishlist/items")
            .json(&json!({ "product_uuid": product.into_uuid() }))
            .send(&make_service(wishlists))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_unknown_product_returns_404() -> TestResult {
        let mut wishlists = MockWishlistsService::new();

        wishlists
            .expect_add()
            .once()
            .return_once(|_, _| Err(WishlistsServiceError::ProductNotFound));

        let res = TestClient::post("http://example.com/wishlist/items")
            .json(&json!({ "product_uuid": ProductUuid::new().into_uuid() }))
            .send(&make_service(wishlists))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
