//! Wishlist Index Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    envelope::{ApiResult, Envelope},
    extensions::*,
    products::get::ProductResponse,
    state::State,
    wishlists::into_status_error,
};

/// Wishlist Index Handler
///
/// Returns the live products on the caller's wishlist.
#[endpoint(
    tags("wishlist"),
    summary = "List Wishlist",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> ApiResult<Vec<ProductResponse>> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let products = state
        .app
        .wishlists
        .list(principal.user_uuid)
        .await
        .map_err(into_status_error)?;

    Ok(Envelope::ok(products.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use emporium_app::domain::{products::records::ProductUuid, wishlists::MockWishlistsService};

    use crate::{
        products::tests::make_product,
        test_helpers::{Mocks, TEST_USER_UUID, customer, service_as},
    };

    use super::*;

    #[tokio::test]
    async fn test_index_returns_wishlisted_products() -> TestResult {
        let uuid = ProductUuid::new();
        let mut wishlists = MockWishlistsService::new();

        wishlists
            .expect_list()
            .once()
            .withf(|user| *user == TEST_USER_UUID)
            .return_once(move |_| Ok(vec![make_product(uuid)]));

        let body: Envelope<Vec<ProductResponse>> = TestClient::get("http://example.com/wishlist")
            .send(&service_as(
                customer(),
                Mocks { wishlists, ..Mocks::default() },
                Router::with_path("wishlist").get(handler),
            ))
            .await
            .take_json()
            .await?;

        let products = body.data.unwrap_or_default();

        assert_eq!(products.len(), 1, "expected one product");
        assert_eq!(products[0].uuid, uuid.into_uuid());

        Ok(())
    }
}
