//! Get Product Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use emporium_app::domain::products::records::{ProductRecord, ReviewRecord};

use crate::{
    envelope::{ApiResult, Envelope},
    extensions::*,
    products::into_status_error,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductResponse {
    /// The unique identifier of the product
    pub uuid: Uuid,

    pub name: String,

    pub description: String,

    pub image: String,

    pub brand: String,

    pub category: String,

    /// The price of the product in pence/cents
    pub price: u64,

    /// Pre-discount price in pence/cents
    pub original_price: Option<u64>,

    /// Whole-percent discount from `original_price`
    pub discount_percentage: u64,

    pub stock: u32,

    pub in_stock: bool,

    /// Mean review rating
    pub rating: f64,

    pub num_reviews: u32,

    pub reviews: Vec<ReviewResponse>,

    /// The date and time the product was created
    pub created_at: String,

    /// The date and time the product was last updated
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ReviewResponse {
    pub user_uuid: Uuid,
    pub name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: String,
}

impl From<ReviewRecord> for ReviewResponse {
    fn from(review: ReviewRecord) -> Self {
        ReviewResponse {
            user_uuid: review.user_uuid.into(),
            name: review.name,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at.to_string(),
        }
    }
}

impl From<ProductRecord> for ProductResponse {
    fn from(product: ProductRecord) -> Self {
        let discount_percentage = product.discount_percentage();

        ProductResponse {
            uuid: product.uuid.into(),
            name: product.name,
            description: product.description,
            image: product.image,
            brand: product.brand,
            category: product.category.to_string(),
            price: product.price,
            original_price: product.original_price,
            discount_percentage,
            stock: product.stock,
            in_stock: product.in_stock,
            rating: product.rating,
            num_reviews: product.num_reviews,
            reviews: product.reviews.into_iter().map(Into::into).collect(),
            created_at: product.created_at.to_string(),
            updated_at: product.updated_at.to_string(),
        }
    }
}

/// Get Product Handler
///
/// Returns a product.
#[endpoint(
    tags("products"),
    summary = "Get Product",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(product: PathParam<Uuid>, depot: &mut Depot) -> ApiResult<ProductResponse> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let product = state
        .app
        .products
        .get_product(product.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Envelope::ok(product.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use emporium_app::domain::products::{
        MockProductsService, ProductsServiceError, records::ProductUuid,
    };

    use crate::{
        products::tests::make_product,
        test_helpers::{Mocks, customer, service_as},
    };

    use super::*;

    fn make_service(products: MockProductsService) -> Service {
        service_as(
            customer(),
            Mocks { products, ..Mocks::default() },
            Router::with_path("products/{product}").get(handler),
        )
    }

    #[tokio::test]
    async fn test_get_returns_product_with_discount() -> TestResult {
        let uuid = ProductUuid::new();
        let mut products = MockProductsService::new();

        products
            .expect_get_product()
            .once()
            .withf(move |u| *u == uuid)
            .return_once(move |_| Ok(make_product(uuid)));

        let mut res = TestClient::get(format!("http://example.com/products/{uuid}"))
            .send(&make_service(products))
            .await;

        let body: Envelope<ProductResponse> = res.take_json().await?;
        let product = body.data.ok_or("missing data")?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(product.uuid, uuid.into_uuid());
        assert_eq!(product.category, "home");
        assert_eq!(product.discount_percentage, 25);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_product_returns_404() -> TestResult {
        let uuid = ProductUuid::new();
        let mut products = MockProductsService::new();

        products
            .expect_get_product()
            .once()
            .return_once(|_| Err(ProductsServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/products/{uuid}"))
            .send(&make_service(products))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_invalid_uuid_returns_400() -> TestResult {
        let res = TestClient::get("http://example.com/products/123")
            .send(&make_service(MockProductsService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
