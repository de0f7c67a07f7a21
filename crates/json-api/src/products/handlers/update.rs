//! Update Product Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use emporium_app::domain::products::{data::ProductUpdate, records::Category};

use crate::{
    envelope::{ApiResult, Envelope},
    extensions::*,
    products::{get::ProductResponse, into_status_error},
    state::State,
};

/// Update Product Request
///
/// Absent fields keep their stored value.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub(crate) struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub price: Option<u64>,
    pub original_price: Option<u64>,
    pub stock: Option<u32>,
}

impl TryFrom<UpdateProductRequest> for ProductUpdate {
    type Error = StatusError;

    fn try_from(request: UpdateProductRequest) -> Result<Self, Self::Error> {
        Ok(ProductUpdate {
            name: request.name,
            description: request.description,
            image: request.image,
            brand: request.brand,
            category: request
                .category
                .as_deref()
                .map(str::parse::<Category>)
                .transpose()
                .or_400("could not parse \"category\"")?,
            price: request.price,
            original_price: request.original_price,
            stock: request.stock,
        })
    }
}

/// Product Update Handler
#[endpoint(
    tags("products"),
    summary = "Update Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Product updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Not an admin"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "products.update",
    skip(product, json, depot),
    fields(product_uuid = tracing::field::Empty, stock = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<UpdateProductRequest>,
    depot: &mut Depot,
) -> ApiResult<ProductResponse> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.admin_or_403()?;
    let product = product.into_inner();
    let update = ProductUpdate::try_from(json.into_inner())?;

    let span = tracing::Span::current();

    span.record("product_uuid", tracing::field::display(product));

    if let Some(stock) = update.stock {
        span.record("stock", stock);
    }

    let updated = state
        .app
        .products
        .update_product(admin, product.into(), update)
        .await
        .map_err(into_status_error)?;

    tracing::info!(product_uuid = %product, price = updated.price, "updated product");

    Ok(Envelope::ok(updated.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use emporium_app::domain::products::{
        MockProductsService, ProductsServiceError, records::ProductUuid,
    };

    use crate::{
        products::tests::make_product,
        test_helpers::{Mocks, admin, customer, service_as},
    };

    use super::*;

    fn route() -> Router {
        Router::with_path("products/{product}").put(handler)
    }

    #[tokio::test]
    async fn test_partial_update_forwards_only_given_fields() -> TestResult {
        let uuid = ProductUuid::new();
        let mut products = MockProductsService::new();

        products
            .expect_update_product()
            .once()
            .withf(move |_, u, update| {
                *u == uuid
                    && *update
                        == ProductUpdate {
                            stock: Some(0),
                            ..ProductUpdate::default()
                        }
            })
            .return_once(move |_, _, _| {
                let mut product = make_product(uuid);

                product.stock = 0;
                product.in_stock = false;

                Ok(product)
            });

        let mut res = TestClient::put(format!("http://example.com/products/{uuid}"))
            .json(&json!({ "stock": 0 }))
            .send(&service_as(admin(), Mocks { products, ..Mocks::default() }, route()))
            .await;

        let body: Envelope<ProductResponse> = res.take_json().await?;
        let product = body.data.ok_or("missing data")?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(!product.in_stock);
        assert_eq!(product.name, "Desk Lamp");

        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_product_returns_404() -> TestResult {
        let mut products = MockProductsService::new();

        products
            .expect_update_product()
            .once()
            .return_once(|_, _, _| Err(ProductsServiceError::NotFound));

        let res = TestClient::put(format!("http://example.com/products/{}", ProductUuid::new()))
            .json(&json!({ "price": 200 }))
            .send(&service_as(admin(), Mocks { products, ..Mocks::default() }, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_customer_cannot_update_product() -> TestResult {
        let res = TestClient::put(format!("http://example.com/products/{}", ProductUuid::new()))
            .json(&json!({ "price": 200 }))
            .send(&service_as(customer(), Mocks::default(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_invalid_uuid_returns_400() -> TestResult {
        let res = TestClient::put("http://example.com/products/123")
            .json(&json!({ "price": 200 }))
            .send(&service_as(admin(), Mocks::default(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
