//! Create Review Handler

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

use emporium_app::domain::products::data::NewReview;

use crate::{
    envelope::{ApiResult, Envelope},
    extensions::*,
    products::{get::ProductResponse, into_status_error},
    state::State,
    users,
};

/// Create Review Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateReviewRequest {
    /// 1 to 5
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// Create Review Handler
///
/// Each user may review a product once.
#[endpoint(
    tags("products"),
    summary = "Review Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Review added"),
        (status_code = StatusCode::BAD_REQUEST, description = "Rating out of range"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::CONFLICT, description = "Product already reviewed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<CreateReviewRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> ApiResult<ProductResponse> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let request = json.into_inner();

    let reviewer = state
        .app
        .users
        .get_user(principal.user_uuid)
        .await
        .map_err(users::into_status_error)?;

    let updated = state
        .app
        .products
        .add_review(
            product.into_inner().into(),
            NewReview {
                user_uuid: principal.user_uuid,
                name: reviewer.name,
                rating: request.rating,
                comment: request.comment,
            },
        )
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Envelope::ok(updated.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::TestClient;
    use serde_json::json;
    use testresult::TestResult;

    use emporium_app::domain::{
        products::{MockProductsService, ProductsServiceError, records::ProductUuid},
        users::{
            MockUsersService,
            records::{Role, UserRecord},
        },
    };

    use crate::{
        products::tests::make_product,
        test_helpers::{Mocks, TEST_USER_UUID, customer, service_as},
    };

    use super::*;

    fn reviewer() -> MockUsersService {
        let mut users = MockUsersService::new();

        users.expect_get_user().once().return_once(|uuid| {
            Ok(UserRecord {
                uuid,
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                role: Role::User,
                created_at: Timestamp::UNIX_EPOCH,
                updated_at: Timestamp::UNIX_EPOCH,
            })
        });

        users
    }

    fn make_service(products: MockProductsService) -> Service {
        service_as(
            customer(),
            Mocks {
                users: reviewer(),
                products,
                ..Mocks::default()
            },
            Router::with_path("products/{product}/reviews").post(handler),
        )
    }

    #[tokio::test]
    async fn test_review_is_attributed_to_caller() -> TestResult {
        let uuid = ProductUuid::new();
        let mut products = MockProductsService::new();

        products
            .expect_add_review()
            .once()
            .withf(move |u, review| {
                *u == uuid
                    && review.user_uuid == TEST_USER_UUID
                    && review.name == "Ada"
                    && review.rating == 4
            })
            .return_once(move |_, _| Ok(make_product(uuid)));

        let res = TestClient::post(format!("http://example.com/products/{uuid}/reviews"))
            .json(&json!({ "rating": 4, "comment": "bright" }))
            .send(&make_service(products))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        Ok(())
    }

    #[tokio::test]
    async fn test_second_review_returns_409() -> TestResult {
        let mut products = MockProductsService::new();

        products
            .expect_add_review()
            .once()
            .return_once(|_, _| Err(ProductsServiceError::AlreadyReviewed));

        let res = TestClient::post(format!("http://example.com/products/{}/reviews", ProductUuid::new()))
            .json(&json!({ "rating": 5 }))
            .send(&make_service(products))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_out_of_range_rating_returns_400() -> TestResult {
        let mut products = MockProductsService::new();

        products
            .expect_add_review()
            .once()
            .return_once(|_, _| Err(ProductsServiceError::InvalidRating));

        let res = TestClient::post(format!("http://example.com/products/{}/reviews", ProductUuid::new()))
            .json(&json!({ "rating": 9 }))
            .send(&make_service(products))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
