//! Create Product Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use emporium_app::domain::products::{
    data::NewProduct,
    records::{Category, ProductUuid},
};

use crate::{
    envelope::{ApiResult, Envelope},
    extensions::*,
    products::{get::ProductResponse, into_status_error},
    state::State,
};

/// Create Product Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    pub brand: String,
    pub category: String,
    /// Price in pence/cents
    pub price: u64,
    #[serde(default)]
    pub original_price: Option<u64>,
    #[serde(default)]
    pub stock: u32,
}

impl TryFrom<CreateProductRequest> for NewProduct {
    type Error = StatusError;

    fn try_from(request: CreateProductRequest) -> Result<Self, Self::Error> {
        Ok(NewProduct {
            uuid: ProductUuid::new(),
            name: request.name,
            description: request.description,
            image: request.image,
            brand: request.brand,
            category: request
                .category
                .parse::<Category>()
                .or_400("could not parse \"category\"")?,
            price: request.price,
            original_price: request.original_price,
            stock: request.stock,
        })
    }
}

/// Create Product Handler
#[endpoint(
    tags("products"),
    summary = "Create Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Product created"),
        (status_code = StatusCode::CONFLICT, description = "Product already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Not an admin"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "products.create",
    skip(json, depot, res),
    fields(product_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateProductRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> ApiResult<ProductResponse> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.admin_or_403()?;
    let product = NewProduct::try_from(json.into_inner())?;

    tracing::Span::current().record("product_uuid", tracing::field::display(product.uuid));

    let created = state
        .app
        .products
        .create_product(admin, product)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/products/{}", created.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Envelope::ok(created.into()))
}
