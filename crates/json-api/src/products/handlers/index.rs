//! Product Index Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToParameters, ToSchema},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use emporium_app::domain::products::{
    data::{DEFAULT_PAGE_SIZE, ProductFilter, ProductSort},
    records::Category,
};

use crate::{
    envelope::{ApiResult, Envelope},
    extensions::*,
    products::{get::ProductResponse, into_status_error},
    state::State,
};

/// Catalog listing query.
#[derive(Debug, Default, Deserialize, ToParameters)]
#[salvo(parameters(default_parameter_in = Query))]
pub(crate) struct ProductQuery {
    /// Category to restrict the listing to
    pub category: Option<String>,

    /// Exact brand match
    pub brand: Option<String>,

    /// Case-insensitive match over name and brand
    pub search: Option<String>,

    /// Lowest price in pence/cents
    pub min_price: Option<u64>,

    /// Highest price in pence/cents
    pub max_price: Option<u64>,

    /// Only products with stock on hand
    pub in_stock: Option<bool>,

    /// `newest`, `price_asc`, `price_desc` or `rating`
    pub sort: Option<String>,

    /// 1-based page number
    pub page: Option<u32>,

    /// Page size, 1 to 100
    pub limit: Option<u32>,
}

fn parse_sort(value: &str) -> Result<ProductSort, StatusError> {
    match value {
        "newest" => Ok(ProductSort::Newest),
        "price_asc" => Ok(ProductSort::PriceAsc),
        "price_desc" => Ok(ProductSort::PriceDesc),
        "rating" => Ok(ProductSort::Rating),
        other => Err(StatusError::bad_request().brief(format!("unknown sort \"{other}\""))),
    }
}

impl TryFrom<ProductQuery> for ProductFilter {
    type Error = StatusError;

    fn try_from(query: ProductQuery) -> Result<Self, Self::Error> {
        Ok(ProductFilter {
            category: query
                .category
                .as_deref()
                .map(str::parse::<Category>)
                .transpose()
                .or_400("could not parse \"category\"")?,
            brand: query.brand,
            search: query.search,
            min_price: query.min_price,
            max_price: query.max_price,
            in_stock_only: query.in_stock.unwrap_or(false),
            sort: query.sort.as_deref().map(parse_sort).transpose()?.unwrap_or_default(),
            page: query.page.unwrap_or(1),
            limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductsResponse {
    /// The page of products
    pub products: Vec<ProductResponse>,

    /// Products matching the filter across all pages
    pub total: u64,

    pub page: u32,

    pub pages: u64,
}

/// Product Index Handler
///
/// Returns a filtered, sorted page of products.
#[endpoint(
    tags("products"),
    summary = "List Products",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(query: ProductQuery, depot: &mut Depot) -> ApiResult<ProductsResponse> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let filter = ProductFilter::try_from(query)?;

    let page = state
        .app
        .products
        .list_products(filter)
        .await
        .map_err(into_status_error)?;

    Ok(Envelope::ok(ProductsResponse {
        products: page.products.into_iter().map(Into::into).collect(),
        total: page.total,
        page: page.page,
        pages: page.pages,
    }))
}
