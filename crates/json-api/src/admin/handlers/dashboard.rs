//! Admin Dashboard Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use emporium_app::domain::reports::records::{
    DashboardRecord, MonthlyRevenue, StatusCount, TopProduct,
};

use crate::{
    admin::into_status_error,
    envelope::{ApiResult, Envelope},
    extensions::*,
    state::State,
};

/// Status Count
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct StatusCountResponse {
    pub status: String,
    pub orders: u64,
}

impl From<StatusCount> for StatusCountResponse {
    fn from(count: StatusCount) -> Self {
        StatusCountResponse {
            status: count.status.to_string(),
            orders: count.orders,
        }
    }
}

/// Monthly Revenue
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MonthlyRevenueResponse {
    /// `YYYY-MM`
    pub month: String,
    pub revenue: u64,
    pub orders: u64,
}

impl From<MonthlyRevenue> for MonthlyRevenueResponse {
    fn from(month: MonthlyRevenue) -> Self {
        MonthlyRevenueResponse {
            month: month.month,
            revenue: month.revenue,
            orders: month.orders,
        }
    }
}

/// Top Product
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TopProductResponse {
    pub product_uuid: Uuid,
    pub name: String,
    pub quantity_sold: u64,
    pub revenue: u64,
}

impl From<TopProduct> for TopProductResponse {
    fn from(product: TopProduct) -> Self {
        TopProductResponse {
            product_uuid: product.product_uuid.into(),
            name: product.name,
            quantity_sold: product.quantity_sold,
            revenue: product.revenue,
        }
    }
}

/// Dashboard Response
///
/// Revenue figures cover paid orders only, in minor units.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DashboardResponse {
    pub total_users: u64,
    pub total_products: u64,
    pub total_orders: u64,
    pub total_revenue: u64,
    pub status_breakdown: Vec<StatusCountResponse>,
    /// Trailing months, oldest first
    pub monthly_revenue: Vec<MonthlyRevenueResponse>,
    pub top_products: Vec<TopProductResponse>,
}

impl From<DashboardRecord> for DashboardResponse {
    fn from(dashboard: DashboardRecord) -> Self {
        DashboardResponse {
            total_users: dashboard.total_users,
            total_products: dashboard.total_products,
            total_orders: dashboard.total_orders,
            total_revenue: dashboard.total_revenue,
            status_breakdown: dashboard
                .status_breakdown
                .into_iter()
                .map(Into::into)
                .collect(),
            monthly_revenue: dashboard
                .monthly_revenue
                .into_iter()
                .map(Into::into)
                .collect(),
            top_products: dashboard.top_products.into_iter().map(Into::into).collect(),
        }
    }
}

/// Admin Dashboard Handler
#[endpoint(
    tags("admin"),
    summary = "Dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Dashboard aggregates"),
        (status_code = StatusCode::FORBIDDEN, description = "Not an admin"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> ApiResult<DashboardResponse> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.admin_or_403()?;

    let dashboard = state
        .app
        .reports
        .dashboard(admin)
        .await
        .map_err(into_status_error)?;

    Ok(Envelope::ok(dashboard.into()))
}
