//! Report Records

use crate::domain::{
    orders::records::OrderStatus,
    products::records::ProductUuid,
};

/// Number of trailing months in the revenue series, including the current one.
pub const REVENUE_MONTHS: u32 = 6;

/// Size of the best-seller leaderboard.
pub const TOP_PRODUCTS: u32 = 5;

/// Order count for one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub orders: u64,
}

/// Paid revenue for one calendar month, `month` formatted `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyRevenue {
    pub month: String,
    pub revenue: u64,
    pub orders: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopProduct {
    pub product_uuid: ProductUuid,
    pub name: String,
    pub quantity_sold: u64,
    pub revenue: u64,
}

/// Admin dashboard aggregates. Revenue figures cover paid orders only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRecord {
    pub total_users: u64,
    pub total_products: u64,
    pub total_orders: u64,
    pub total_revenue: u64,
    pub status_breakdown: Vec<StatusCount>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub top_products: Vec<TopProduct>,
}

impl DashboardRecord {
    /// Orders in `status`, zero when none.
    #[must_use]
    pub fn orders_with_status(&self, status: OrderStatus) -> u64 {
        self.status_breakdown
            .iter()
            .find(|count| count.status == status)
            .map_or(0, |count| count.orders)
    }
}
