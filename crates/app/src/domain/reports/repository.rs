//! Reports Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::try_get_u64,
    domain::{
        orders::records::OrderStatus,
        products::records::ProductUuid,
        reports::records::{MonthlyRevenue, StatusCount, TopProduct},
    },
};

const DASHBOARD_COUNTS_SQL: &str = include_str!("sql/dashboard_counts.sql");
const STATUS_BREAKDOWN_SQL: &str = include_str!("sql/status_breakdown.sql");
const MONTHLY_REVENUE_SQL: &str = include_str!("sql/monthly_revenue.sql");
const TOP_PRODUCTS_SQL: &str = include_str!("sql/top_products.sql");

/// Scalar dashboard totals.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DashboardCounts {
    pub total_users: u64,
    pub total_products: u64,
    pub total_orders: u64,
    pub total_revenue: u64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgReportsRepository;

impl PgReportsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn dashboard_counts(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<DashboardCounts, sqlx::Error> {
        let row = query(DASHBOARD_COUNTS_SQL).fetch_one(&mut **tx).await?;

        Ok(DashboardCounts {
            total_users: try_get_u64(&row, "total_users")?,
            total_products: try_get_u64(&row, "total_products")?,
            total_orders: try_get_u64(&row, "total_orders")?,
            total_revenue: try_get_u64(&row, "total_revenue")?,
        })
    }

    pub(crate) async fn status_breakdown(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        query_as::<Postgres, StatusCount>(STATUS_BREAKDOWN_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn monthly_revenue(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        months: u32,
    ) -> Result<Vec<MonthlyRevenue>, sqlx::Error> {
        query_as::<Postgres, MonthlyRevenue>(MONTHLY_REVENUE_SQL)
            .bind(i32::try_from(months).map_err(|e| sqlx::Error::Encode(Box::new(e)))?)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn top_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        limit: u32,
    ) -> Result<Vec<TopProduct>, sqlx::Error> {
        query_as::<Postgres, TopProduct>(TOP_PRODUCTS_SQL)
            .bind(i64::from(limit))
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for StatusCount {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("order_status")?;

        Ok(Self {
            status: status
                .parse::<OrderStatus>()
                .map_err(|e| sqlx::Error::ColumnDecode {
                    index: "order_status".to_string(),
                    source: Box::new(e),
                })?,
            orders: try_get_u64(row, "orders")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for MonthlyRevenue {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            month: row.try_get("month")?,
            revenue: try_get_u64(row, "revenue")?,
            orders: try_get_u64(row, "orders")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for TopProduct {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            name: row.try_get("name")?,
            quantity_sold: try_get_u64(row, "quantity_sold")?,
            revenue: try_get_u64(row, "revenue")?,
        })
    }
}
