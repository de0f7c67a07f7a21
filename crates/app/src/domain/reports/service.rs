//! Reports service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    auth::AdminCapability,
    database::Db,
    domain::reports::{
        errors::ReportsServiceError,
        records::{DashboardRecord, REVENUE_MONTHS, TOP_PRODUCTS},
        repository::PgReportsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgReportsService {
    db: Db,
    repository: PgReportsRepository,
}

impl PgReportsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgReportsRepository::new(),
        }
    }
}

#[async_trait]
impl ReportsService for PgReportsService {
    #[tracing::instrument(name = "reports.service.dashboard", skip(self, _admin), err)]
    async fn dashboard(&self, _admin: AdminCapability) -> Result<DashboardRecord, ReportsServiceError> {
        let mut tx = self.db.begin().await?;

        let counts = self.repository.dashboard_counts(&mut tx).await?;
        let status_breakdown = self.repository.status_breakdown(&mut tx).await?;
        let monthly_revenue = self
            .repository
            .monthly_revenue(&mut tx, REVENUE_MONTHS)
            .await?;
        let top_products = self.repository.top_products(&mut tx, TOP_PRODUCTS).await?;

        tx.commit().await?;

        Ok(DashboardRecord {
            total_users: counts.total_users,
            total_products: counts.total_products,
            total_orders: counts.total_orders,
            total_revenue: counts.total_revenue,
            status_breakdown,
            monthly_revenue,
            top_products,
        })
    }
}

#[automock]
#[async_trait]
pub trait ReportsService: Send + Sync {
    /// Store-wide aggregates for the admin dashboard.
    async fn dashboard(&self, admin: AdminCapability) -> Result<DashboardRecord, ReportsServiceError>;
}
