//! Reports service errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportsServiceError {
    #[error("SQL error")]
    Sql(#[source] sqlx::Error),
}

impl From<sqlx::Error> for ReportsServiceError {
    fn from(error: sqlx::Error) -> Self {
        Self::Sql(error)
    }
}
