//! Orders service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    domain::{orders::records::MissingFields, products::records::ProductUuid},
    payments::PaymentGatewayError,
};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error("not allowed to access this order")]
    Forbidden,

    #[error("shipping address is missing: {}", .0.join(", "))]
    InvalidShippingAddress(MissingFields),

    #[error("cart is empty")]
    EmptyCart,

    #[error("another checkout for this cart is in progress")]
    CheckoutInProgress,

    #[error("product {0} is out of stock")]
    OutOfStock(ProductUuid),

    #[error("order is already paid")]
    AlreadyPaid,

    #[error("order is cancelled")]
    Cancelled,

    #[error("payment has not succeeded (status: {0})")]
    PaymentNotSuccessful(String),

    #[error("payment intent does not belong to this order")]
    PaymentIntentMismatch,

    #[error("payment setup failed")]
    PaymentSetupFailed(#[source] PaymentGatewayError),

    #[error("payment gateway error")]
    PaymentGateway(#[source] PaymentGatewayError),

    #[error("order already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
