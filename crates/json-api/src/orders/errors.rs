//! Order Errors

use salvo::http::StatusError;
use tracing::error;

use emporium_app::domain::orders::OrdersServiceError;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::Forbidden => {
            StatusError::forbidden().brief("Not authorized to access this order")
        }
        OrdersServiceError::InvalidShippingAddress(missing) => StatusError::bad_request()
            .brief(format!("Shipping address is missing: {}", missing.join(", "))),
        OrdersServiceError::EmptyCart => StatusError::bad_request().brief("Cart is empty"),
        OrdersServiceError::CheckoutInProgress => {
            StatusError::conflict().brief("Checkout already in progress")
        }
        OrdersServiceError::OutOfStock(product) => {
            StatusError::bad_request().brief(format!("Product {product} is out of stock"))
        }
        OrdersServiceError::AlreadyPaid => StatusError::conflict().brief("Order is already paid"),
        OrdersServiceError::Cancelled => StatusError::conflict().brief("Order is cancelled"),
        OrdersServiceError::AlreadyExists => StatusError::conflict().brief("Order already exists"),
        OrdersServiceError::PaymentNotSuccessful(status) => {
            StatusError::bad_request().brief(format!("Payment not successful (status: {status})"))
        }
        OrdersServiceError::PaymentIntentMismatch => {
            StatusError::bad_request().brief("Payment intent does not belong to this order")
        }
        OrdersServiceError::PaymentSetupFailed(source) => {
            error!("failed to create payment intent: {source}");

            StatusError::bad_gateway().brief("Payment setup failed")
        }
        OrdersServiceError::PaymentGateway(source) => {
            error!("payment gateway error: {source}");

            StatusError::bad_gateway().brief("Payment gateway error")
        }
        OrdersServiceError::InvalidReference
        | OrdersServiceError::MissingRequiredData
        | OrdersServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid order payload")
        }
        OrdersServiceError::Sql(source) => {
            error!("orders storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
