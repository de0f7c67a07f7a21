//! Orders Data

use crate::domain::orders::records::{OrderRecord, PaymentMethod, ShippingAddress};

/// Checkout request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

/// Client-side handle for completing a card payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSetup {
    pub client_secret: String,
    pub payment_intent_id: String,
}

/// Result of a successful checkout.
#[derive(Debug, Clone)]
pub struct Checkout {
    pub order: OrderRecord,

    /// Present for `stripe` orders.
    pub payment: Option<PaymentSetup>,
}
