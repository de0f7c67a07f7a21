//! Order request and response models.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use emporium_app::domain::orders::records::{
    OrderItemRecord, OrderRecord, PaymentResult, ShippingAddress,
};

/// Shipping Address
///
/// Every field is required; blank fields are reported together.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub(crate) struct ShippingAddressBody {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

impl From<ShippingAddressBody> for ShippingAddress {
    fn from(body: ShippingAddressBody) -> Self {
        ShippingAddress {
            full_name: body.full_name,
            address: body.address,
            city: body.city,
            postal_code: body.postal_code,
            country: body.country,
            phone: body.phone,
        }
    }
}

impl From<ShippingAddress> for ShippingAddressBody {
    fn from(address: ShippingAddress) -> Self {
        ShippingAddressBody {
            full_name: address.full_name,
            address: address.address,
            city: address.city,
            postal_code: address.postal_code,
            country: address.country,
            phone: address.phone,
        }
    }
}

/// Order Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderItemResponse {
    pub product_uuid: Uuid,
    pub name: String,
    pub image: String,
    /// Unit price in pence/cents at checkout
    pub price: u64,
    pub quantity: u32,
}

impl From<OrderItemRecord> for OrderItemResponse {
    fn from(item: OrderItemRecord) -> Self {
        OrderItemResponse {
            product_uuid: item.product_uuid.into(),
            name: item.name,
            image: item.image,
            price: item.price,
            quantity: item.quantity,
        }
    }
}

/// Payment Result Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentResultResponse {
    pub id: String,
    pub status: String,
    pub update_time: String,
    pub email: Option<String>,
}

impl From<PaymentResult> for PaymentResultResponse {
    fn from(result: PaymentResult) -> Self {
        PaymentResultResponse {
            id: result.id,
            status: result.status,
            update_time: result.update_time.to_string(),
            email: result.email,
        }
    }
}

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    /// The unique identifier of the order
    pub uuid: Uuid,

    /// The user who placed the order
    pub user_uuid: Uuid,

    pub items: Vec<OrderItemResponse>,

    pub shipping_address: ShippingAddressBody,

    /// `stripe` or `cod`
    pub payment_method: String,

    pub payment_result: Option<PaymentResultResponse>,

    pub payment_intent_id: Option<String>,

    pub items_price: u64,

    pub tax_price: u64,

    pub shipping_price: u64,

    pub total_price: u64,

    pub is_paid: bool,

    pub paid_at: Option<String>,

    pub is_delivered: bool,

    pub delivered_at: Option<String>,

    /// `pending`, `processing`, `shipped`, `delivered` or `cancelled`
    pub order_status: String,

    /// The date and time the order was placed
    pub created_at: String,

    pub updated_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        OrderResponse {
            uuid: order.uuid.into(),
            user_uuid: order.user_uuid.into(),
            items: order.items.into_iter().map(Into::into).collect(),
            shipping_address: order.shipping_address.into(),
            payment_method: order.payment_method.to_string(),
            payment_result: order.payment_result.map(Into::into),
            payment_intent_id: order.payment_intent_id,
            items_price: order.items_price,
            tax_price: order.tax_price,
            shipping_price: order.shipping_price,
            total_price: order.total_price,
            is_paid: order.is_paid,
            paid_at: order.paid_at.as_ref().map(ToString::to_string),
            is_delivered: order.is_delivered,
            delivered_at: order.delivered_at.as_ref().map(ToString::to_string),
            order_status: order.order_status.to_string(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}
