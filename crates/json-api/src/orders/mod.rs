//! Orders

mod errors;
mod handlers;
mod models;

pub(crate) use errors::into_status_error;
pub(crate) use handlers::*;
pub(crate) use models::*;

#[cfg(test)]
pub(crate) mod tests {
    use jiff::Timestamp;

    use emporium_app::domain::{
        orders::{
            pricing::OrderTotals,
            records::{
                OrderItemRecord, OrderRecord, OrderStatus, OrderUuid, PaymentMethod,
                ShippingAddress,
            },
        },
        products::records::ProductUuid,
    };

    use crate::test_helpers::TEST_USER_UUID;

    pub(crate) fn shipping_address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Ada Lovelace".to_string(),
            address: "12 St James's Square".to_string(),
            city: "London".to_string(),
            postal_code: "SW1Y 4JH".to_string(),
            country: "GB".to_string(),
            phone: "+44 20 7946 0000".to_string(),
        }
    }

    pub(crate) fn make_order(uuid: OrderUuid, payment_method: PaymentMethod) -> OrderRecord {
        let totals = OrderTotals::from_items_price(400_00);

        OrderRecord {
            uuid,
            user_uuid: TEST_USER_UUID,
            items: vec![OrderItemRecord {
                product_uuid: ProductUuid::new(),
                name: "Monitor".to_string(),
                image: "/images/monitor.jpg".to_string(),
                price: 200_00,
                quantity: 2,
            }],
            shipping_address: shipping_address(),
            payment_method,
            payment_result: None,
            payment_intent_id: None,
            items_price: totals.items_price,
            tax_price: totals.tax_price,
            shipping_price: totals.shipping_price,
            total_price: totals.total_price,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            delivered_at: None,
            order_status: OrderStatus::Pending,
            stock_released_at: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }
}
