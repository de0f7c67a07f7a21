//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{
    FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar, types::Json,
};

use crate::{
    database::{to_i64, try_get_u64},
    domain::{
        orders::{
            pricing::OrderTotals,
            records::{
                OrderItemRecord, OrderRecord, OrderStatus, OrderUuid, PaymentMethod,
                PaymentResult, ShippingAddress,
            },
        },
        users::records::UserUuid,
    },
};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const GET_ORDER_FOR_UPDATE_SQL: &str = include_str!("sql/get_order_for_update.sql");
const FIND_ORDER_BY_INTENT_SQL: &str = include_str!("sql/find_order_by_intent.sql");
const LIST_ORDERS_FOR_USER_SQL: &str = include_str!("sql/list_orders_for_user.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const DELETE_ORDER_SQL: &str = include_str!("sql/delete_order.sql");
const SET_PAYMENT_INTENT_SQL: &str = include_str!("sql/set_payment_intent.sql");
const MARK_PAID_SQL: &str = include_str!("sql/mark_paid.sql");
const SET_STATUS_SQL: &str = include_str!("sql/set_status.sql");
const MARK_STOCK_RELEASED_SQL: &str = include_str!("sql/mark_stock_released.sql");
const CLEAR_STOCK_RELEASED_SQL: &str = include_str!("sql/clear_stock_released.sql");
const HAS_PENDING_CHECKOUT_SQL: &str = include_str!("sql/has_pending_checkout.sql");

/// Row payload for a new order.
#[derive(Debug)]
pub(crate) struct OrderInsert<'a> {
    pub uuid: OrderUuid,
    pub user_uuid: UserUuid,
    pub items: &'a [OrderItemRecord],
    pub shipping_address: &'a ShippingAddress,
    pub payment_method: PaymentMethod,
    pub totals: OrderTotals,
    pub is_paid: bool,
    pub order_status: OrderStatus,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderInsert<'_>,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.user_uuid.into_uuid())
            .bind(Json(order.items))
            .bind(Json(order.shipping_address))
            .bind(order.payment_method.as_str())
            .bind(to_i64(order.totals.items_price)?)
            .bind(to_i64(order.totals.tax_price)?)
            .bind(to_i64(order.totals.shipping_price)?)
            .bind(to_i64(order.totals.total_price)?)
            .bind(order.is_paid)
            .bind(order.order_status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_FOR_UPDATE_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_order_by_intent(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment_intent_id: &str,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(FIND_ORDER_BY_INTENT_SQL)
            .bind(payment_intent_id)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders_for_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_ORDERS_FOR_USER_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn delete_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_ORDER_SQL)
            .bind(order.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn set_payment_intent(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        payment_intent_id: &str,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(SET_PAYMENT_INTENT_SQL)
            .bind(order.into_uuid())
            .bind(payment_intent_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Whether the user has a recent stripe checkout still waiting for its intent.
    pub(crate) async fn has_pending_checkout(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<bool, sqlx::Error> {
        query_scalar::<Postgres, bool>(HAS_PENDING_CHECKOUT_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Flip an unpaid, uncancelled order that still holds its stock to paid.
    ///
    /// Returns `None` when another caller already paid it or it was cancelled.
    pub(crate) async fn mark_paid(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        payment_result: Option<&PaymentResult>,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(MARK_PAID_SQL)
            .bind(order.into_uuid())
            .bind(payment_result.map(Json))
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn set_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(SET_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Claim the one-time stock release for an order.
    pub(crate) async fn mark_stock_released(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(MARK_STOCK_RELEASED_SQL)
            .bind(order.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }

    /// Mark a reopened order as holding its stock again.
    pub(crate) async fn clear_stock_released(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(CLEAR_STOCK_RELEASED_SQL)
            .bind(order.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }
}

fn try_get_parsed<T>(row: &PgRow, col: &str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value: String = row.try_get(col)?;

    value.parse::<T>().map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            items: row.try_get::<Json<Vec<OrderItemRecord>>, _>("items")?.0,
            shipping_address: row
                .try_get::<Json<ShippingAddress>, _>("shipping_address")?
                .0,
            payment_method: try_get_parsed(row, "payment_method")?,
            payment_result: row
                .try_get::<Option<Json<PaymentResult>>, _>("payment_result")?
                .map(|result| result.0),
            payment_intent_id: row.try_get("payment_intent_id")?,
            items_price: try_get_u64(row, "items_price")?,
            tax_price: try_get_u64(row, "tax_price")?,
            shipping_price: try_get_u64(row, "shipping_price")?,
            total_price: try_get_u64(row, "total_price")?,
            is_paid: row.try_get("is_paid")?,
            paid_at: row
                .try_get::<Option<SqlxTimestamp>, _>("paid_at")?
                .map(SqlxTimestamp::to_jiff),
            is_delivered: row.try_get("is_delivered")?,
            delivered_at: row
                .try_get::<Option<SqlxTimestamp>, _>("delivered_at")?
                .map(SqlxTimestamp::to_jiff),
            order_status: try_get_parsed(row, "order_status")?,
            stock_released_at: row
                .try_get::<Option<SqlxTimestamp>, _>("stock_released_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
