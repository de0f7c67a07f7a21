//! Carts Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};

use crate::{
    database::{to_i64, try_get_u64},
    domain::{
        carts::records::{CartItemRecord, CartRecord, CartUuid},
        users::records::UserUuid,
    },
};

const ENSURE_CART_SQL: &str = include_str!("sql/ensure_cart.sql");
const GET_CART_FOR_UPDATE_SQL: &str = include_str!("sql/get_cart_for_update.sql");
const SAVE_CART_SQL: &str = include_str!("sql/save_cart.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Lock the user's cart row for the rest of the transaction, creating it
    /// first if the user has none.
    pub(crate) async fn lock_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<CartRecord, sqlx::Error> {
        query(ENSURE_CART_SQL)
            .bind(CartUuid::new().into_uuid())
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?;

        query_as::<Postgres, CartRecord>(GET_CART_FOR_UPDATE_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Lock the user's cart row without creating one.
    pub(crate) async fn find_cart_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Option<CartRecord>, sqlx::Error> {
        query_as::<Postgres, CartRecord>(GET_CART_FOR_UPDATE_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn save_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: &CartRecord,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(SAVE_CART_SQL)
            .bind(cart.uuid.into_uuid())
            .bind(Json(&cart.items))
            .bind(to_i64(cart.total_price)?)
            .bind(to_i64(cart.total_items)?)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CartRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            items: row.try_get::<Json<Vec<CartItemRecord>>, _>("items")?.0,
            total_price: try_get_u64(row, "total_price")?,
            total_items: try_get_u64(row, "total_items")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
