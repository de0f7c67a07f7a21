//! Wishlists Repository

use sqlx::{Postgres, Row, Transaction, query, query_as};

use crate::domain::{
    products::records::{ProductRecord, ProductUuid},
    users::records::UserUuid,
};

const LIST_WISHLIST_SQL: &str = include_str!("sql/list_wishlist.sql");
const ADD_WISHLIST_ITEM_SQL: &str = include_str!("sql/add_wishlist_item.sql");
const REMOVE_WISHLIST_ITEM_SQL: &str = include_str!("sql/remove_wishlist_item.sql");
const CONTAINS_WISHLIST_ITEM_SQL: &str = include_str!("sql/contains_wishlist_item.sql");
const CLEAR_WISHLIST_SQL: &str = include_str!("sql/clear_wishlist.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgWishlistsRepository;

impl PgWishlistsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LIST_WISHLIST_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn add(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<(), sqlx::Error> {
        query(ADD_WISHLIST_ITEM_SQL)
            .bind(user.into_uuid())
            .bind(product.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn remove(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<(), sqlx::Error> {
        query(REMOVE_WISHLIST_ITEM_SQL)
            .bind(user.into_uuid())
            .bind(product.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn contains(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<bool, sqlx::Error> {
        query(CONTAINS_WISHLIST_ITEM_SQL)
            .bind(user.into_uuid())
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await?
            .try_get("present")
    }

    pub(crate) async fn clear(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CLEAR_WISHLIST_SQL)
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}
